//! Retailer-name recognition for leaflet titles.

/// Recognized supermarket and drugstore brands, matched case-insensitively in
/// list order. Short names such as `Hit` and `dm` come before longer
/// compounds, so `Rewe Center` resolves to `Rewe`.
pub const KNOWN_SHOPS: &[&str] = &[
    "Aldi",
    "Lidl",
    "Rewe",
    "Edeka",
    "Kaufland",
    "Penny",
    "Netto",
    "Real",
    "Metro",
    "Globus",
    "Hit",
    "Norma",
    "Marktkauf",
    "Famila",
    "Bünting",
    "Combi",
    "Tegut",
    "Kaisers",
    "Tengelmann",
    "V-Markt",
    "dm",
    "Rossmann",
    "Müller",
    "Alnatura",
    "Denn's",
    "Basic",
    "Bio Company",
    "Wasgau",
    "Walmart",
    "Dohle",
    "Rewe Center",
    "E-Center",
    "EDEKA",
];

/// Marker that precedes the store name in listing copy ("Geschäft: Globus").
const STORE_MARKER: &str = "Geschäft";

const UNKNOWN_SHOP: &str = "Unknown Shop";

/// Picks the shop name for a leaflet. First matching rule wins:
///
/// 1. a known retailer inside `title`;
/// 2. a known retailer inside any of `texts`;
/// 3. the non-blank part of `title` before `" - "`;
/// 4. the text after `"Geschäft"` in a fragment, trailing punctuation removed;
/// 5. the first two words of a title of three or more words, else its first
///    word, else `"Unknown Shop"`.
#[must_use]
pub fn extract_shop_name(title: &str, texts: &[String]) -> String {
    if let Some(shop) = known_shop_in(title) {
        return shop.to_owned();
    }
    if let Some(shop) = texts.iter().find_map(|text| known_shop_in(text)) {
        return shop.to_owned();
    }
    if let Some((head, _)) = title.split_once(" - ") {
        let head = head.trim();
        if !head.is_empty() {
            return head.to_owned();
        }
    }
    if let Some(shop) = texts.iter().find_map(|text| after_store_marker(text)) {
        return shop;
    }

    let words: Vec<&str> = title.split_whitespace().collect();
    match words.as_slice() {
        [first, second, _, ..] => format!("{first} {second}"),
        [first, ..] => (*first).to_owned(),
        [] => UNKNOWN_SHOP.to_owned(),
    }
}

fn known_shop_in(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    KNOWN_SHOPS
        .iter()
        .copied()
        .find(|shop| lower.contains(&shop.to_lowercase()))
}

fn after_store_marker(text: &str) -> Option<String> {
    let (_, rest) = text.split_once(STORE_MARKER)?;
    let name = rest
        .trim()
        .trim_end_matches([',', '.', ':', ';'])
        .trim_end();
    (!name.is_empty()).then(|| name.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn blank_hyphen_prefix_falls_through_to_title_words() {
        let shop = extract_shop_name(" - Angebote", &[]);
        assert!(!shop.trim().is_empty());
        assert_eq!(shop, "-");
    }

    #[test]
    fn blank_hyphen_prefix_falls_through_to_store_marker() {
        let frags = texts(&["Geschäft Zimmermann."]);
        assert_eq!(extract_shop_name(" - Angebote", &frags), "Zimmermann");
    }

    #[test]
    fn known_retailer_beats_hyphen_split() {
        assert_eq!(extract_shop_name("Aldi Nord - Angebote", &[]), "Aldi");
    }

    #[test]
    fn matches_known_retailer_case_insensitively() {
        assert_eq!(extract_shop_name("KAUFLAND Wochenprospekt", &[]), "Kaufland");
    }

    #[test]
    fn known_retailer_in_fragment() {
        let frags = texts(&["Top Angebote", "gültig bei Rossmann"]);
        assert_eq!(extract_shop_name("Top Angebote", &frags), "Rossmann");
    }

    #[test]
    fn hyphen_split_without_known_retailer() {
        assert_eq!(extract_shop_name("XYZ - Weekly Deals", &[]), "XYZ");
    }

    #[test]
    fn store_marker_in_fragment() {
        let frags = texts(&["Wochenknaller", "Geschäft: Zimmermann;"]);
        assert_eq!(extract_shop_name("Wochenknaller", &frags), ": Zimmermann");
    }

    #[test]
    fn store_marker_with_plain_name() {
        let frags = texts(&["Geschäft Zimmermann."]);
        assert_eq!(extract_shop_name("Wochenknaller", &frags), "Zimmermann");
    }

    #[test]
    fn empty_store_marker_falls_through() {
        let frags = texts(&["Geschäft ..."]);
        assert_eq!(extract_shop_name("Wochenknaller", &frags), "Wochenknaller");
    }

    #[test]
    fn first_two_words_of_long_title() {
        assert_eq!(
            extract_shop_name("Tolle Preise diese Woche", &[]),
            "Tolle Preise"
        );
    }

    #[test]
    fn first_word_of_short_title() {
        assert_eq!(extract_shop_name("Tolle Preise", &[]), "Tolle");
    }

    #[test]
    fn unknown_shop_for_empty_title() {
        assert_eq!(extract_shop_name("   ", &[]), "Unknown Shop");
    }
}
