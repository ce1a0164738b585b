use super::*;
use crate::clock::FixedClock;

fn clock() -> FixedClock {
    FixedClock::on(2025, 3, 18)
}

fn fields(title: &str, shop_name: &str) -> LeafletFields {
    LeafletFields {
        title: title.to_owned(),
        thumbnail: "https://example.com/aldi.jpg".to_owned(),
        shop_name: shop_name.to_owned(),
        valid_from: "2025-03-17".to_owned(),
        valid_to: "2025-03-22".to_owned(),
        parsed_time: None,
    }
}

fn assert_invariants(record: &LeafletRecord) {
    assert_ne!(record.shop_name(), record.title(), "{record:?}");
    assert!(!record.shop_name().is_empty(), "{record:?}");
    for date in [record.valid_from(), record.valid_to()] {
        assert!(ISO_DATE_SHAPE.is_match(date), "{date:?} in {record:?}");
        let parsed = NaiveDate::parse_from_str(date, ISO_DATE_FORMAT).unwrap();
        assert!(parsed.year() <= 2026, "{date:?} in {record:?}");
    }
}

// -----------------------------------------------------------------------
// text cleaning
// -----------------------------------------------------------------------

#[test]
fn clean_text_collapses_whitespace() {
    assert_eq!(clean_text("  Aldi \n\t Nord  "), "Aldi Nord");
}

#[test]
fn clean_text_strips_disallowed_characters() {
    assert_eq!(clean_text("Lidl: Angebote! (KW 12) €"), "Lidl Angebote KW 12");
}

#[test]
fn clean_text_collapses_gaps_left_by_stripped_characters() {
    assert_eq!(clean_text("Aldi ! Nord €"), "Aldi Nord");
    assert_eq!(clean_text("€ Penny ★ "), "Penny");
}

#[test]
fn clean_text_keeps_umlauts_and_allowed_punctuation() {
    assert_eq!(clean_text("Müller & Söhne, Filiale-Nord."), "Müller & Söhne, Filiale-Nord.");
}

// -----------------------------------------------------------------------
// shop name derivation
// -----------------------------------------------------------------------

#[test]
fn keeps_distinct_shop_name() {
    let record = LeafletRecord::new(fields("Aldi Nord Angebote", "Aldi"), &clock());
    assert_eq!(record.shop_name(), "Aldi");
}

#[test]
fn derives_shop_from_hyphen_segment_when_missing() {
    let record = LeafletRecord::new(fields("Kaufland - Wochenangebote", ""), &clock());
    assert_eq!(record.shop_name(), "Kaufland");
}

#[test]
fn derives_shop_from_first_word_when_equal_to_title() {
    let record = LeafletRecord::new(fields("Globus Markthalle", "Globus Markthalle"), &clock());
    assert_eq!(record.shop_name(), "Globus");
}

#[test]
fn single_word_title_never_becomes_shop_name() {
    let record = LeafletRecord::new(fields("Aldi", "Aldi"), &clock());
    assert_eq!(record.shop_name(), "Unknown");
    assert_invariants(&record);
}

#[test]
fn empty_title_and_shop_yield_unknown() {
    let record = LeafletRecord::new(fields("", "  "), &clock());
    assert_eq!(record.title(), "");
    assert_eq!(record.shop_name(), "Unknown");
}

#[test]
fn title_unknown_gets_distinct_shop_name() {
    let record = LeafletRecord::new(fields("Unknown", ""), &clock());
    assert_eq!(record.shop_name(), "Unknown Shop");
    assert_invariants(&record);
}

#[test]
fn shop_name_equal_after_cleaning_is_rederived() {
    let record = LeafletRecord::new(fields("Penny - Markt", "Penny - Markt!"), &clock());
    assert_eq!(record.shop_name(), "Penny");
}

// -----------------------------------------------------------------------
// date validation
// -----------------------------------------------------------------------

#[test]
fn valid_dates_pass_through() {
    let record = LeafletRecord::new(fields("Aldi Nord", "Aldi"), &clock());
    assert_eq!(record.valid_from(), "2025-03-17");
    assert_eq!(record.valid_to(), "2025-03-22");
}

#[test]
fn malformed_date_becomes_today() {
    let mut f = fields("Aldi Nord", "Aldi");
    f.valid_from = "17.03.2025".to_owned();
    f.valid_to = "2025-02-30".to_owned();
    let record = LeafletRecord::new(f, &clock());
    assert_eq!(record.valid_from(), "2025-03-18");
    assert_eq!(record.valid_to(), "2025-03-18");
}

#[test]
fn far_future_year_is_clamped_to_current_year() {
    let mut f = fields("Aldi Nord", "Aldi");
    f.valid_from = "2099-03-17".to_owned();
    f.valid_to = "2026-03-22".to_owned();
    let record = LeafletRecord::new(f, &clock());
    assert_eq!(record.valid_from(), "2025-03-17");
    assert_eq!(record.valid_to(), "2026-03-22");
}

// -----------------------------------------------------------------------
// parsed_time and serialization
// -----------------------------------------------------------------------

#[test]
fn parsed_time_is_stamped_from_clock() {
    let record = LeafletRecord::new(fields("Aldi Nord", "Aldi"), &clock());
    assert_eq!(record.parsed_time(), "2025-03-18 12:00:00");
}

#[test]
fn supplied_parsed_time_is_kept() {
    let mut f = fields("Aldi Nord", "Aldi");
    f.parsed_time = Some("2025-01-01 08:00:00".to_owned());
    let mut record = LeafletRecord::new(f, &clock());
    record.stamp_parsed_time("2030-01-01 00:00:00");
    assert_eq!(record.parsed_time(), "2025-01-01 08:00:00");
}

#[test]
fn blank_parsed_time_is_stamped() {
    let mut f = fields("Aldi Nord", "Aldi");
    f.parsed_time = Some(String::new());
    let mut record = LeafletRecord::new(f, &clock());
    record.stamp_parsed_time("2025-03-18 09:30:00");
    assert_eq!(record.parsed_time(), "2025-03-18 09:30:00");
}

#[test]
fn fields_are_in_export_order() {
    let record = LeafletRecord::new(fields("Aldi Nord", "Aldi"), &clock());
    let keys: Vec<&str> = record.fields().iter().map(|(k, _)| *k).collect();
    assert_eq!(
        keys,
        ["title", "thumbnail", "shop_name", "valid_from", "valid_to", "parsed_time"]
    );
}

#[test]
fn serializes_with_ordered_keys_and_is_stable() {
    let record = LeafletRecord::new(fields("Aldi Nord", "Aldi"), &clock());
    let first = serde_json::to_string(&record).unwrap();
    let second = serde_json::to_string(&record).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first,
        r#"{"title":"Aldi Nord","thumbnail":"https://example.com/aldi.jpg","shop_name":"Aldi","valid_from":"2025-03-17","valid_to":"2025-03-22","parsed_time":"2025-03-18 12:00:00"}"#
    );
}

#[test]
fn construction_upholds_invariants_for_messy_inputs() {
    let titles = ["", " ", "Aldi", "Unknown", "- -", "X - ", "!!!", "Rewe - Rewe", "a b c d"];
    let dates = ["", "2025-13-01", "9999-12-31", "2025-3-1", "heute", "2024-02-29"];
    for title in titles {
        for shop in ["", title, "Unknown", "???"] {
            for date in dates {
                let record = LeafletRecord::new(
                    LeafletFields {
                        title: title.to_owned(),
                        thumbnail: String::new(),
                        shop_name: shop.to_owned(),
                        valid_from: date.to_owned(),
                        valid_to: date.to_owned(),
                        parsed_time: None,
                    },
                    &clock(),
                );
                assert_invariants(&record);
            }
        }
    }
}
