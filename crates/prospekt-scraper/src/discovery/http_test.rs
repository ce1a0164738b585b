use prospekt_core::FixedClock;

use super::*;

const PLACEHOLDER: &str = "https://www.prospektmaschine.de/static/images/default-leaflet.jpg";

fn base() -> Url {
    Url::parse("https://www.prospektmaschine.de/hypermarkte/").unwrap()
}

fn clock() -> FixedClock {
    FixedClock::on(2025, 3, 18)
}

const LISTING: &str = r#"
<html><head><title>Hypermärkte</title></head><body>
  <div class="list">
    <div class="item">
      <img data-src="/thumbs/aldi-nord.jpg" alt="Aldi Nord">
      <strong>Aldi Nord - Angebote</strong>
      <small>17.03.2025 - 22.03.2025</small>
    </div>
    <div class="item">
      <img src="https://cdn.example.com/kaufland.webp">
      <h3>Wochenprospekt</h3>
      <span>Kaufland</span>
      <span>gültig 14.03 - 20.03</span>
    </div>
    <div class="item"><img src="/thumbs/empty.jpg"></div>
  </div>
</body></html>
"#;

#[test]
fn extracts_one_record_per_text_block() {
    let records = extract_leaflets(LISTING, &base(), PLACEHOLDER, &clock());
    assert_eq!(records.len(), 2, "{records:?}");

    let aldi = &records[0];
    assert_eq!(aldi.title(), "Aldi Nord - Angebote");
    assert_eq!(aldi.shop_name(), "Aldi");
    assert_eq!(aldi.thumbnail(), "https://www.prospektmaschine.de/thumbs/aldi-nord.jpg");
    assert_eq!(aldi.valid_from(), "2025-03-17");
    assert_eq!(aldi.valid_to(), "2025-03-22");

    let kaufland = &records[1];
    assert_eq!(kaufland.title(), "Wochenprospekt");
    assert_eq!(kaufland.shop_name(), "Kaufland");
    assert_eq!(kaufland.thumbnail(), "https://cdn.example.com/kaufland.webp");
    assert_eq!(kaufland.valid_from(), "2025-03-14");
    assert_eq!(kaufland.valid_to(), "2025-03-20");
}

#[test]
fn uses_placeholder_without_image_and_default_window_without_dates() {
    let html = r#"<article><b>XYZ - Weekly Deals</b><p>Sonderangebote</p></article>"#;
    let records = extract_leaflets(html, &base(), PLACEHOLDER, &clock());
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.thumbnail(), PLACEHOLDER);
    assert_eq!(record.shop_name(), "XYZ");
    assert_eq!(record.valid_from(), "2025-03-18");
    assert_eq!(record.valid_to(), "2025-03-25");
    assert_eq!(record.parsed_time(), "2025-03-18 12:00:00");
}

#[test]
fn unresolvable_image_falls_back_to_placeholder() {
    let html = r#"
        <div class="item"><img src="//[broken"><b>Lidl - Angebote</b><span>17.03.2025 - 22.03.2025</span></div>
        <div class="item"><b>Penny Markt</b></div>
    "#;
    let records = extract_leaflets(html, &base(), PLACEHOLDER, &clock());
    assert_eq!(records.len(), 2, "{records:?}");

    let lidl = &records[0];
    assert_eq!(lidl.title(), "Lidl - Angebote");
    assert_eq!(lidl.thumbnail(), PLACEHOLDER);
    assert_eq!(lidl.valid_from(), "2025-03-17");
    assert_eq!(lidl.valid_to(), "2025-03-22");
    assert_eq!(records[1].title(), "Penny Markt");
}

#[test]
fn page_without_leaflets_yields_nothing() {
    let records = extract_leaflets("<p>Wartungsarbeiten</p>", &base(), PLACEHOLDER, &clock());
    assert!(records.is_empty());
}

#[test]
fn parse_base_url_rejects_relative_url() {
    let err = parse_base_url("hypermarkte/").unwrap_err();
    assert!(matches!(err, ScraperError::InvalidUrl { .. }), "got: {err:?}");
}
