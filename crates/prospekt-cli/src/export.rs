//! Writers for the collected leaflets.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use prospekt_core::LeafletRecord;

/// Writes `records` as a UTF-8, 2-space indented JSON array, creating
/// missing parent directories.
pub(crate) fn export_json(records: &[LeafletRecord], path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records).context("failed to serialize leaflets")?;
    write_creating_dirs(path, &json)
}

/// Writes `records` as an ES module whose default export is the leaflet array.
pub(crate) fn export_javascript(records: &[LeafletRecord], path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records).context("failed to serialize leaflets")?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let module = format!(
        "// Automatically generated\n\
         // {file_name}\n\
         \n\
         const leaflets = {json};\n\
         \n\
         // Exporting a variable\n\
         export default leaflets;\n"
    );
    write_creating_dirs(path, &module)
}

/// `out.json` becomes `out.js`; any other path gets `.js` appended.
pub(crate) fn js_output_path(json_path: &Path) -> PathBuf {
    let raw = json_path.to_string_lossy();
    match raw.strip_suffix(".json") {
        Some(stem) => PathBuf::from(format!("{stem}.js")),
        None => PathBuf::from(format!("{raw}.js")),
    }
}

fn write_creating_dirs(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use prospekt_core::{FixedClock, LeafletFields};

    use super::*;

    fn records() -> Vec<LeafletRecord> {
        vec![LeafletRecord::new(
            LeafletFields {
                title: "Müller - Drogerie Angebote".to_owned(),
                thumbnail: "https://example.com/mueller.jpg".to_owned(),
                shop_name: "Müller".to_owned(),
                valid_from: "2025-03-17".to_owned(),
                valid_to: "2025-03-22".to_owned(),
                parsed_time: None,
            },
            &FixedClock::on(2025, 3, 18),
        )]
    }

    #[test]
    fn js_path_replaces_json_suffix() {
        assert_eq!(js_output_path(Path::new("out/leaflets.json")), PathBuf::from("out/leaflets.js"));
        assert_eq!(js_output_path(Path::new("a.json.d/x.json")), PathBuf::from("a.json.d/x.js"));
    }

    #[test]
    fn js_path_appends_suffix_otherwise() {
        assert_eq!(js_output_path(Path::new("out/leaflets")), PathBuf::from("out/leaflets.js"));
        assert_eq!(js_output_path(Path::new("data.txt")), PathBuf::from("data.txt.js"));
    }

    #[test]
    fn json_export_creates_directories_and_keeps_field_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/output.json");

        export_json(&records(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("[\n  {\n    \"title\": \"Müller - Drogerie Angebote\""));
        let title_at = written.find("\"title\"").unwrap();
        let shop_at = written.find("\"shop_name\"").unwrap();
        let parsed_at = written.find("\"parsed_time\"").unwrap();
        assert!(title_at < shop_at && shop_at < parsed_at);

        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed[0]["valid_to"], "2025-03-22");
        assert_eq!(parsed[0]["parsed_time"], "2025-03-18 12:00:00");
    }

    #[test]
    fn javascript_export_wraps_json_in_module() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.js");

        export_javascript(&records(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let json = serde_json::to_string_pretty(&records()).unwrap();
        let expected = format!(
            "// Automatically generated\n// output.js\n\nconst leaflets = {json};\n\n// Exporting a variable\nexport default leaflets;\n"
        );
        assert_eq!(written, expected);
    }

    #[test]
    fn empty_export_is_an_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");

        export_json(&[], &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }
}
