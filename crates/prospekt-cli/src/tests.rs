use super::*;

#[test]
fn defaults_to_output_json_without_verbose() {
    let cli = Cli::try_parse_from(["prospekt"]).expect("expected valid cli args");

    assert_eq!(cli.output, PathBuf::from("./output.json"));
    assert!(!cli.verbose);
}

#[test]
fn parses_short_flags() {
    let cli = Cli::try_parse_from(["prospekt", "-o", "out/leaflets.json", "-v"])
        .expect("expected valid cli args");

    assert_eq!(cli.output, PathBuf::from("out/leaflets.json"));
    assert!(cli.verbose);
}

#[test]
fn parses_long_flags() {
    let cli = Cli::try_parse_from(["prospekt", "--output", "data", "--verbose"])
        .expect("expected valid cli args");

    assert_eq!(cli.output, PathBuf::from("data"));
    assert!(cli.verbose);
}

#[test]
fn rejects_unknown_arguments() {
    assert!(Cli::try_parse_from(["prospekt", "--headless"]).is_err());
}
