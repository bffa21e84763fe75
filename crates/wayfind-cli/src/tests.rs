use super::*;

#[test]
fn parses_providers_command() {
    let cli = Cli::try_parse_from(["wayfind", "providers"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Providers));
}

#[test]
fn parses_resolve_with_negative_longitude() {
    let cli = Cli::try_parse_from([
        "wayfind",
        "resolve",
        "coffee shop",
        "--lat",
        "40.758",
        "--lon",
        "-73.9855",
        "--max-results",
        "3",
        "--json",
    ])
    .expect("expected valid cli args");

    let Commands::Resolve(args) = cli.command else {
        panic!("expected resolve command");
    };
    assert_eq!(args.query, "coffee shop");
    assert_eq!(args.lon, Some(-73.9855));
    assert!(args.json);
    assert!(!args.retry);

    let options = args.options(SearchOptions::default());
    assert_eq!(options.max_results, 3);
    assert_eq!(
        options.anchor,
        Some(wayfind_core::Coordinate::new(40.758, -73.9855))
    );
    assert!(options.overall_timeout_ms.is_none());
}

#[test]
fn lat_without_lon_is_rejected() {
    let err = Cli::try_parse_from(["wayfind", "resolve", "park", "--lat", "1.0"]);
    assert!(err.is_err());
}

#[test]
fn unset_flags_keep_engine_defaults() {
    let cli = Cli::try_parse_from(["wayfind", "resolve", "park"]).expect("expected valid cli args");
    let Commands::Resolve(args) = cli.command else {
        panic!("expected resolve command");
    };
    let defaults = SearchOptions::default().with_radius_km(25.0);
    assert_eq!(args.options(defaults.clone()), defaults);
}
