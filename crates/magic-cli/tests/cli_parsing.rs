use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use magic_cli::cli_args::{Cli, Command, ConfigCommand};
use magic_cli::{advisories_to_print, resolve_client_config, resolve_output_dir};
use magic_core::{FileConfig, Locale};

// Integration tests for flag parsing and for how flags, the config file and
// the defaults combine.

#[test]
fn test_bare_image_uses_form_defaults() {
    let cli = Cli::try_parse_from(["magic", "drawing.png"]).expect("parse");
    assert!(cli.command.is_none());
    assert_eq!(cli.convert.image, Some(PathBuf::from("drawing.png")));

    let request = cli.convert.to_form(None).to_request();
    assert_eq!(request.colors, 9);
    assert_eq!(request.max_size, 1024);
    assert_eq!(request.thickness, 2);
    assert_eq!(request.min_area, 80);
    assert_eq!(request.merge_area, 200);
    assert_eq!(request.outline_mode, "union");
    assert!(!request.include_preview);
    assert!(!request.return_pdf);
}

#[test]
fn test_conversion_flags_reach_the_request() {
    let cli = Cli::try_parse_from([
        "magic",
        "cat.jpg",
        "--colors",
        "12",
        "--max-size",
        "2048",
        "--thickness",
        "3",
        "--min-area",
        "50",
        "--merge-area",
        "400",
        "--outline-mode",
        "labels",
        "--include-preview",
    ])
    .expect("parse");

    let request = cli.convert.to_form(None).to_request();
    assert_eq!(request.colors, 12);
    assert_eq!(request.max_size, 2048);
    assert_eq!(request.thickness, 3);
    assert_eq!(request.min_area, 50);
    assert_eq!(request.merge_area, 400);
    assert_eq!(request.outline_mode, "labels");
    assert!(request.include_preview);
    assert!(!request.return_pdf);
}

#[test]
fn test_non_numeric_colors_is_rejected() {
    assert!(Cli::try_parse_from(["magic", "cat.jpg", "--colors", "many"]).is_err());
}

#[test]
fn test_empty_invocation_has_no_conversion_flags() {
    let cli = Cli::try_parse_from(["magic"]).expect("parse");
    assert!(cli.convert.is_empty());
    assert!(cli.command.is_none());
}

#[test]
fn test_health_subcommand_accepts_global_flags() {
    let cli = Cli::try_parse_from(["magic", "health", "--api-base", "http://svc:9000"])
        .expect("parse");
    assert!(matches!(cli.command, Some(Command::Health)));
    assert_eq!(cli.connection.api_base.as_deref(), Some("http://svc:9000"));
    assert!(cli.convert.is_empty());
}

#[test]
fn test_config_subcommands() {
    let cli = Cli::try_parse_from(["magic", "config", "set-locale", "en"]).expect("parse");
    match cli.command {
        Some(Command::Config(ConfigCommand::SetLocale { locale })) => {
            assert_eq!(locale, Locale::En)
        }
        other => panic!("unexpected command: {other:?}"),
    }

    assert!(Cli::try_parse_from(["magic", "config", "set-locale", "klingon"]).is_err());

    let cli = Cli::try_parse_from(["magic", "config", "set-timeout", "30"]).expect("parse");
    assert!(matches!(
        cli.command,
        Some(Command::Config(ConfigCommand::SetTimeout { secs: 30 }))
    ));
}

#[test]
fn test_flags_override_file_config() {
    let mut file_config = FileConfig::default();
    file_config.client.api_base = "http://from-file:8000".to_string();
    file_config.client.timeout_secs = Some(10);

    let cli = Cli::try_parse_from([
        "magic",
        "x.png",
        "--api-base",
        "http://from-flag:7000/",
        "--timeout-secs",
        "0",
        "--locale",
        "en",
    ])
    .expect("parse");

    let config = resolve_client_config(&file_config, &cli.connection).expect("resolve");
    assert_eq!(config.api_base, "http://from-flag:7000");
    assert_eq!(config.timeout, None);
    assert_eq!(config.locale, Locale::En);

    let untouched = Cli::try_parse_from(["magic", "x.png"]).expect("parse");
    let config = resolve_client_config(&file_config, &untouched.connection).expect("resolve");
    if std::env::var_os("MAGIC_TIMEOUT_SECS").is_none() {
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    }
}

#[test]
fn test_output_dir_precedence() {
    let mut file_config = FileConfig::default();
    let cli = Cli::try_parse_from(["magic", "x.png"]).expect("parse");
    assert_eq!(resolve_output_dir(&file_config, &cli.convert), PathBuf::from("."));

    file_config.output.directory = Some("/srv/worksheets".to_string());
    assert_eq!(
        resolve_output_dir(&file_config, &cli.convert),
        PathBuf::from("/srv/worksheets")
    );

    let cli = Cli::try_parse_from(["magic", "x.png", "--out-dir", "here"]).expect("parse");
    assert_eq!(resolve_output_dir(&file_config, &cli.convert), PathBuf::from("here"));
}

#[test]
fn test_advisories_printed_once() {
    let cli = Cli::try_parse_from(["magic", "x.png", "--colors", "40"]).expect("parse");
    let request = cli.convert.to_form(None).to_request();

    let printed = advisories_to_print(&request, false);
    assert_eq!(printed.len(), 1);
    assert!(printed[0].starts_with("Warning: colors=40"));

    // With -v the stderr log layer already carries the warn event.
    assert!(advisories_to_print(&request, true).is_empty());
}
