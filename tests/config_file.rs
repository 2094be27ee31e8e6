use std::io::Write;
use std::time::Duration;

use newsmood::config::ProviderKind;
use newsmood::{Config, NewsmoodError};

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "provider = \"gemini\"\nmodel = \"gemini-2.0-flash\"\ntimeout_secs = 7"
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.provider, ProviderKind::Gemini);
    assert_eq!(config.model(), "gemini-2.0-flash");
    assert_eq!(config.timeout, Duration::from_secs(7));
    assert!(config.api_key().is_none());
}

#[test]
fn env_overlays_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "model = \"from-file\"\nmax_output_tokens = 6").unwrap();

    let config = Config::load(file.path())
        .unwrap()
        .with_env(|key| match key {
            "NEWSMOOD_MODEL" => Some("from-env".to_owned()),
            "GEMINI_API_KEY" => Some("k".to_owned()),
            _ => None,
        })
        .unwrap();
    assert_eq!(config.model(), "from-env");
    assert_eq!(config.max_output_tokens, 6);
    assert!(config.api_key().is_some());
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, NewsmoodError::Config(_)));
}

#[test]
fn oversized_file_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let padding = "#".repeat(70 * 1024);
    writeln!(file, "{padding}").unwrap();

    let err = Config::load(file.path()).unwrap_err();
    match err {
        NewsmoodError::Config(msg) => assert!(msg.contains("byte limit")),
        other => panic!("expected Config error, got {other:?}"),
    }
}
