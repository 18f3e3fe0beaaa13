use std::collections::HashMap;

use super::*;

fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn parses_nested_provider_options() {
    let settings = parse_settings(
        r#"
database_url = "sqlite::memory:"
injected_flags = ["isFrame"]

[modal]
network = "rinkeby"
cache_provider = true

[modal.provider_options.fortmatic.options]
key = "pk_test_123"

[modal.provider_options.custom-hw.display]
name = "Hardware Bridge"
"#,
    )
    .expect("valid config");

    assert_eq!(settings.database_url, "sqlite::memory:");
    assert_eq!(settings.injected_flags, vec!["isFrame".to_string()]);
    assert_eq!(settings.modal.network, "rinkeby");
    assert!(settings.modal.cache_provider);
    assert_eq!(settings.modal.render_style, "modal");
    assert_eq!(
        settings.modal.provider_options["fortmatic"]
            .options
            .get("key")
            .and_then(|value| value.as_str()),
        Some("pk_test_123")
    );
    let display = settings.modal.provider_options["custom-hw"]
        .display
        .clone()
        .expect("display");
    assert_eq!(display.name.as_deref(), Some("Hardware Bridge"));
    assert_eq!(settings.connect_delay_ms, Settings::default().connect_delay_ms);
}

#[test]
fn rejects_malformed_config() {
    assert!(parse_settings("modal = 3").is_err());
}

#[test]
fn env_overrides_replace_file_values() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        vars(&[
            ("APP__DATABASE_URL", "sqlite::memory:"),
            ("APP__NETWORK", "goerli"),
            ("APP__RENDER_STYLE", "inline"),
            ("APP__CACHE_PROVIDER", "false"),
            ("APP__INJECTED_FLAGS", "isTrust, ,isOpera"),
            ("APP__MOBILE", "true"),
        ]),
    );

    assert_eq!(settings.database_url, "sqlite::memory:");
    assert_eq!(settings.modal.network, "goerli");
    assert_eq!(settings.modal.render_style, "inline");
    assert!(!settings.modal.cache_provider);
    assert_eq!(
        settings.injected_flags,
        vec!["isTrust".to_string(), "isOpera".to_string()]
    );
    assert!(settings.mobile);
}

#[test]
fn malformed_env_values_are_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        vars(&[
            ("APP__CACHE_PROVIDER", "sometimes"),
            ("APP__CONNECT_DELAY_MS", "soon"),
        ]),
    );

    assert!(settings.modal.cache_provider);
    assert_eq!(settings.connect_delay_ms, 250);
}

#[test]
fn empty_flag_list_means_nothing_injected() {
    let settings = Settings {
        injected_flags: Vec::new(),
        ..Settings::default()
    };
    assert!(settings.environment().detect().is_none());

    let settings = Settings::default();
    assert_eq!(
        settings.environment().detect().map(|info| info.name),
        Some("MetaMask".to_string())
    );
}

#[test]
fn explicit_missing_config_file_is_an_error() {
    let err = load_settings(Some(Path::new("./does/not/exist.toml"))).expect_err("missing file");
    assert!(format!("{err:#}").contains("failed to read config file"));
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(normalize_database_url("sqlite:prefs.db"), "sqlite://prefs.db");
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(
        normalize_database_url("  "),
        Settings::default().database_url
    );
}
