use std::{fs, path::Path};

use anyhow::Context;
use connectors::InjectedEnvironment;
use modal_core::{ModalOptions, ProviderOptions};
use serde::Deserialize;
use shared::domain::ProviderDisplay;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "wallet_select.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_url: String,
    /// Flags the simulated injected object exposes, e.g. `isMetaMask`.
    pub injected_flags: Vec<String>,
    pub mobile: bool,
    /// Simulated handshake latency.
    pub connect_delay_ms: u64,
    pub modal: ModalOptions,
}

impl Default for Settings {
    fn default() -> Self {
        let modal = ModalOptions {
            cache_provider: true,
            network: "mainnet".into(),
            ..ModalOptions::default()
        }
        .with_provider("portis", ProviderOptions::default().with_option("id", "demo-dapp"))
        .with_provider("torus", ProviderOptions::default())
        .with_provider(
            "custom-broken",
            ProviderOptions::default().with_display(ProviderDisplay {
                name: Some("Broken Wallet".into()),
                logo: Some("broken.svg".into()),
                description: Some("Always fails to connect".into()),
            }),
        );

        Self {
            database_url: "sqlite://./data/wallet_select.db".into(),
            injected_flags: vec!["isMetaMask".into()],
            mobile: false,
            connect_delay_ms: 250,
            modal,
        }
    }
}

impl Settings {
    pub fn environment(&self) -> InjectedEnvironment {
        let environment = if self.injected_flags.is_empty() {
            InjectedEnvironment::none()
        } else {
            InjectedEnvironment::with_flags(self.injected_flags.iter().cloned())
        };
        if self.mobile {
            environment.on_mobile()
        } else {
            environment
        }
    }
}

/// Reads `path` (or `wallet_select.toml` when present), then applies `APP__*`
/// environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            read_settings_file(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => Settings::default(),
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.database_url = normalize_database_url(&settings.database_url);
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(raw)?)
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__NETWORK") {
        settings.modal.network = v;
    }
    if let Some(v) = var("APP__RENDER_STYLE") {
        settings.modal.render_style = v;
    }
    if let Some(v) = var("APP__CACHE_PROVIDER") {
        match v.parse::<bool>() {
            Ok(parsed) => settings.modal.cache_provider = parsed,
            Err(_) => warn!(value = %v, "ignoring APP__CACHE_PROVIDER, expected true or false"),
        }
    }
    if let Some(v) = var("APP__MOBILE") {
        match v.parse::<bool>() {
            Ok(parsed) => settings.mobile = parsed,
            Err(_) => warn!(value = %v, "ignoring APP__MOBILE, expected true or false"),
        }
    }
    if let Some(v) = var("APP__INJECTED_FLAGS") {
        settings.injected_flags = v
            .split(',')
            .map(str::trim)
            .filter(|flag| !flag.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(v) = var("APP__CONNECT_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.connect_delay_ms = parsed;
        }
    }
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
