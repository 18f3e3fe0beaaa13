use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::{
    domain::{ProviderDisplay, RenderStyle},
    error::ConfigError,
};

pub const DEFAULT_LIGHTBOX_OPACITY: f32 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalOptions {
    /// Per-provider configuration keyed by provider id.
    pub provider_options: BTreeMap<String, ProviderOptions>,
    /// Network hint handed to every connector; empty means none.
    pub network: String,
    pub cache_provider: bool,
    /// `"modal"` or `"inline"`; anything else fails construction.
    pub render_style: String,
    pub lightbox_opacity: f32,
    pub disable_injected_provider: bool,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            provider_options: BTreeMap::new(),
            network: String::new(),
            cache_provider: false,
            render_style: RenderStyle::Modal.as_str().to_string(),
            lightbox_opacity: DEFAULT_LIGHTBOX_OPACITY,
            disable_injected_provider: false,
        }
    }
}

impl ModalOptions {
    /// Checks the startup options and returns the parsed render style.
    pub fn validate(&self) -> Result<RenderStyle, ConfigError> {
        let style = self.render_style.parse::<RenderStyle>()?;
        if !(0.0..=1.0).contains(&self.lightbox_opacity) {
            return Err(ConfigError::InvalidLightboxOpacity(self.lightbox_opacity));
        }
        Ok(style)
    }

    pub fn network_hint(&self) -> Option<String> {
        let network = self.network.trim();
        (!network.is_empty()).then(|| network.to_string())
    }

    pub fn with_provider(mut self, id: impl Into<String>, options: ProviderOptions) -> Self {
        self.provider_options.insert(id.into(), options);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOptions {
    pub display: Option<ProviderDisplay>,
    /// Passed to the connector as-is.
    pub options: Map<String, Value>,
}

impl ProviderOptions {
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_display(mut self, display: ProviderDisplay) -> Self {
        self.display = Some(display);
        self
    }

    /// Whether every required option name is present.
    pub fn satisfies(&self, required: &[String]) -> bool {
        required.iter().all(|name| self.options.contains_key(name))
    }
}
