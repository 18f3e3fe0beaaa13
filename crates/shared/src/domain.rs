use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Id shared by every injected (browser extension) descriptor.
pub const INJECTED_PROVIDER_ID: &str = "injected";
/// Prefix marking host-supplied providers that are not in the built-in catalog.
pub const CUSTOM_PROVIDER_PREFIX: &str = "custom-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Injected,
    Qrcode,
    Web,
    Hardware,
}

/// How an adapter's implementation is obtained. Only `required` influences
/// eligibility; the rest is informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
}

impl PackageInfo {
    pub fn requiring(required: &[&str]) -> Self {
        Self {
            required: required.iter().map(|name| name.to_string()).collect(),
            ..Self::default()
        }
    }
}

/// Display overrides a host may attach to a provider through its options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDisplay {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub kind: ProviderKind,
    /// Flag on the injected object that identifies this wallet, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub package: PackageInfo,
}

impl ProviderInfo {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        logo: impl Into<String>,
        kind: ProviderKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            logo: logo.into(),
            kind,
            check: None,
            description: None,
            package: PackageInfo::default(),
        }
    }

    pub fn with_check(mut self, check: impl Into<String>) -> Self {
        self.check = Some(check.into());
        self
    }

    pub fn with_package(mut self, package: PackageInfo) -> Self {
        self.package = package;
        self
    }

    pub fn with_display(mut self, display: &ProviderDisplay) -> Self {
        if let Some(name) = &display.name {
            self.name = name.clone();
        }
        if let Some(logo) = &display.logo {
            self.logo = logo.clone();
        }
        if let Some(description) = &display.description {
            self.description = Some(description.clone());
        }
        self
    }

    /// Explicit description if one was set, otherwise one derived from the kind.
    pub fn description(&self) -> String {
        if let Some(description) = &self.description {
            return description.clone();
        }
        match self.kind {
            ProviderKind::Injected => format!("Connect to your {} Wallet", self.name),
            ProviderKind::Qrcode => format!("Scan with {} to connect", self.name),
            ProviderKind::Web => format!("Connect with your {} account", self.name),
            ProviderKind::Hardware => format!("Connect to your {} Hardware Wallet", self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStyle {
    #[default]
    Modal,
    Inline,
}

impl RenderStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStyle::Modal => "modal",
            RenderStyle::Inline => "inline",
        }
    }
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderStyle {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "modal" => Ok(RenderStyle::Modal),
            "inline" => Ok(RenderStyle::Inline),
            other => Err(ConfigError::InvalidRenderStyle(other.to_string())),
        }
    }
}
