//! Built-in provider descriptors and injected-wallet detection.

use shared::domain::{PackageInfo, ProviderInfo, ProviderKind, INJECTED_PROVIDER_ID};

fn injected(name: &str, logo: &str, check: &str) -> ProviderInfo {
    ProviderInfo::new(INJECTED_PROVIDER_ID, name, logo, ProviderKind::Injected).with_check(check)
}

/// Generic entry used when something is injected but no known flag matches.
pub fn fallback_injected() -> ProviderInfo {
    injected("Web3", "web3-default.svg", "isWeb3")
}

pub fn injected_providers() -> Vec<ProviderInfo> {
    vec![
        injected("MetaMask", "metamask.svg", "isMetaMask"),
        injected("Trust", "trust.svg", "isTrust"),
        injected("Coinbase Wallet", "coinbase.svg", "isCoinbaseWallet"),
        injected("Frame", "frame.svg", "isFrame"),
        injected("Status", "status.svg", "isStatus"),
        injected("Opera", "opera.svg", "isOpera"),
        injected("Rabby", "rabby.svg", "isRabby"),
    ]
}

/// Non-injected providers in display order.
pub fn builtin_providers() -> Vec<ProviderInfo> {
    vec![
        ProviderInfo::new(
            "walletconnect",
            "WalletConnect",
            "walletconnect.svg",
            ProviderKind::Qrcode,
        )
        .with_package(PackageInfo {
            required: vec!["infuraId".into()],
            package_name: Some("@walletconnect/web3-provider".into()),
            version: Some("1.8.0".into()),
            global_name: Some("WalletConnectProvider".into()),
        }),
        ProviderInfo::new("portis", "Portis", "portis.svg", ProviderKind::Web)
            .with_package(PackageInfo::requiring(&["id"])),
        ProviderInfo::new("fortmatic", "Fortmatic", "fortmatic.svg", ProviderKind::Web)
            .with_package(PackageInfo::requiring(&["key"])),
        ProviderInfo::new("torus", "Torus", "torus.svg", ProviderKind::Web),
        ProviderInfo::new("bitski", "Bitski", "bitski.svg", ProviderKind::Web)
            .with_package(PackageInfo::requiring(&["clientId", "callbackUrl"])),
        ProviderInfo::new("ledger", "Ledger", "ledger.svg", ProviderKind::Hardware),
    ]
}

/// What the host observed about the injected wallet object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectedEnvironment {
    /// Whether any injected object exists at all.
    pub present: bool,
    /// Boolean flags that were set on the injected object.
    pub flags: Vec<String>,
    pub is_mobile: bool,
}

impl InjectedEnvironment {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            present: true,
            flags: flags.into_iter().map(Into::into).collect(),
            is_mobile: false,
        }
    }

    pub fn on_mobile(mut self) -> Self {
        self.is_mobile = true;
        self
    }

    /// Resolves the injected descriptor, preferring the first catalog entry whose
    /// flag is set.
    pub fn detect(&self) -> Option<ProviderInfo> {
        if !self.present {
            return None;
        }
        let detected = injected_providers().into_iter().find(|info| {
            info.check
                .as_deref()
                .is_some_and(|check| self.flags.iter().any(|flag| flag == check))
        });
        Some(detected.unwrap_or_else(fallback_injected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_named_injected_wallet() {
        let env = InjectedEnvironment::with_flags(["isMetaMask"]);
        let info = env.detect().expect("injected");
        assert_eq!(info.id, INJECTED_PROVIDER_ID);
        assert_eq!(info.name, "MetaMask");
    }

    #[test]
    fn falls_back_to_generic_web3_entry() {
        let env = InjectedEnvironment::with_flags(Vec::<String>::new());
        assert_eq!(env.detect().expect("injected").name, "Web3");
    }

    #[test]
    fn nothing_detected_without_injected_object() {
        assert!(InjectedEnvironment::none().detect().is_none());
    }

    #[test]
    fn builtin_ids_are_unique_and_never_injected() {
        let providers = builtin_providers();
        let mut ids: Vec<_> = providers.iter().map(|info| info.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), providers.len());
        assert!(providers.iter().all(|info| info.id != INJECTED_PROVIDER_ID));
    }
}
