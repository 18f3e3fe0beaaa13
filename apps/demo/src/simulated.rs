use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use connectors::{connector_fn, ConnectorOptions, ProviderConnector, StaticSession};
use modal_core::ModalDependencies;
use shared::domain::{CUSTOM_PROVIDER_PREFIX, INJECTED_PROVIDER_ID};

use crate::config::Settings;

pub const BROKEN_PROVIDER_ID: &str = "custom-broken";

const BUILTIN_IDS: &[&str] = &[
    INJECTED_PROVIDER_ID,
    "walletconnect",
    "portis",
    "fortmatic",
    "torus",
    "bitski",
    "ledger",
];

/// Registers a simulated connector for every built-in provider and for each
/// configured custom provider.
pub fn register(mut dependencies: ModalDependencies, settings: &Settings) -> ModalDependencies {
    let delay = Duration::from_millis(settings.connect_delay_ms);
    let custom_ids = settings
        .modal
        .provider_options
        .keys()
        .filter(|id| id.starts_with(CUSTOM_PROVIDER_PREFIX))
        .map(String::as_str);

    for (index, id) in BUILTIN_IDS.iter().copied().chain(custom_ids).enumerate() {
        dependencies = dependencies.with_connector(id, simulated_connector(id, index, delay));
    }
    dependencies
}

fn simulated_connector(id: &str, index: usize, delay: Duration) -> Arc<dyn ProviderConnector> {
    let provider_id = id.to_string();
    let account = format!("0x{:040x}", index + 1);
    connector_fn(move |options: ConnectorOptions| {
        let provider_id = provider_id.clone();
        let account = account.clone();
        async move {
            tokio::time::sleep(delay).await;
            if provider_id == BROKEN_PROVIDER_ID {
                return Err(anyhow!("wallet extension crashed during handshake"));
            }
            Ok(StaticSession::new(provider_id, vec![account], options.network).handle())
        }
    })
}

#[cfg(test)]
mod tests {
    use connectors::WalletSession;

    use super::*;

    #[tokio::test]
    async fn broken_provider_fails_and_others_connect() {
        let ok = simulated_connector("torus", 4, Duration::ZERO);
        let session = ok
            .connect(ConnectorOptions::new(Some("mainnet".into()), Default::default()))
            .await
            .expect("torus connects");
        assert_eq!(session.accounts(), vec![format!("0x{:040x}", 5)]);
        assert_eq!(session.network().as_deref(), Some("mainnet"));

        let broken = simulated_connector(BROKEN_PROVIDER_ID, 7, Duration::ZERO);
        assert!(broken.connect(ConnectorOptions::default()).await.is_err());
    }
}
