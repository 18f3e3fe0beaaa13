use std::{future::Future, sync::Arc};

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod catalog;

pub use catalog::{builtin_providers, InjectedEnvironment};

/// Everything an adapter receives when asked to connect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectorOptions {
    /// Chain/network hint; `None` when the host configured none.
    pub network: Option<String>,
    /// Per-provider options, passed through untouched.
    pub options: Map<String, Value>,
}

impl ConnectorOptions {
    pub fn new(network: Option<String>, options: Map<String, Value>) -> Self {
        Self { network, options }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }
}

/// Live connection produced by a successful handshake.
#[async_trait]
pub trait WalletSession: Send + Sync {
    fn provider_id(&self) -> &str;
    fn accounts(&self) -> Vec<String>;
    fn network(&self) -> Option<String>;
    async fn disconnect(&self) -> anyhow::Result<()>;
}

pub type ProviderHandle = Arc<dyn WalletSession>;

#[async_trait]
pub trait ProviderConnector: Send + Sync {
    async fn connect(&self, options: ConnectorOptions) -> anyhow::Result<ProviderHandle>;
}

pub struct MissingConnector {
    provider_id: String,
}

impl MissingConnector {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
        }
    }
}

#[async_trait]
impl ProviderConnector for MissingConnector {
    async fn connect(&self, _options: ConnectorOptions) -> anyhow::Result<ProviderHandle> {
        Err(anyhow!(
            "connector for provider {} is unavailable",
            self.provider_id
        ))
    }
}

/// Adapts an async closure into a [`ProviderConnector`].
pub struct FnConnector<F> {
    connect: F,
}

#[async_trait]
impl<F, Fut> ProviderConnector for FnConnector<F>
where
    F: Fn(ConnectorOptions) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<ProviderHandle>> + Send,
{
    async fn connect(&self, options: ConnectorOptions) -> anyhow::Result<ProviderHandle> {
        (self.connect)(options).await
    }
}

pub fn connector_fn<F, Fut>(connect: F) -> Arc<dyn ProviderConnector>
where
    F: Fn(ConnectorOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<ProviderHandle>> + Send + 'static,
{
    Arc::new(FnConnector { connect })
}

/// Session backed by the values the handshake reported; holds no transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSession {
    provider_id: String,
    accounts: Vec<String>,
    network: Option<String>,
}

impl StaticSession {
    pub fn new(
        provider_id: impl Into<String>,
        accounts: Vec<String>,
        network: Option<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            accounts,
            network,
        }
    }

    pub fn handle(self) -> ProviderHandle {
        Arc::new(self)
    }
}

#[async_trait]
impl WalletSession for StaticSession {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn accounts(&self) -> Vec<String> {
        self.accounts.clone()
    }

    fn network(&self) -> Option<String> {
        self.network.clone()
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
