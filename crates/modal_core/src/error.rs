use shared::{domain::RenderStyle, error::ConfigError};
use thiserror::Error;

/// Why a connection attempt produced no provider handle. Carried by error
/// events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectFailure {
    #[error("provider {provider_id} failed to connect: {message}")]
    Connector {
        provider_id: String,
        message: String,
    },
    #[error("cached provider {provider_id} is no longer available")]
    StaleCache { provider_id: String },
}

impl ConnectFailure {
    pub fn connector(provider_id: impl Into<String>, err: &anyhow::Error) -> Self {
        ConnectFailure::Connector {
            provider_id: provider_id.into(),
            message: format!("{err:#}"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ModalError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cannot connect to provider ({0}), check provider options")]
    ProviderNotFound(String),
    #[error(transparent)]
    Connect(#[from] ConnectFailure),
    #[error("provider selection was dismissed")]
    Dismissed,
    #[error("wallet modal has been disposed")]
    Disposed,
    #[error("render style is {configured}, cannot render {requested}")]
    RenderStyleMismatch {
        configured: RenderStyle,
        requested: RenderStyle,
    },
    #[error("failed to render selection surface: {0}")]
    Render(String),
    #[error("failed to update cached provider: {0}")]
    Storage(String),
}
