//! Provider selection and connection orchestration.
//!
//! [`WalletModal`] owns the public API: it decides whether a connect request
//! goes straight to a cached or single provider or through the selection
//! surface, and re-emits connect/error/close events to host listeners.
//! [`ProviderController`] owns the catalog, the cached preference and the
//! connection attempt itself.

pub mod error;
pub mod events;
pub mod modal;
pub mod options;
pub mod providers;
pub mod surface;

pub use connectors::{ConnectorOptions, ProviderConnector, ProviderHandle, WalletSession};
pub use error::{ConnectFailure, ModalError};
pub use events::{EventCallback, EventController, EventPayload, ListenerId, Subscription};
pub use modal::{ModalDependencies, WalletModal};
pub use options::{ModalOptions, ProviderOptions};
pub use providers::{ProviderController, ProviderDescriptor, ProviderMappingEntry};
pub use shared::events::{CLOSE_EVENT, CONNECT_EVENT, ERROR_EVENT};
pub use surface::{
    HeadlessSurface, InlineSelector, SelectionSurface, SurfaceCallback, SurfaceProps,
    VisibilityUpdate,
};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
