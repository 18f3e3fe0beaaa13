//! Public event names and well-known keys.

pub const CONNECT_EVENT: &str = "connect";
pub const ERROR_EVENT: &str = "error";
pub const CLOSE_EVENT: &str = "close";

/// Persistence key holding the cached provider id.
pub const CACHED_PROVIDER_KEY: &str = "WALLET_SELECT_CACHED_PROVIDER";
/// Id of the container the modal surface is mounted into.
pub const MODAL_MOUNT_ID: &str = "WALLET_SELECT_MODAL";
