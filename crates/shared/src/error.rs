use thiserror::Error;

/// Malformed startup options. Always surfaced at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid render style `{0}`, expected `modal` or `inline`")]
    InvalidRenderStyle(String),
    #[error("lightbox opacity must be within 0.0..=1.0, got {0}")]
    InvalidLightboxOpacity(f32),
}
