//! Error type shared by every module and the FFI boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    /// The container is structurally unusable; no widget is produced.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid handle: {0}")]
    InvalidHandle(u32),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Both activation mechanisms failed for a single key press.
    #[error("activation of item {item} failed: native: {native}; synthetic: {synthetic}")]
    Activation {
        item: usize,
        native: String,
        synthetic: String,
    },

    #[error("host error: {0}")]
    Host(String),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("invalid menu config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("context not initialized, call menu_init() first")]
    ContextNotInitialized,

    #[error("context already initialized, call menu_shutdown() first")]
    ContextAlreadyInitialized,

    #[error("{0} lock poisoned after panic")]
    LockPoisoned(&'static str),

    #[error("context access from non-owner thread is unsupported")]
    WrongThread,
}

pub type Result<T, E = MenuError> = std::result::Result<T, E>;
