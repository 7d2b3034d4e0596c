use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum DexError {
    #[error("catalog request failed: {0}")]
    CatalogHttp(String),

    #[error("catalog returned status {status}: {message}")]
    CatalogStatus { status: u16, message: String },

    #[error("failed to decode catalog payload: {0}")]
    CatalogDecode(String),

    #[error("unexpected detail payload shape: {0}")]
    ShapeMismatch(String),

    #[error("catalog index unavailable: {0}")]
    #[diagnostic(help("check the catalog base_url and your network connection"))]
    IndexUnavailable(String),

    #[error("failed to read from storage: {0}")]
    StorageRead(String),

    #[error("failed to write to storage: {0}")]
    StorageWrite(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    InvalidConfig(String),

    #[error("invalid type filter: {0}")]
    InvalidTypeFilter(String),

    #[error("creature not found: {0}")]
    NotFound(String),
}

impl DexError {
    /// True for failures caused by the remote catalog rather than local state.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            DexError::CatalogHttp(_)
                | DexError::CatalogStatus { .. }
                | DexError::CatalogDecode(_)
                | DexError::ShapeMismatch(_)
                | DexError::IndexUnavailable(_)
        )
    }
}
