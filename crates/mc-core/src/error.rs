use thiserror::Error;

use crate::carpet::CarpetId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("carpet {carpet_id}: invalid polygon: {reason}")]
    InvalidPolygon { carpet_id: CarpetId, reason: String },

    #[error("sheet spec '{name}': {reason}")]
    InvalidSheet { name: String, reason: String },

    #[error("invalid job definition: {0}")]
    InvalidJob(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}
