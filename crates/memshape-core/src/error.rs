//! Error type shared by the core operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemshapeError {
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("unknown scenario family '{0}'")]
    UnknownFamily(String),
    #[error("invalid profile '{0}' (expected full or quick)")]
    InvalidProfile(String),
    #[error("invalid seed '{0}' (expected decimal or 0x-prefixed hex)")]
    InvalidSeed(String),
}
