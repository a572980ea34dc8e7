use memshape_core::MemshapeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Core(#[from] MemshapeError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{failed} of {total} property checks failed")]
    Verification { failed: usize, total: usize },
    #[error("no scenarios selected")]
    NothingSelected,
}
