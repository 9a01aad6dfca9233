use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("feedback already recorded for record {0}")]
    Duplicate(String),

    #[error("feedback store at {path} is corrupt: {reason}")]
    Corrupt {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
