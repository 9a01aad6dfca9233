use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("spelling dictionary not found: {0}")]
    DictionaryMissing(std::path::PathBuf),

    #[error("reference corpus not found: {0}")]
    CorpusMissing(std::path::PathBuf),

    #[error("no trained model at {0} — run training first")]
    ModelNotTrained(std::path::PathBuf),

    #[error("trained model at {path} is unreadable: {reason}")]
    CorruptModel {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("engine configuration invalid: {0}")]
    ConfigInvalid(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
