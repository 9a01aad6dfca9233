//! Decision logic for incident-record quality analysis: spelling correction,
//! keyword/context/statistical classification, and reference compatibility.

mod compat;
mod engine;
mod error;
mod model;
mod rules;
mod spelling;

pub use compat::{
    CompatChecker, CompatConfig, CompatibilityVerdict, DEFAULT_CUTOFF, Granularity,
    ReferenceCorpus,
};
pub use engine::{AnalysisEngine, BatchReport, RecordAnalysis, SkippedRecord};
pub use error::EngineError;
pub use model::{ModelStore, StatClassifier, TrainedModel, TrainingSummary};
pub use rules::{
    ClassificationOutcome, ContextClassifier, DeclaredCheck, RuleClassifier, Strategy,
    declared_keyword_check,
};
pub use spelling::{SpellChecker, SpellingErrorMap};
