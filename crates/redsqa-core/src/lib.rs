pub mod config;
pub mod feedback;
pub mod normalize;
pub mod record;

pub use config::{CategoryConfig, CategoryRule, ConfigError};
pub use feedback::{FeedbackEntry, ReviewerJudgment};
pub use record::{IncidentRecord, RawRecord, RecordError};
