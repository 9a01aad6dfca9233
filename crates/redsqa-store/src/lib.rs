//! Storage layer: the durable, write-once reviewer feedback document.

mod error;
pub use error::StoreError;

mod feedback;
pub use feedback::FeedbackStore;
