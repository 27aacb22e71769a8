pub mod error;
pub mod outcome;
pub mod subject;
pub mod version;

pub use error::WorkflowError;
pub use outcome::{Deletion, Payload, Registration, SchemaReport, WorkflowOutcome};
pub use subject::{subject_name, topic_pattern, SchemaSubject, DEFAULT_RECORD};
pub use version::VersionSpec;
