//! In-process job execution engine.
//!
//! The dispatcher polls the durable `jobs` table and runs an executor per
//! claimed job: advertiser channel sync, bulk content generation, or
//! trend refresh. Startup recovery fails jobs orphaned by a previous
//! process before the dispatcher starts.

pub mod dispatcher;
pub mod generate;
pub mod recovery;
pub mod sync;
pub mod trends;

pub use dispatcher::JobDispatcher;

/// Failure reported by an executor and recorded on the job row.
///
/// `message` is the Korean user-facing line shown in the jobs UI;
/// `details` carries structured context for debugging.
#[derive(Debug)]
pub struct JobFailure {
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl JobFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<sqlx::Error> for JobFailure {
    fn from(err: sqlx::Error) -> Self {
        JobFailure::new("데이터베이스 오류가 발생했습니다")
            .with_details(serde_json::json!({ "error": err.to_string() }))
    }
}
