use crate::models::answer::Answer;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordAnswerRequest {
    #[validate(length(min = 1))]
    pub question_id: String,
    pub answer: Answer,
}

/// Status-line numbers: answered questions out of the currently active
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptProgress {
    pub answered: usize,
    pub total: usize,
}

/// One entry of the submission batch that did not reach the remote.
/// Carries enough context to retry it individually.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedEntry {
    pub question_id: String,
    pub operation: &'static str,
    pub message: String,
}

/// Outcome of a submission batch. Entries fail independently; the
/// attempt transitions to SUBMITTED only when nothing failed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    pub delivered: Vec<String>,
    pub already_answered: Vec<String>,
    pub failed: Vec<FailedEntry>,
    pub submitted: bool,
}

impl SubmissionReport {
    pub fn fully_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}
