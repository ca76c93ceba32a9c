use crate::models::answer::AnswerSet;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Attempt lifecycle states, wire-verbatim. The only legal paths are
/// IN_PROGRESS -> SUBMITTED -> GRADED and IN_PROGRESS -> EXPIRED;
/// no transition ever reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
    Graded,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptType {
    Pre,
    Post,
}

/// One trainee's pass through a questionnaire. Mutable only by the
/// owning trainee while IN_PROGRESS; immutable to the trainee after
/// submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub id: Uuid,
    pub questionnaire_id: Uuid,
    pub trainee_id: Uuid,
    pub attempt_type: AttemptType,
    /// Positive, unique per trainee and type, increasing across retries.
    pub attempt_number: u32,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub answers: AnswerSet,
    /// Per-question scores; a missing entry means not yet graded.
    #[serde(default)]
    pub scores: BTreeMap<String, Decimal>,
    /// The active question set frozen at submission time. Empty until
    /// submitted; the scoring denominator is computed over this
    /// snapshot, so untriggered follow-ups never dilute the result.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effective_question_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
}

impl Attempt {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, AttemptStatus::Graded | AttemptStatus::Expired)
    }

    /// True once the trainee has finished the attempt, whether or not
    /// grading has caught up yet.
    pub fn is_completed(&self) -> bool {
        self.status == AttemptStatus::Graded || self.submitted_at.is_some()
    }

    pub fn owned_by(&self, trainee_id: Uuid) -> bool {
        self.trainee_id == trainee_id
    }
}
