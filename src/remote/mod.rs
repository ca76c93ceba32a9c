use crate::error::Result;
use crate::models::answer::Answer;
use crate::models::attempt::{Attempt, AttemptType};
use crate::models::questionnaire::QuestionnaireDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Caller-supplied credential for every remote call. The engine never
/// reads ambient process state for auth, so it stays testable without
/// environment mocking.
#[derive(Debug, Clone)]
pub struct AccessContext {
    pub trainee_id: Uuid,
    pub token: String,
}

impl AccessContext {
    pub fn new(trainee_id: Uuid, token: impl Into<String>) -> Self {
        Self {
            trainee_id,
            token: token.into(),
        }
    }
}

/// Remote record of whether a single answer entry has been persisted,
/// used to reconcile already-answered follow-ups after a reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum EntryAnswered {
    Unanswered,
    Answered {
        #[serde(default, rename = "selectedChoiceIds")]
        selected_choice_ids: BTreeSet<String>,
    },
}

/// Acknowledgement of an answer write. `AlreadyAnswered` is a success:
/// the remote keeps the first write and ignores retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmitAck {
    Recorded,
    AlreadyAnswered,
}

/// The engine's only window onto the outside world. Implementations
/// wrap whatever transport the deployment uses; the engine itself
/// performs no I/O. Calls may resolve in any order — every merge into
/// local state is idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataService: Send + Sync {
    async fn fetch_definition(
        &self,
        ctx: &AccessContext,
        questionnaire_id: Uuid,
    ) -> Result<QuestionnaireDefinition>;

    /// Attempt summaries for a questionnaire, optionally filtered.
    async fn fetch_attempts(
        &self,
        ctx: &AccessContext,
        questionnaire_id: Uuid,
        trainee_id: Option<Uuid>,
        attempt_type: Option<AttemptType>,
    ) -> Result<Vec<Attempt>>;

    /// Full answer set and per-question scores for one attempt.
    async fn fetch_attempt_detail(&self, ctx: &AccessContext, attempt_id: Uuid) -> Result<Attempt>;

    async fn fetch_entry_answered_state(
        &self,
        ctx: &AccessContext,
        entry_id: &str,
    ) -> Result<EntryAnswered>;

    /// Persists one answer entry. Idempotent: an entry that is already
    /// answered acks `AlreadyAnswered` rather than failing.
    async fn submit_answer(
        &self,
        ctx: &AccessContext,
        entry_id: &str,
        answer: &Answer,
    ) -> Result<SubmitAck>;
}
