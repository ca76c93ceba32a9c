use crate::dto::session_dto::{AttemptProgress, FailedEntry, RecordAnswerRequest, SubmissionReport};
use crate::error::{Error, Result};
use crate::models::answer::{Answer, WriteOutcome};
use crate::models::attempt::{Attempt, AttemptStatus, AttemptType};
use crate::models::question::Question;
use crate::models::questionnaire::QuestionnaireDefinition;
use crate::remote::{AccessContext, DataService, EntryAnswered};
use crate::services::attempt_service::AttemptService;
use crate::services::branch_service::BranchService;
use crate::services::paging_service::{QuestionPager, DEFAULT_GROUP_SIZE};
use crate::services::selection_service::SelectionService;
use crate::services::validation_service::ValidationService;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// One trainee's answering (or review) session over a questionnaire.
/// All engine computations stay local and synchronous; the remote
/// service is touched only to load state and to push the submission
/// batch. Abandoning the session loses nothing but unsent local edits.
pub struct AttemptSession {
    remote: Arc<dyn DataService>,
    ctx: AccessContext,
    definition: QuestionnaireDefinition,
    attempt: Attempt,
    review_mode: bool,
}

impl std::fmt::Debug for AttemptSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttemptSession")
            .field("ctx", &self.ctx)
            .field("definition", &self.definition)
            .field("attempt", &self.attempt)
            .field("review_mode", &self.review_mode)
            .finish_non_exhaustive()
    }
}

impl AttemptSession {
    /// Loads the definition and the trainee's canonical attempt. With
    /// no prior attempt a fresh IN_PROGRESS one is started; a prior
    /// completed or expired attempt opens in read-only review mode.
    pub async fn load(
        remote: Arc<dyn DataService>,
        ctx: AccessContext,
        questionnaire_id: Uuid,
        attempt_type: AttemptType,
    ) -> Result<Self> {
        let definition = remote.fetch_definition(&ctx, questionnaire_id).await?;
        definition.validate()?;

        let attempts = remote
            .fetch_attempts(&ctx, questionnaire_id, Some(ctx.trainee_id), Some(attempt_type))
            .await?;
        let canonical =
            SelectionService::select_canonical(&attempts, ctx.trainee_id, Some(attempt_type));

        let attempt = match canonical {
            Some(summary) => remote.fetch_attempt_detail(&ctx, summary.id).await?,
            None => {
                let number =
                    SelectionService::next_attempt_number(&attempts, ctx.trainee_id, attempt_type);
                AttemptService::begin(&definition, ctx.trainee_id, attempt_type, number, Utc::now())
            }
        };
        let review_mode = attempt.is_completed() || attempt.status == AttemptStatus::Expired;

        let mut session = Self {
            remote,
            ctx,
            definition,
            attempt,
            review_mode,
        };
        if session.attempt.status == AttemptStatus::InProgress {
            session.reconcile_follow_ups().await?;
        }
        tracing::info!(
            attempt_id = %session.attempt.id,
            review_mode = session.review_mode,
            "session loaded"
        );
        Ok(session)
    }

    /// Merges remote answered-state for active follow-ups the local
    /// attempt does not know about yet. Write-once merging keeps this
    /// idempotent, so fetches may resolve in any order and the session
    /// can re-reconcile whenever new data arrives.
    pub async fn reconcile_follow_ups(&mut self) -> Result<()> {
        let pending: Vec<String> = BranchService::active_questions(&self.definition, &self.attempt.answers)
            .iter()
            .filter(|q| q.is_follow_up() && !self.attempt.answers.contains(&q.id))
            .map(|q| q.id.clone())
            .collect();
        for entry_id in pending {
            let state = self
                .remote
                .fetch_entry_answered_state(&self.ctx, &entry_id)
                .await?;
            if let EntryAnswered::Answered { selected_choice_ids } = state {
                self.attempt.answers.record(
                    entry_id,
                    Answer::Choices { selected_choice_ids },
                );
            }
        }
        Ok(())
    }

    pub fn definition(&self) -> &QuestionnaireDefinition {
        &self.definition
    }

    /// Definition for rendering: correctness is withheld while the
    /// trainee is still answering.
    pub fn definition_for_display(&self) -> QuestionnaireDefinition {
        if self.review_mode {
            self.definition.clone()
        } else {
            self.definition.sanitized_for_trainee()
        }
    }

    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    pub fn is_review_mode(&self) -> bool {
        self.review_mode
    }

    pub fn active_questions(&self) -> Vec<&Question> {
        BranchService::active_questions(&self.definition, &self.attempt.answers)
    }

    pub fn is_submittable(&self) -> bool {
        let active = self.active_questions();
        ValidationService::is_submittable(&active, &self.attempt.answers)
    }

    pub fn progress(&self) -> AttemptProgress {
        let active = self.active_questions();
        let answered = active
            .iter()
            .filter(|q| self.attempt.answers.contains(&q.id))
            .count();
        AttemptProgress {
            answered,
            total: active.len(),
        }
    }

    pub fn pager(&self) -> QuestionPager<'_> {
        QuestionPager::new(self.active_questions(), DEFAULT_GROUP_SIZE, self.review_mode)
    }

    /// Records a local answer. Unknown question ids are rejected;
    /// writes to an already-answered question are a no-op success.
    pub fn record_answer(&mut self, request: RecordAnswerRequest) -> Result<WriteOutcome> {
        request.validate()?;
        let question = self.definition.question(&request.question_id).ok_or_else(|| {
            Error::NotFound(format!(
                "question '{}' is not part of this questionnaire",
                request.question_id
            ))
        })?;
        ValidationService::check_answer_shape(question, &request.answer)?;
        AttemptService::record_answer(
            &mut self.attempt,
            self.ctx.trainee_id,
            &request.question_id,
            request.answer,
        )
    }

    /// Pushes every answered active entry to the remote as one logical
    /// batch and, when the whole batch lands, submits the attempt
    /// locally. Each entry fails independently: a transport error on
    /// one never blocks the others, and the attempt stays IN_PROGRESS
    /// for an idempotent retry. Nothing is sent at all while the
    /// attempt is incomplete.
    pub async fn submit(&mut self) -> Result<SubmissionReport> {
        if self.attempt.status != AttemptStatus::InProgress {
            return Err(Error::InvalidState(format!(
                "cannot submit a {:?} attempt",
                self.attempt.status
            )));
        }
        let active = BranchService::active_questions(&self.definition, &self.attempt.answers);
        let incomplete = ValidationService::incomplete_questions(&active, &self.attempt.answers);
        if !incomplete.is_empty() {
            return Err(Error::Validation { incomplete });
        }

        // Only answered entries are sent; stale follow-up answers are
        // not part of the active set and are never submitted.
        let entries: Vec<(String, Answer)> = active
            .iter()
            .filter_map(|q| {
                self.attempt
                    .answers
                    .get(&q.id)
                    .map(|a| (q.id.clone(), a.clone()))
            })
            .collect();

        let mut report = SubmissionReport::default();
        for (entry_id, answer) in &entries {
            match self.remote.submit_answer(&self.ctx, entry_id, answer).await {
                Ok(crate::remote::SubmitAck::Recorded) => report.delivered.push(entry_id.clone()),
                Ok(crate::remote::SubmitAck::AlreadyAnswered) => {
                    report.already_answered.push(entry_id.clone())
                }
                Err(err) => {
                    tracing::warn!(entry_id = %entry_id, error = %err, "entry submission failed");
                    report.failed.push(FailedEntry {
                        question_id: entry_id.clone(),
                        operation: "submit_answer",
                        message: err.to_string(),
                    });
                }
            }
        }

        if report.fully_delivered() {
            AttemptService::submit(&mut self.attempt, &self.definition, Utc::now())?;
            report.submitted = true;
            self.review_mode = true;
        } else {
            tracing::warn!(
                failed = report.failed.len(),
                "submission batch incomplete, attempt stays in progress"
            );
        }
        Ok(report)
    }
}
