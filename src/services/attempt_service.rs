use crate::error::{Error, Result};
use crate::models::answer::{Answer, AnswerSet, WriteOutcome};
use crate::models::attempt::{Attempt, AttemptStatus, AttemptType};
use crate::models::questionnaire::QuestionnaireDefinition;
use crate::services::branch_service::BranchService;
use crate::services::grading_service::GradingService;
use crate::services::validation_service::ValidationService;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// The attempt lifecycle: IN_PROGRESS -> SUBMITTED -> GRADED, with
/// IN_PROGRESS -> EXPIRED as the alternate terminal path. All
/// transitions are local computations; persistence happens elsewhere.
pub struct AttemptService;

impl AttemptService {
    pub fn begin(
        definition: &QuestionnaireDefinition,
        trainee_id: Uuid,
        attempt_type: AttemptType,
        attempt_number: u32,
        now: DateTime<Utc>,
    ) -> Attempt {
        tracing::info!(
            questionnaire_id = %definition.id,
            %trainee_id,
            attempt_number,
            "starting attempt"
        );
        Attempt {
            id: Uuid::new_v4(),
            questionnaire_id: definition.id,
            trainee_id,
            attempt_type,
            attempt_number,
            status: AttemptStatus::InProgress,
            started_at: now,
            submitted_at: None,
            answers: AnswerSet::new(),
            scores: Default::default(),
            effective_question_ids: vec![],
            max_score: None,
            percentage: None,
        }
    }

    /// Records an answer on behalf of a trainee. Only the owner of an
    /// IN_PROGRESS attempt may write; an already-answered question is
    /// an idempotent no-op, never an error.
    pub fn record_answer(
        attempt: &mut Attempt,
        trainee_id: Uuid,
        question_id: &str,
        answer: Answer,
    ) -> Result<WriteOutcome> {
        if !attempt.owned_by(trainee_id) {
            return Err(Error::Forbidden(format!(
                "attempt {} is not owned by trainee {}",
                attempt.id, trainee_id
            )));
        }
        if attempt.status != AttemptStatus::InProgress {
            return Err(Error::InvalidState(format!(
                "cannot write answers to a {:?} attempt",
                attempt.status
            )));
        }
        Ok(attempt.answers.record(question_id, answer))
    }

    /// Submits the attempt: requires every active question to be
    /// complete, freezes the effective question set as the scoring
    /// denominator, records the timestamp, and scores the objective
    /// questions immediately. TEXT questions wait for a human grader;
    /// if none are pending the attempt goes straight to GRADED.
    pub fn submit(
        attempt: &mut Attempt,
        definition: &QuestionnaireDefinition,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if attempt.status != AttemptStatus::InProgress {
            return Err(Error::InvalidState(format!(
                "cannot submit a {:?} attempt",
                attempt.status
            )));
        }
        let active = BranchService::active_questions(definition, &attempt.answers);
        let incomplete = ValidationService::incomplete_questions(&active, &attempt.answers);
        if !incomplete.is_empty() {
            return Err(Error::Validation { incomplete });
        }

        attempt.effective_question_ids = active.iter().map(|q| q.id.clone()).collect();
        attempt.submitted_at = Some(now);
        attempt.status = AttemptStatus::Submitted;

        for question in &active {
            if question.weight.is_zero() {
                continue;
            }
            let Some(answer) = attempt.answers.get(&question.id) else {
                continue;
            };
            if let Some(score) = GradingService::score_objective(question, answer) {
                attempt.scores.insert(question.id.clone(), score);
            }
        }
        Self::refresh_aggregate(attempt, definition);
        tracing::info!(
            attempt_id = %attempt.id,
            questions = attempt.effective_question_ids.len(),
            status = ?attempt.status,
            "attempt submitted"
        );
        Ok(())
    }

    /// Applies an externally produced score (a human grader marking a
    /// TEXT question). Re-grading an already scored question is a
    /// no-op. Once every weighted question has a score the attempt
    /// becomes GRADED.
    pub fn apply_score(
        attempt: &mut Attempt,
        definition: &QuestionnaireDefinition,
        question_id: &str,
        score: Decimal,
    ) -> Result<()> {
        if attempt.status != AttemptStatus::Submitted {
            return Err(Error::InvalidState(format!(
                "cannot grade a {:?} attempt",
                attempt.status
            )));
        }
        if !attempt.effective_question_ids.iter().any(|id| id == question_id) {
            return Err(Error::NotFound(format!(
                "question '{}' is not part of the submitted attempt",
                question_id
            )));
        }
        if attempt.scores.contains_key(question_id) {
            tracing::warn!(attempt_id = %attempt.id, question_id, "score already recorded, ignoring");
            return Ok(());
        }
        attempt.scores.insert(question_id.to_string(), score);
        Self::refresh_aggregate(attempt, definition);
        Ok(())
    }

    /// Applies the external deadline decision. Terminal: an expired
    /// attempt is permanently non-submittable.
    pub fn expire(attempt: &mut Attempt) -> Result<()> {
        if attempt.status != AttemptStatus::InProgress {
            return Err(Error::InvalidState(format!(
                "cannot expire a {:?} attempt",
                attempt.status
            )));
        }
        attempt.status = AttemptStatus::Expired;
        tracing::warn!(attempt_id = %attempt.id, "attempt expired before submission");
        Ok(())
    }

    fn refresh_aggregate(attempt: &mut Attempt, definition: &QuestionnaireDefinition) {
        let summary = GradingService::aggregate(attempt, definition);
        attempt.max_score = Some(summary.max_score);
        attempt.percentage = summary.percentage;

        let fully_graded = attempt
            .effective_question_ids
            .iter()
            .filter_map(|id| definition.question(id))
            .filter(|q| !q.weight.is_zero())
            .all(|q| attempt.scores.contains_key(&q.id));
        if fully_graded {
            attempt.status = AttemptStatus::Graded;
            tracing::info!(
                attempt_id = %attempt.id,
                score = %summary.score,
                max_score = %summary.max_score,
                "attempt fully graded"
            );
        }
    }
}
