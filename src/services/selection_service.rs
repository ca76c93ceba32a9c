use crate::models::attempt::{Attempt, AttemptType};
use uuid::Uuid;

pub struct SelectionService;

impl SelectionService {
    /// Picks the canonical attempt to present when a trainee has
    /// several: the most recent completed attempt (GRADED or with a
    /// submission timestamp), falling back to the most recent attempt
    /// of any state. This tie-break decides which historical attempt a
    /// reviewer sees by default, so it must stay exactly this.
    pub fn select_canonical<'a>(
        attempts: &'a [Attempt],
        trainee_id: Uuid,
        attempt_type: Option<AttemptType>,
    ) -> Option<&'a Attempt> {
        let mut candidates: Vec<&Attempt> = attempts
            .iter()
            .filter(|a| a.owned_by(trainee_id))
            .filter(|a| attempt_type.map_or(true, |t| a.attempt_type == t))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_by(|a, b| b.attempt_number.cmp(&a.attempt_number));
        candidates
            .iter()
            .find(|a| a.is_completed())
            .copied()
            .or_else(|| candidates.first().copied())
    }

    /// The attempt number a fresh retry should carry.
    pub fn next_attempt_number(
        attempts: &[Attempt],
        trainee_id: Uuid,
        attempt_type: AttemptType,
    ) -> u32 {
        attempts
            .iter()
            .filter(|a| a.owned_by(trainee_id) && a.attempt_type == attempt_type)
            .map(|a| a.attempt_number)
            .max()
            .unwrap_or(0)
            + 1
    }
}
