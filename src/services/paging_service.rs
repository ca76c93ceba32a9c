use crate::models::answer::AnswerSet;
use crate::models::question::Question;
use crate::services::validation_service::ValidationService;

pub const DEFAULT_GROUP_SIZE: usize = 4;

/// What the forward control does on the current group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    Next,
    Submit,
}

pub struct PagingService;

impl PagingService {
    /// Fixed-size chunking of the active question list, preserving
    /// order. The last group holds the remainder.
    pub fn group<'a>(questions: &[&'a Question], group_size: usize) -> Vec<Vec<&'a Question>> {
        let size = group_size.max(1);
        questions.chunks(size).map(|chunk| chunk.to_vec()).collect()
    }
}

/// Navigable view over the grouped question list. Moving forward is
/// gated on the current group being complete, except in review mode
/// where navigation is unrestricted in both directions.
pub struct QuestionPager<'a> {
    groups: Vec<Vec<&'a Question>>,
    index: usize,
    review_mode: bool,
}

impl<'a> QuestionPager<'a> {
    pub fn new(active: Vec<&'a Question>, group_size: usize, review_mode: bool) -> Self {
        Self {
            groups: PagingService::group(&active, group_size),
            index: 0,
            review_mode,
        }
    }

    pub fn current_group(&self) -> &[&'a Question] {
        self.groups.get(self.index).map_or(&[], Vec::as_slice)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn is_first_group(&self) -> bool {
        self.index == 0
    }

    pub fn is_last_group(&self) -> bool {
        self.groups.is_empty() || self.index + 1 == self.groups.len()
    }

    /// "Previous" is disabled on the first group.
    pub fn can_go_back(&self) -> bool {
        !self.is_first_group()
    }

    pub fn can_advance(&self, answers: &AnswerSet) -> bool {
        if self.is_last_group() {
            return false;
        }
        self.review_mode || ValidationService::is_submittable(self.current_group(), answers)
    }

    /// The last group swaps "next" for "submit".
    pub fn next_action(&self) -> NextAction {
        if self.is_last_group() {
            NextAction::Submit
        } else {
            NextAction::Next
        }
    }

    /// Moves forward if permitted; returns whether the move happened.
    pub fn advance(&mut self, answers: &AnswerSet) -> bool {
        if self.can_advance(answers) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn go_back(&mut self) -> bool {
        if self.can_go_back() {
            self.index -= 1;
            true
        } else {
            false
        }
    }
}
