use crate::error::{Error, Result};
use crate::models::answer::{Answer, AnswerSet};
use crate::models::question::{Question, QuestionType};

pub struct ValidationService;

impl ValidationService {
    /// Rejects an answer whose shape cannot belong to the question:
    /// wrong variant, more than one selection for SINGLE_CHOICE or per
    /// grid row, an undeclared choice id, or an undeclared row label.
    pub fn check_answer_shape(question: &Question, answer: &Answer) -> Result<()> {
        let known = question.choice_ids();
        match (question.question_type, answer) {
            (QuestionType::Text, Answer::Text { .. }) => Ok(()),
            (QuestionType::SingleChoice, Answer::Choices { selected_choice_ids })
                if selected_choice_ids.len() > 1 =>
            {
                Err(Error::BadRequest(format!(
                    "question '{}' allows a single selection",
                    question.id
                )))
            }
            (
                QuestionType::SingleChoice | QuestionType::MultiChoice,
                Answer::Choices { selected_choice_ids },
            ) => {
                for id in selected_choice_ids {
                    if !known.contains(id.as_str()) {
                        return Err(Error::BadRequest(format!(
                            "choice '{}' is not declared on question '{}'",
                            id, question.id
                        )));
                    }
                }
                Ok(())
            }
            (QuestionType::Grid, Answer::Grid { row_selections }) => {
                for (row, picks) in row_selections {
                    if !question.rows.contains(row) {
                        return Err(Error::BadRequest(format!(
                            "row '{}' is not declared on question '{}'",
                            row, question.id
                        )));
                    }
                    if picks.len() > 1 {
                        return Err(Error::BadRequest(format!(
                            "row '{}' of question '{}' allows a single selection",
                            row, question.id
                        )));
                    }
                    if let Some(id) = picks.iter().find(|id| !known.contains(id.as_str())) {
                        return Err(Error::BadRequest(format!(
                            "choice '{}' is not declared on question '{}'",
                            id, question.id
                        )));
                    }
                }
                Ok(())
            }
            _ => Err(Error::BadRequest(format!(
                "answer shape does not match {:?} question '{}'",
                question.question_type, question.id
            ))),
        }
    }

    /// Per-type completeness. Optional questions always count as
    /// complete. Pure, so it can be re-evaluated on every answer change
    /// to gate navigation.
    pub fn is_complete(question: &Question, answers: &AnswerSet) -> bool {
        if !question.required {
            return true;
        }
        let Some(answer) = answers.get(&question.id) else {
            return false;
        };
        match (question.question_type, answer) {
            (QuestionType::Text, Answer::Text { text_answer }) => {
                !text_answer.trim().is_empty()
            }
            (
                QuestionType::SingleChoice | QuestionType::MultiChoice,
                Answer::Choices { selected_choice_ids },
            ) => !selected_choice_ids.is_empty(),
            (QuestionType::Grid, Answer::Grid { row_selections }) => question
                .rows
                .iter()
                .all(|row| row_selections.get(row).is_some_and(|s| !s.is_empty())),
            // Answer shape does not match the question type.
            _ => false,
        }
    }

    /// True iff every currently active question is complete.
    pub fn is_submittable(active: &[&Question], answers: &AnswerSet) -> bool {
        active.iter().all(|q| Self::is_complete(q, answers))
    }

    /// Ids of the active questions still failing their completeness
    /// rule, for surfacing "which questions are incomplete" to the
    /// caller. Never sent to the remote service.
    pub fn incomplete_questions(active: &[&Question], answers: &AnswerSet) -> Vec<String> {
        active
            .iter()
            .filter(|q| !Self::is_complete(q, answers))
            .map(|q| q.id.clone())
            .collect()
    }
}
