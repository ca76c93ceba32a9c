use crate::models::answer::Answer;
use crate::models::attempt::Attempt;
use crate::models::question::{Question, QuestionType};
use crate::models::questionnaire::QuestionnaireDefinition;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSummary {
    pub score: Decimal,
    pub max_score: Decimal,
    /// `None` when `max_score` is zero — an ungraded questionnaire has
    /// no percentage, and this is never a division by zero.
    pub percentage: Option<Decimal>,
}

pub struct GradingService;

impl GradingService {
    /// Scores a single question objectively at submission time, all or
    /// nothing against its weight. Returns `None` when the question
    /// cannot be scored here: TEXT goes to a human grader, and any
    /// undisclosed correctness leaves the question unscored rather
    /// than guessed at.
    pub fn score_objective(question: &Question, answer: &Answer) -> Option<Decimal> {
        let correct_ids = question.correct_choice_ids()?;
        let earned = match (question.question_type, answer) {
            (QuestionType::Text, _) => return None,
            (QuestionType::SingleChoice, Answer::Choices { selected_choice_ids }) => {
                selected_choice_ids.len() == 1
                    && selected_choice_ids
                        .iter()
                        .all(|id| correct_ids.contains(id.as_str()))
            }
            (QuestionType::MultiChoice, Answer::Choices { selected_choice_ids }) => {
                let selected: std::collections::BTreeSet<&str> =
                    selected_choice_ids.iter().map(String::as_str).collect();
                selected == correct_ids
            }
            (QuestionType::Grid, Answer::Grid { row_selections }) => {
                question.rows.iter().all(|row| {
                    row_selections
                        .get(row)
                        .is_some_and(|picks| picks.iter().all(|id| correct_ids.contains(id.as_str())))
                })
            }
            _ => false,
        };
        Some(if earned { question.weight } else { Decimal::ZERO })
    }

    /// Combines per-question scores into the attempt-level result. The
    /// denominator is the effective question set frozen at submission
    /// time; follow-ups that were never triggered are excluded. Scores
    /// not yet recorded count as zero until the attempt is GRADED. The
    /// percentage is not rounded here; rounding is a display concern.
    pub fn aggregate(attempt: &Attempt, definition: &QuestionnaireDefinition) -> ScoreSummary {
        let mut max_score = Decimal::ZERO;
        let mut score = Decimal::ZERO;
        for question_id in &attempt.effective_question_ids {
            if let Some(question) = definition.question(question_id) {
                max_score += question.weight;
            }
            if let Some(recorded) = attempt.scores.get(question_id) {
                score += *recorded;
            }
        }
        let percentage = if max_score > Decimal::ZERO {
            Some(score / max_score * Decimal::from(100))
        } else {
            None
        };
        ScoreSummary {
            score,
            max_score,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer::AnswerSet;
    use crate::models::attempt::{AttemptStatus, AttemptType};
    use crate::models::question::Choice;
    use crate::models::questionnaire::Section;
    use chrono::Utc;
    use std::collections::{BTreeMap, BTreeSet};
    use uuid::Uuid;

    fn choice(id: &str, is_correct: Option<bool>) -> Choice {
        Choice {
            id: id.into(),
            text: id.to_uppercase(),
            image_url: None,
            is_correct,
        }
    }

    fn question(id: &str, question_type: QuestionType, weight: u32) -> Question {
        Question {
            id: id.into(),
            question_type,
            question_text: format!("question {}", id),
            image_url: None,
            weight: Decimal::from(weight),
            required: true,
            choices: match question_type {
                QuestionType::Text => vec![],
                _ => vec![choice("a", Some(true)), choice("b", Some(false))],
            },
            rows: if question_type == QuestionType::Grid {
                vec!["R1".into(), "R2".into()]
            } else {
                vec![]
            },
            parent_question_id: None,
            trigger_choice_ids: BTreeSet::new(),
        }
    }

    fn attempt_with(
        effective: &[&str],
        scores: &[(&str, u32)],
    ) -> (Attempt, QuestionnaireDefinition) {
        let weights: &[u32] = &[2, 3, 5];
        let questions: Vec<Question> = effective
            .iter()
            .zip(weights.iter().cycle())
            .map(|(id, w)| question(id, QuestionType::SingleChoice, *w))
            .collect();
        let definition = QuestionnaireDefinition {
            id: Uuid::new_v4(),
            title: "Scoring".into(),
            description: None,
            sections: vec![Section {
                title: "Section 1".into(),
                description: None,
                section_number: 1,
                questions,
            }],
        };
        let attempt = Attempt {
            id: Uuid::new_v4(),
            questionnaire_id: definition.id,
            trainee_id: Uuid::new_v4(),
            attempt_type: AttemptType::Post,
            attempt_number: 1,
            status: AttemptStatus::Submitted,
            started_at: Utc::now(),
            submitted_at: Some(Utc::now()),
            answers: AnswerSet::new(),
            scores: scores
                .iter()
                .map(|(id, s)| (id.to_string(), Decimal::from(*s)))
                .collect::<BTreeMap<_, _>>(),
            effective_question_ids: effective.iter().map(|s| s.to_string()).collect(),
            max_score: None,
            percentage: None,
        };
        (attempt, definition)
    }

    #[test]
    fn aggregate_sums_weights_and_scores() {
        let (attempt, definition) =
            attempt_with(&["q1", "q2", "q3"], &[("q1", 2), ("q2", 0), ("q3", 5)]);
        let summary = GradingService::aggregate(&attempt, &definition);
        assert_eq!(summary.score, Decimal::from(7));
        assert_eq!(summary.max_score, Decimal::from(10));
        assert_eq!(summary.percentage, Some(Decimal::from(70)));
    }

    #[test]
    fn unrecorded_scores_count_as_zero() {
        let (attempt, definition) = attempt_with(&["q1", "q2", "q3"], &[("q1", 2)]);
        let summary = GradingService::aggregate(&attempt, &definition);
        assert_eq!(summary.score, Decimal::from(2));
        assert_eq!(summary.max_score, Decimal::from(10));
    }

    #[test]
    fn zero_max_score_yields_no_percentage() {
        let (mut attempt, mut definition) = attempt_with(&["q1"], &[]);
        for section in &mut definition.sections {
            for q in &mut section.questions {
                q.weight = Decimal::ZERO;
            }
        }
        attempt.scores.clear();
        let summary = GradingService::aggregate(&attempt, &definition);
        assert_eq!(summary.max_score, Decimal::ZERO);
        assert_eq!(summary.percentage, None);
    }

    #[test]
    fn single_choice_scores_full_weight_or_zero() {
        let q = question("q1", QuestionType::SingleChoice, 4);
        assert_eq!(
            GradingService::score_objective(&q, &Answer::single_choice("a")),
            Some(Decimal::from(4))
        );
        assert_eq!(
            GradingService::score_objective(&q, &Answer::single_choice("b")),
            Some(Decimal::ZERO)
        );
    }

    #[test]
    fn multi_choice_requires_exact_selection() {
        let mut q = question("q1", QuestionType::MultiChoice, 3);
        q.choices.push(choice("c", Some(true)));
        assert_eq!(
            GradingService::score_objective(&q, &Answer::multi_choice(["a", "c"])),
            Some(Decimal::from(3))
        );
        // Missing one correct choice scores zero.
        assert_eq!(
            GradingService::score_objective(&q, &Answer::multi_choice(["a"])),
            Some(Decimal::ZERO)
        );
        // An extra wrong choice scores zero.
        assert_eq!(
            GradingService::score_objective(&q, &Answer::multi_choice(["a", "b", "c"])),
            Some(Decimal::ZERO)
        );
    }

    #[test]
    fn text_and_undisclosed_questions_are_not_scored_here() {
        let text = question("q1", QuestionType::Text, 5);
        assert_eq!(
            GradingService::score_objective(&text, &Answer::text("essay")),
            None
        );

        let mut undisclosed = question("q2", QuestionType::SingleChoice, 5);
        undisclosed.choices[0].is_correct = None;
        assert_eq!(
            GradingService::score_objective(&undisclosed, &Answer::single_choice("a")),
            None
        );
    }
}
