use crate::models::answer::AnswerSet;
use crate::models::question::{Question, QuestionType};
use crate::models::questionnaire::QuestionnaireDefinition;

pub struct BranchService;

impl BranchService {
    /// Resolves the questions currently in play: each section's main
    /// questions in order, and after each non-TEXT main question the
    /// follow-ups whose trigger choices intersect its current
    /// selection, in declaration order.
    ///
    /// Pure over the inputs and safe to re-run after every answer
    /// change: a follow-up whose triggering choice was deselected drops
    /// out of the result even if a stale answer for it is still stored.
    pub fn active_questions<'a>(
        definition: &'a QuestionnaireDefinition,
        answers: &AnswerSet,
    ) -> Vec<&'a Question> {
        let mut active = Vec::new();
        for section in &definition.sections {
            for question in &section.questions {
                if question.is_follow_up() {
                    continue;
                }
                active.push(question);
                if question.question_type == QuestionType::Text {
                    continue;
                }
                let Some(selected) = answers.selected_choice_ids(&question.id) else {
                    continue;
                };
                // Follow-ups of this question, in declaration order.
                for follow_up in definition.questions() {
                    if follow_up.parent_question_id.as_deref() != Some(question.id.as_str()) {
                        continue;
                    }
                    let triggered = follow_up
                        .trigger_choice_ids
                        .iter()
                        .any(|trigger| selected.contains(trigger));
                    if triggered {
                        active.push(follow_up);
                    }
                }
            }
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer::Answer;
    use crate::models::question::Choice;
    use crate::models::questionnaire::Section;
    use rust_decimal::Decimal;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn choice(id: &str) -> Choice {
        Choice {
            id: id.into(),
            text: id.to_uppercase(),
            image_url: None,
            is_correct: None,
        }
    }

    fn main_question(id: &str, choices: Vec<Choice>) -> Question {
        Question {
            id: id.into(),
            question_type: QuestionType::MultiChoice,
            question_text: format!("question {}", id),
            image_url: None,
            weight: Decimal::ONE,
            required: true,
            choices,
            rows: vec![],
            parent_question_id: None,
            trigger_choice_ids: BTreeSet::new(),
        }
    }

    fn follow_up(id: &str, parent: &str, triggers: &[&str]) -> Question {
        let mut q = main_question(id, vec![choice("x"), choice("y")]);
        q.parent_question_id = Some(parent.into());
        q.trigger_choice_ids = triggers.iter().map(|t| t.to_string()).collect();
        q
    }

    fn definition(questions: Vec<Question>) -> QuestionnaireDefinition {
        QuestionnaireDefinition {
            id: Uuid::new_v4(),
            title: "Branching".into(),
            description: None,
            sections: vec![Section {
                title: "Section 1".into(),
                description: None,
                section_number: 1,
                questions,
            }],
        }
    }

    fn ids(active: &[&Question]) -> Vec<String> {
        active.iter().map(|q| q.id.clone()).collect()
    }

    #[test]
    fn mains_only_without_answers() {
        let def = definition(vec![
            main_question("q1", vec![choice("a"), choice("b")]),
            follow_up("q1f", "q1", &["a"]),
            main_question("q2", vec![choice("c")]),
        ]);
        let active = BranchService::active_questions(&def, &AnswerSet::new());
        assert_eq!(ids(&active), vec!["q1", "q2"]);
    }

    #[test]
    fn selecting_trigger_reveals_follow_up_after_parent() {
        let def = definition(vec![
            main_question("q1", vec![choice("a"), choice("b")]),
            follow_up("q1f", "q1", &["a"]),
            main_question("q2", vec![choice("c")]),
        ]);
        let mut answers = AnswerSet::new();
        answers.record("q1", Answer::multi_choice(["a"]));
        let active = BranchService::active_questions(&def, &answers);
        assert_eq!(ids(&active), vec!["q1", "q1f", "q2"]);
    }

    #[test]
    fn deselected_trigger_drops_follow_up_despite_stale_answer() {
        let def = definition(vec![
            main_question("q1", vec![choice("a"), choice("b")]),
            follow_up("q1f", "q1", &["a"]),
        ]);
        let mut answers = AnswerSet::new();
        answers.record("q1", Answer::multi_choice(["b"]));
        // A stale follow-up answer remains in storage.
        answers.record("q1f", Answer::multi_choice(["x"]));
        let active = BranchService::active_questions(&def, &answers);
        assert_eq!(ids(&active), vec!["q1"]);
    }

    #[test]
    fn follow_up_triggered_by_multiple_choices_appears_once() {
        let def = definition(vec![
            main_question("q1", vec![choice("a"), choice("b"), choice("c")]),
            follow_up("q1f", "q1", &["a", "b"]),
        ]);
        let mut answers = AnswerSet::new();
        answers.record("q1", Answer::multi_choice(["a", "b"]));
        let active = BranchService::active_questions(&def, &answers);
        assert_eq!(ids(&active), vec!["q1", "q1f"]);
    }

    #[test]
    fn follow_ups_keep_declaration_order() {
        let def = definition(vec![
            main_question("q1", vec![choice("a"), choice("b")]),
            follow_up("q1f2", "q1", &["b"]),
            follow_up("q1f1", "q1", &["a"]),
        ]);
        let mut answers = AnswerSet::new();
        answers.record("q1", Answer::multi_choice(["a", "b"]));
        let active = BranchService::active_questions(&def, &answers);
        // Declaration order, not selection order.
        assert_eq!(ids(&active), vec!["q1", "q1f2", "q1f1"]);
    }

    #[test]
    fn resolution_is_idempotent_over_the_restricted_answer_set() {
        let def = definition(vec![
            main_question("q1", vec![choice("a"), choice("b")]),
            follow_up("q1f", "q1", &["a"]),
            main_question("q2", vec![choice("c")]),
        ]);
        let mut answers = AnswerSet::new();
        answers.record("q1", Answer::multi_choice(["b"]));
        answers.record("q1f", Answer::multi_choice(["x"]));
        answers.record("q2", Answer::multi_choice(["c"]));

        let first = ids(&BranchService::active_questions(&def, &answers));

        // Restrict stored answers to the active set and resolve again.
        let mut restricted = AnswerSet::new();
        for (question_id, answer) in answers.iter() {
            if first.contains(question_id) {
                restricted.record(question_id.clone(), answer.clone());
            }
        }
        let second = ids(&BranchService::active_questions(&def, &restricted));
        assert_eq!(first, second);
    }
}
