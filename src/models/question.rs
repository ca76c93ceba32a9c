use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Wire-level question type vocabulary. The remote service sends these
/// tags verbatim; the closed enum keeps type dispatch exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    Text,
    Grid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// `None` when correctness is not disclosed to the viewer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Zero weight means the question is ungraded.
    #[serde(default)]
    pub weight: Decimal,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Empty for TEXT. For GRID the choices double as shared column labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    /// Row labels, GRID only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<String>,
    /// Set on follow-up questions only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_question_id: Option<String>,
    /// Choices of the parent that reveal this follow-up. Non-empty iff
    /// `parent_question_id` is set.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub trigger_choice_ids: BTreeSet<String>,
}

fn default_required() -> bool {
    true
}

impl Question {
    pub fn is_follow_up(&self) -> bool {
        self.parent_question_id.is_some()
    }

    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }

    pub fn choice_ids(&self) -> BTreeSet<&str> {
        self.choices.iter().map(|c| c.id.as_str()).collect()
    }

    /// Ids of the choices disclosed as correct, or `None` when any
    /// choice has undisclosed correctness.
    pub fn correct_choice_ids(&self) -> Option<BTreeSet<&str>> {
        let mut correct = BTreeSet::new();
        for choice in &self.choices {
            match choice.is_correct {
                Some(true) => {
                    correct.insert(choice.id.as_str());
                }
                Some(false) => {}
                None => return None,
            }
        }
        Some(correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(id: &str, is_correct: Option<bool>) -> Choice {
        Choice {
            id: id.into(),
            text: format!("choice {}", id),
            image_url: None,
            is_correct,
        }
    }

    #[test]
    fn correct_choice_ids_requires_full_disclosure() {
        let question = Question {
            id: "q1".into(),
            question_type: QuestionType::SingleChoice,
            question_text: "pick one".into(),
            image_url: None,
            weight: Decimal::ONE,
            required: true,
            choices: vec![choice("a", Some(true)), choice("b", None)],
            rows: vec![],
            parent_question_id: None,
            trigger_choice_ids: BTreeSet::new(),
        };
        assert_eq!(question.correct_choice_ids(), None);
    }

    #[test]
    fn question_type_uses_wire_vocabulary() {
        assert_eq!(
            serde_json::to_string(&QuestionType::SingleChoice).unwrap(),
            "\"SINGLE_CHOICE\""
        );
        assert_eq!(
            serde_json::to_string(&QuestionType::MultiChoice).unwrap(),
            "\"MULTI_CHOICE\""
        );
        assert_eq!(serde_json::to_string(&QuestionType::Text).unwrap(), "\"TEXT\"");
        assert_eq!(serde_json::to_string(&QuestionType::Grid).unwrap(), "\"GRID\"");
    }
}
