use crate::error::{Error, Result};
use crate::models::question::{Question, QuestionType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 1-based and contiguous across the definition.
    pub section_number: u32,
    pub questions: Vec<Question>,
}

/// Immutable questionnaire definition: ordered sections of questions,
/// with follow-up linkage between questions. Section and question
/// order is significant and fixed at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireDefinition {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sections: Vec<Section>,
}

impl QuestionnaireDefinition {
    /// All questions in declaration order across sections.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions().find(|q| q.id == question_id)
    }

    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// Structural validation, run once when a definition is loaded.
    /// A malformed definition is rejected outright, never patched up.
    pub fn validate(&self) -> Result<()> {
        let mut question_ids = HashSet::new();
        for (idx, section) in self.sections.iter().enumerate() {
            let expected = idx as u32 + 1;
            if section.section_number != expected {
                return Err(Error::Definition(format!(
                    "section '{}' has number {}, expected {}",
                    section.title, section.section_number, expected
                )));
            }
            for question in &section.questions {
                if !question_ids.insert(question.id.as_str()) {
                    return Err(Error::Definition(format!(
                        "duplicate question id '{}'",
                        question.id
                    )));
                }
                self.validate_question(question)?;
            }
        }
        for question in self.questions() {
            if question.is_follow_up() {
                self.validate_follow_up(question)?;
            }
        }
        Ok(())
    }

    fn validate_question(&self, question: &Question) -> Result<()> {
        let mut choice_ids = HashSet::new();
        for choice in &question.choices {
            if !choice_ids.insert(choice.id.as_str()) {
                return Err(Error::Definition(format!(
                    "question '{}' has duplicate choice id '{}'",
                    question.id, choice.id
                )));
            }
        }
        match question.question_type {
            QuestionType::Text => {
                if !question.choices.is_empty() {
                    return Err(Error::Definition(format!(
                        "TEXT question '{}' must not declare choices",
                        question.id
                    )));
                }
            }
            QuestionType::Grid => {
                if question.rows.is_empty() {
                    return Err(Error::Definition(format!(
                        "GRID question '{}' must declare at least one row",
                        question.id
                    )));
                }
            }
            QuestionType::SingleChoice | QuestionType::MultiChoice => {
                if question.choices.is_empty() {
                    return Err(Error::Definition(format!(
                        "choice question '{}' must declare choices",
                        question.id
                    )));
                }
            }
        }
        if !question.is_follow_up() && !question.trigger_choice_ids.is_empty() {
            return Err(Error::Definition(format!(
                "question '{}' has trigger choices but no parent",
                question.id
            )));
        }
        Ok(())
    }

    fn validate_follow_up(&self, question: &Question) -> Result<()> {
        let parent_id = question.parent_question_id.as_deref().unwrap_or_default();
        let parent = self.question(parent_id).ok_or_else(|| {
            Error::Definition(format!(
                "follow-up '{}' references missing parent '{}'",
                question.id, parent_id
            ))
        })?;
        if parent.is_follow_up() {
            return Err(Error::Definition(format!(
                "follow-up '{}' chains onto follow-up '{}'; the model is two-level",
                question.id, parent.id
            )));
        }
        if parent.question_type == QuestionType::Grid {
            return Err(Error::Definition(format!(
                "follow-up '{}' has a GRID parent '{}'",
                question.id, parent.id
            )));
        }
        if question.trigger_choice_ids.is_empty() {
            return Err(Error::Definition(format!(
                "follow-up '{}' declares no trigger choices",
                question.id
            )));
        }
        let parent_choices = parent.choice_ids();
        for trigger in &question.trigger_choice_ids {
            if !parent_choices.contains(trigger.as_str()) {
                return Err(Error::Definition(format!(
                    "follow-up '{}' trigger '{}' is not a choice of parent '{}'",
                    question.id, trigger, parent.id
                )));
            }
        }
        Ok(())
    }

    /// Copy of the definition with all choice correctness withheld,
    /// for handing to a trainee before results are disclosed.
    pub fn sanitized_for_trainee(&self) -> QuestionnaireDefinition {
        let mut sanitized = self.clone();
        for section in &mut sanitized.sections {
            for question in &mut section.questions {
                for choice in &mut question.choices {
                    choice.is_correct = None;
                }
            }
        }
        sanitized
    }
}
