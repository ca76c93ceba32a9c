use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One recorded answer. The variant must match the question type:
/// `Choices` for SINGLE_CHOICE/MULTI_CHOICE, `Text` for TEXT, `Grid`
/// for GRID. Single-choice questions and grid rows hold at most one id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Choices {
        #[serde(rename = "selectedChoiceIds")]
        selected_choice_ids: BTreeSet<String>,
    },
    Text {
        #[serde(rename = "textAnswer")]
        text_answer: String,
    },
    Grid {
        #[serde(rename = "rowSelections")]
        row_selections: BTreeMap<String, BTreeSet<String>>,
    },
}

impl Answer {
    pub fn single_choice(choice_id: impl Into<String>) -> Self {
        Answer::Choices {
            selected_choice_ids: BTreeSet::from([choice_id.into()]),
        }
    }

    pub fn multi_choice<I, S>(choice_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Answer::Choices {
            selected_choice_ids: choice_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Answer::Text {
            text_answer: text.into(),
        }
    }

    pub fn selected_choice_ids(&self) -> Option<&BTreeSet<String>> {
        match self {
            Answer::Choices { selected_choice_ids } => Some(selected_choice_ids),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Recorded,
    /// The entry already held an answer; the write was ignored.
    AlreadyAnswered,
}

/// Answers keyed by question id, write-once per question. Whether a
/// question is answered is a map lookup, never a flag held alongside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    entries: BTreeMap<String, Answer>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer unless the question already has one. An
    /// existing entry is never overwritten; retried writes report
    /// `AlreadyAnswered` and succeed.
    pub fn record(&mut self, question_id: impl Into<String>, answer: Answer) -> WriteOutcome {
        let question_id = question_id.into();
        if self.entries.contains_key(&question_id) {
            tracing::warn!(question_id = %question_id, "ignoring write to already-answered entry");
            return WriteOutcome::AlreadyAnswered;
        }
        self.entries.insert(question_id, answer);
        WriteOutcome::Recorded
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.entries.get(question_id)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.entries.contains_key(question_id)
    }

    pub fn selected_choice_ids(&self, question_id: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(question_id).and_then(Answer::selected_choice_ids)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Answer)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_write_once() {
        let mut answers = AnswerSet::new();
        assert_eq!(
            answers.record("q1", Answer::single_choice("a")),
            WriteOutcome::Recorded
        );
        assert_eq!(
            answers.record("q1", Answer::single_choice("b")),
            WriteOutcome::AlreadyAnswered
        );
        // The original answer survives the retried write.
        assert_eq!(
            answers.selected_choice_ids("q1").unwrap().iter().next().unwrap(),
            "a"
        );
    }

    #[test]
    fn answer_set_round_trips_through_json() {
        let mut answers = AnswerSet::new();
        answers.record("q1", Answer::multi_choice(["a", "c"]));
        answers.record("q2", Answer::text("  spaces kept verbatim  "));
        answers.record(
            "q3",
            Answer::Grid {
                row_selections: BTreeMap::from([
                    ("R1".to_string(), BTreeSet::from(["a".to_string()])),
                    ("R2".to_string(), BTreeSet::from(["b".to_string()])),
                ]),
            },
        );

        let json = serde_json::to_string(&answers).unwrap();
        let back: AnswerSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answers);
    }
}
