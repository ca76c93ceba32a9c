pub mod dto;
pub mod error;
pub mod models;
pub mod remote;
pub mod services;

pub use crate::error::{Error, Result};
pub use crate::models::answer::{Answer, AnswerSet, WriteOutcome};
pub use crate::models::attempt::{Attempt, AttemptStatus, AttemptType};
pub use crate::models::question::{Choice, Question, QuestionType};
pub use crate::models::questionnaire::{QuestionnaireDefinition, Section};
pub use crate::remote::{AccessContext, DataService, EntryAnswered, SubmitAck};
pub use crate::services::session_service::AttemptSession;
