use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::setup::{
    KEY_POINTS_JANE, KEY_POINTS_JOHN, MAX_STARTING_POINTS, PROMPT_POINTS_JANE, PROMPT_POINTS_JOHN,
};
use crate::errors::SourceError;
use crate::types::OptionKey;

/// Kind of value a setup question collects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionKind {
    /// Numeric answer.
    Number,
    /// Free-form text answer.
    Text,
    /// Yes/no answer.
    Confirm,
}

/// One interactive question to put to the operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    /// Kind of value the question collects.
    pub kind: QuestionKind,
    /// Answer key the response is stored under.
    pub key: OptionKey,
    /// Prompt shown to the operator.
    pub message: String,
}

impl Question {
    /// A numeric question.
    pub fn number(key: impl Into<OptionKey>, message: impl Into<String>) -> Self {
        Self {
            kind: QuestionKind::Number,
            key: key.into(),
            message: message.into(),
        }
    }

    /// A free-form text question.
    pub fn text(key: impl Into<OptionKey>, message: impl Into<String>) -> Self {
        Self {
            kind: QuestionKind::Text,
            key: key.into(),
            message: message.into(),
        }
    }

    /// A yes/no question.
    pub fn confirm(key: impl Into<OptionKey>, message: impl Into<String>) -> Self {
        Self {
            kind: QuestionKind::Confirm,
            key: key.into(),
            message: message.into(),
        }
    }
}

/// A scalar answer captured during setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Numeric answer.
    Number(f64),
    /// Text answer.
    Text(String),
    /// Yes/no answer.
    Bool(bool),
}

impl AnswerValue {
    /// Numeric view of the answer, when it is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        AnswerValue::Number(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Bool(value)
    }
}

/// Raw answers collected during the interactive exchange, in question order.
pub type Answers = IndexMap<OptionKey, AnswerValue>;
/// Option values derived from answers, written verbatim into persisted
/// configuration.
pub type PersistedOptions = IndexMap<OptionKey, AnswerValue>;

/// Deferred setup procedure.
///
/// Free to display progress and make exploratory calls against the remote
/// source before resolving to an answers map.
pub type SetupProcedure = Box<dyn FnOnce() -> Result<Answers, SourceError> + Send>;

/// Output of the question-generation phase: either a static question list
/// the host renders itself, or a procedure that runs its own exchange.
pub enum SetupPlan {
    /// Static ordered question list.
    Questions(Vec<Question>),
    /// Deferred interactive procedure.
    Procedure(SetupProcedure),
}

impl fmt::Debug for SetupPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupPlan::Questions(questions) => {
                f.debug_tuple("Questions").field(&questions.len()).finish()
            }
            SetupPlan::Procedure(_) => f.debug_tuple("Procedure").finish(),
        }
    }
}

/// The plugin's setup questions, in prompt order.
pub fn questions() -> Vec<Question> {
    vec![
        Question::number(KEY_POINTS_JANE, PROMPT_POINTS_JANE),
        Question::number(KEY_POINTS_JOHN, PROMPT_POINTS_JOHN),
    ]
}

/// Question-generation phase: a procedure that shows progress and prompts
/// the operator.
#[cfg(feature = "interactive")]
pub fn setup_plan() -> SetupPlan {
    SetupPlan::Procedure(Box::new(|| {
        use crate::constants::setup::PROGRESS_MESSAGE;
        use console::style;

        println!("{} {}", style("◐").cyan(), PROGRESS_MESSAGE);
        // Room for exploratory calls against the remote source.
        println!("{} {}", style("✔").green(), PROGRESS_MESSAGE);

        prompt_questions(&questions())
    }))
}

/// Question-generation phase: without the `interactive` feature, the host
/// renders the static question list itself.
#[cfg(not(feature = "interactive"))]
pub fn setup_plan() -> SetupPlan {
    SetupPlan::Questions(questions())
}

/// Prompt a question list on the terminal and collect answers in order.
#[cfg(feature = "interactive")]
pub fn prompt_questions(questions: &[Question]) -> Result<Answers, SourceError> {
    use dialoguer::theme::ColorfulTheme;
    use dialoguer::{Confirm, Input};

    let theme = ColorfulTheme::default();
    let mut answers = Answers::new();
    for question in questions {
        let value = match question.kind {
            QuestionKind::Number => AnswerValue::Number(
                Input::<f64>::with_theme(&theme)
                    .with_prompt(&question.message)
                    .interact_text()
                    .map_err(|err| SourceError::Setup(err.to_string()))?,
            ),
            QuestionKind::Text => AnswerValue::Text(
                Input::<String>::with_theme(&theme)
                    .with_prompt(&question.message)
                    .interact_text()
                    .map_err(|err| SourceError::Setup(err.to_string()))?,
            ),
            QuestionKind::Confirm => AnswerValue::Bool(
                Confirm::with_theme(&theme)
                    .with_prompt(&question.message)
                    .interact()
                    .map_err(|err| SourceError::Setup(err.to_string()))?,
            ),
        };
        answers.insert(question.key.clone(), value);
    }
    Ok(answers)
}

/// Answer post-processing phase: derive the option values to persist.
///
/// Pure function, no I/O: its output is written verbatim into persisted
/// configuration. Out-of-domain numeric answers are clamped, not rejected.
pub fn options_from_setup(answers: &Answers) -> PersistedOptions {
    let mut persisted = PersistedOptions::new();
    if let Some(jane) = answers.get(KEY_POINTS_JANE) {
        persisted.insert(KEY_POINTS_JANE.to_string(), jane.clone());
    }
    if let Some(john) = answers.get(KEY_POINTS_JOHN) {
        let value = match john {
            AnswerValue::Number(points) => AnswerValue::Number(points.min(MAX_STARTING_POINTS)),
            other => other.clone(),
        };
        persisted.insert(KEY_POINTS_JOHN.to_string(), value);
    }
    persisted
}
