use serde::{Deserialize, Serialize};

use crate::utils::id::new_id;

pub const DEFAULT_QUESTION_TITLE: &str = "Pertanyaan tanpa judul";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    /// Set only for questions that came from the remote question list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_points")]
    pub points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuizOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_key_text: Option<String>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub dirty: bool,
}

fn default_points() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    ShortText,
    Paragraph,
    MultipleChoice,
    Checkboxes,
}

impl QuestionType {
    pub fn has_options(self) -> bool {
        matches!(self, QuestionType::MultipleChoice | QuestionType::Checkboxes)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::ShortText => "short_text",
            QuestionType::Paragraph => "paragraph",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::Checkboxes => "checkboxes",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

impl QuizOption {
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            correct,
        }
    }

    /// Label given to the option at 1-based `position`.
    pub fn label_for(position: usize) -> String {
        format!("Opsi {}", position)
    }
}

/// Two options, the first one marked correct.
pub fn default_options() -> Vec<QuizOption> {
    vec![
        QuizOption::new(QuizOption::label_for(1), true),
        QuizOption::new(QuizOption::label_for(2), false),
    ]
}

impl Question {
    pub fn new(question_type: QuestionType) -> Self {
        let mut question = Self {
            id: new_id(),
            remote_id: None,
            title: DEFAULT_QUESTION_TITLE.to_string(),
            description: String::new(),
            question_type,
            required: false,
            points: default_points(),
            options: None,
            answer_key_text: None,
            collapsed: false,
            dirty: true,
        };
        question.conform_to_type();
        question
    }

    /// Brings `options` and `answer_key_text` in line with the current type.
    pub fn conform_to_type(&mut self) {
        if self.question_type.has_options() {
            if self.options.as_ref().map_or(true, |opts| opts.is_empty()) {
                self.options = Some(default_options());
            }
            self.answer_key_text = None;
        } else {
            self.options = None;
            if self.answer_key_text.is_none() {
                self.answer_key_text = Some(String::new());
            }
        }
    }

    pub fn option_mut(&mut self, option_id: &str) -> Option<&mut QuizOption> {
        self.options
            .as_mut()
            .and_then(|opts| opts.iter_mut().find(|o| o.id == option_id))
    }

    /// Deep copy with fresh ids for the question and every option.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = new_id();
        copy.remote_id = None;
        if let Some(opts) = copy.options.as_mut() {
            for option in opts.iter_mut() {
                option.id = new_id();
            }
        }
        copy
    }
}
