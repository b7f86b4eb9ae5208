use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::question::Question;
use crate::utils::time::now;

pub const DEFAULT_QUIZ_TITLE: &str = "Kuis Tanpa Judul";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub settings: QuizSettings,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub status: QuizStatus,
    #[serde(default = "now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizSettings {
    pub shuffle_questions: bool,
    pub shuffle_options: bool,
    pub time_limit_minutes: Option<u32>,
    pub attempts_allowed: u32,
    pub start_at: Option<String>,
    pub end_at: Option<String>,
    pub require_login: bool,
    pub prevent_back_navigation: bool,
    pub one_question_per_page: bool,
    pub show_correct_after_submit: bool,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            shuffle_questions: false,
            shuffle_options: false,
            time_limit_minutes: None,
            attempts_allowed: 1,
            start_at: None,
            end_at: None,
            require_login: true,
            prevent_back_navigation: false,
            one_question_per_page: false,
            show_correct_after_submit: true,
        }
    }
}

impl QuizDocument {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_QUIZ_TITLE.to_string(),
            description: String::new(),
            settings: QuizSettings::default(),
            questions: Vec::new(),
            status: QuizStatus::Draft,
            updated_at: now(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now();
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn question_mut(&mut self, id: &str) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id == id)
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_document_is_empty_draft() {
        let doc = QuizDocument::new("quiz-1");
        assert_eq!(doc.id, "quiz-1");
        assert!(doc.questions.is_empty());
        assert_eq!(doc.status, QuizStatus::Draft);
        assert_eq!(doc.settings.attempts_allowed, 1);
        assert!(doc.settings.require_login);
        assert!(doc.settings.show_correct_after_submit);
        assert!(!doc.settings.prevent_back_navigation);
        assert!(!doc.settings.shuffle_questions);
        assert!(doc.settings.time_limit_minutes.is_none());
    }

    #[test]
    fn partial_settings_fall_back_to_defaults() {
        let doc: QuizDocument = serde_json::from_str(
            r#"{"questions": [], "settings": {"shuffleQuestions": true}}"#,
        )
        .unwrap();
        assert!(doc.settings.shuffle_questions);
        assert_eq!(doc.settings.attempts_allowed, 1);
        assert!(doc.settings.require_login);
    }
}
