use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::models::question::{QuestionType, QuizOption};
use crate::models::quiz::QuizDocument;
use crate::services::quiz_command::CommandOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddQuestionPayload {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Partial update of a question. Every field except `collapsed` is content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub question_type: Option<QuestionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[validate(range(min = 0.0, message = "Points cannot be negative"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[validate(length(min = 1, message = "A choice question needs at least one option"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuizOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_key_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
}

impl QuestionPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn question_type(question_type: QuestionType) -> Self {
        Self {
            question_type: Some(question_type),
            ..Self::default()
        }
    }

    pub fn collapsed(collapsed: bool) -> Self {
        Self {
            collapsed: Some(collapsed),
            ..Self::default()
        }
    }

    /// Whether applying this patch counts as a content edit.
    pub fn touches_content(&self) -> bool {
        let Self {
            title,
            description,
            question_type,
            required,
            points,
            options,
            answer_key_text,
            collapsed: _,
        } = self;
        title.is_some()
            || description.is_some()
            || question_type.is_some()
            || required.is_some()
            || points.is_some()
            || options.is_some()
            || answer_key_text.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}

/// Partial update of quiz settings. Nullable settings use a double option:
/// absent leaves the value alone, `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_time_limit"))]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_questions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_options: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_limit_minutes: Option<Option<u32>>,
    #[validate(range(min = 1, message = "At least one attempt must be allowed"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts_allowed: Option<u32>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_at: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_at: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_login: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_back_navigation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_question_per_page: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_correct_after_submit: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveQuestionPayload {
    pub to_index: usize,
}

fn validate_time_limit(patch: &SettingsPatch) -> Result<(), ValidationError> {
    match patch.time_limit_minutes {
        Some(Some(0)) => {
            let mut err = ValidationError::new("range");
            err.message = Some("Time limit must be at least 1 minute".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Reply to every mutating request: the outcome plus the document after it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizMutationResponse {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_id: Option<String>,
    pub document: QuizDocument,
}

impl QuizMutationResponse {
    pub fn new(outcome: CommandOutcome, document: QuizDocument) -> Self {
        Self {
            matched: outcome.matched,
            created_id: outcome.created_id,
            document,
        }
    }
}

// A present field (even `null`) deserializes to `Some(..)`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
