use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::builder_dto::{OptionPatch, QuestionPatch, SettingsPatch};
use crate::dto::remote_dto::RemoteQuestion;
use crate::error::Result;
use crate::models::question::QuestionType;

/// Every mutation the quiz document store understands. Tags and fields are
/// camelCase like the rest of the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QuizCommand {
    SetTitle {
        title: String,
    },
    SetDescription {
        description: String,
    },
    AddQuestion {
        #[serde(rename = "type")]
        question_type: QuestionType,
    },
    UpdateQuestion {
        id: String,
        patch: QuestionPatch,
    },
    RemoveQuestion {
        id: String,
    },
    DuplicateQuestion {
        id: String,
    },
    MoveQuestion {
        id: String,
        to_index: usize,
    },
    AddOption {
        question_id: String,
    },
    UpdateOption {
        question_id: String,
        option_id: String,
        patch: OptionPatch,
    },
    RemoveOption {
        question_id: String,
        option_id: String,
    },
    SetSingleCorrect {
        question_id: String,
        option_id: String,
    },
    FinishEditing {
        id: String,
    },
    UpdateSettings {
        patch: SettingsPatch,
    },
    SyncFromRemote {
        questions: Vec<RemoteQuestion>,
    },
}

impl QuizCommand {
    pub fn name(&self) -> &'static str {
        match self {
            QuizCommand::SetTitle { .. } => "setTitle",
            QuizCommand::SetDescription { .. } => "setDescription",
            QuizCommand::AddQuestion { .. } => "addQuestion",
            QuizCommand::UpdateQuestion { .. } => "updateQuestion",
            QuizCommand::RemoveQuestion { .. } => "removeQuestion",
            QuizCommand::DuplicateQuestion { .. } => "duplicateQuestion",
            QuizCommand::MoveQuestion { .. } => "moveQuestion",
            QuizCommand::AddOption { .. } => "addOption",
            QuizCommand::UpdateOption { .. } => "updateOption",
            QuizCommand::RemoveOption { .. } => "removeOption",
            QuizCommand::SetSingleCorrect { .. } => "setSingleCorrect",
            QuizCommand::FinishEditing { .. } => "finishEditing",
            QuizCommand::UpdateSettings { .. } => "updateSettings",
            QuizCommand::SyncFromRemote { .. } => "syncFromRemote",
        }
    }

    /// Checks the payload-carrying variants before they reach the store.
    pub fn validate(&self) -> Result<()> {
        match self {
            QuizCommand::UpdateQuestion { patch, .. } => patch.validate()?,
            QuizCommand::UpdateSettings { patch } => patch.validate()?,
            _ => {}
        }
        Ok(())
    }
}

/// Result of applying one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    /// False when the command named an id the document does not contain, or
    /// when applying it would leave a choice question without options.
    pub matched: bool,
    /// Id of the question or option the command created, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_id: Option<String>,
}

impl CommandOutcome {
    pub fn matched() -> Self {
        Self {
            matched: true,
            created_id: None,
        }
    }

    pub fn unmatched() -> Self {
        Self {
            matched: false,
            created_id: None,
        }
    }

    pub fn created(id: String) -> Self {
        Self {
            matched: true,
            created_id: Some(id),
        }
    }

    pub fn from_match(matched: bool) -> Self {
        if matched {
            Self::matched()
        } else {
            Self::unmatched()
        }
    }
}
