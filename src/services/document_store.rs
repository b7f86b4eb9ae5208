use tracing::{debug, info, warn};

use crate::dto::builder_dto::{OptionPatch, QuestionPatch, SettingsPatch};
use crate::dto::remote_dto::RemoteQuestion;
use crate::error::Result;
use crate::models::question::{Question, QuestionType, QuizOption};
use crate::models::quiz::{QuizDocument, QuizSettings, QuizStatus};
use crate::services::publish_service::{PublishOutcome, PublishService};
use crate::services::quiz_command::{CommandOutcome, QuizCommand};
use crate::services::sync_service::map_remote_questions;
use crate::services::transfer_service::{ExportedDocument, TransferService};
use crate::storage::{DocumentRepository, StorageKey};
use crate::utils::id::new_id;

/// Holds one quiz document in memory and mirrors it to a repository after
/// every change. Repository failures are logged, never returned.
pub struct QuizDocumentStore<R: DocumentRepository> {
    repository: R,
    key: StorageKey,
    document: QuizDocument,
    /// Bumped on every change, never persisted.
    revision: u64,
}

impl<R: DocumentRepository> QuizDocumentStore<R> {
    /// Reads the stored document for `quiz_id`, or starts a fresh draft when
    /// nothing usable is stored.
    pub fn load(repository: R, quiz_id: Option<&str>) -> Self {
        let key = StorageKey::for_quiz(quiz_id);
        let document = match repository.load(&key) {
            Ok(Some(document)) => document,
            Ok(None) => {
                info!(key = %key, "No stored quiz document, starting a new draft");
                Self::default_document(&key)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Stored quiz document unusable, starting a new draft");
                Self::default_document(&key)
            }
        };
        Self {
            repository,
            key,
            document,
            revision: 0,
        }
    }

    fn default_document(key: &StorageKey) -> QuizDocument {
        QuizDocument::new(key.quiz_id().map(str::to_string).unwrap_or_else(new_id))
    }

    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    pub fn document(&self) -> &QuizDocument {
        &self.document
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn apply(&mut self, command: QuizCommand) -> CommandOutcome {
        let name = command.name();
        let outcome = reduce(&mut self.document, command);
        self.document.touch();
        self.revision += 1;
        if outcome.matched {
            debug!(key = %self.key, command = name, "Applied quiz command");
        } else {
            warn!(key = %self.key, command = name, "Quiz command did not apply");
        }
        self.persist();
        outcome
    }

    fn persist(&self) {
        if let Err(e) = self.repository.save(&self.key, &self.document) {
            warn!(key = %self.key, error = %e, "Failed to mirror quiz document");
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> CommandOutcome {
        self.apply(QuizCommand::SetTitle {
            title: title.into(),
        })
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> CommandOutcome {
        self.apply(QuizCommand::SetDescription {
            description: description.into(),
        })
    }

    /// Replaces all questions with the remote list. Local edits are discarded.
    pub fn sync_from_remote(&mut self, questions: Vec<RemoteQuestion>) -> CommandOutcome {
        self.apply(QuizCommand::SyncFromRemote { questions })
    }

    /// Appends a new question and returns its id.
    pub fn add_question(&mut self, question_type: QuestionType) -> String {
        self.apply(QuizCommand::AddQuestion { question_type })
            .created_id
            .unwrap_or_default()
    }

    pub fn update_question(&mut self, id: &str, patch: QuestionPatch) -> CommandOutcome {
        self.apply(QuizCommand::UpdateQuestion {
            id: id.to_string(),
            patch,
        })
    }

    pub fn remove_question(&mut self, id: &str) -> CommandOutcome {
        self.apply(QuizCommand::RemoveQuestion { id: id.to_string() })
    }

    /// Inserts a copy right after the original; the copy's id is in `created_id`.
    pub fn duplicate_question(&mut self, id: &str) -> CommandOutcome {
        self.apply(QuizCommand::DuplicateQuestion { id: id.to_string() })
    }

    pub fn move_question(&mut self, id: &str, to_index: usize) -> CommandOutcome {
        self.apply(QuizCommand::MoveQuestion {
            id: id.to_string(),
            to_index,
        })
    }

    pub fn add_option(&mut self, question_id: &str) -> CommandOutcome {
        self.apply(QuizCommand::AddOption {
            question_id: question_id.to_string(),
        })
    }

    pub fn update_option(
        &mut self,
        question_id: &str,
        option_id: &str,
        patch: OptionPatch,
    ) -> CommandOutcome {
        self.apply(QuizCommand::UpdateOption {
            question_id: question_id.to_string(),
            option_id: option_id.to_string(),
            patch,
        })
    }

    pub fn remove_option(&mut self, question_id: &str, option_id: &str) -> CommandOutcome {
        self.apply(QuizCommand::RemoveOption {
            question_id: question_id.to_string(),
            option_id: option_id.to_string(),
        })
    }

    pub fn set_single_correct(&mut self, question_id: &str, option_id: &str) -> CommandOutcome {
        self.apply(QuizCommand::SetSingleCorrect {
            question_id: question_id.to_string(),
            option_id: option_id.to_string(),
        })
    }

    pub fn finish_editing_question(&mut self, id: &str) -> CommandOutcome {
        self.apply(QuizCommand::FinishEditing { id: id.to_string() })
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> CommandOutcome {
        self.apply(QuizCommand::UpdateSettings { patch })
    }

    pub fn export_document(&self) -> Result<ExportedDocument> {
        TransferService::export(&self.document)
    }

    /// Replaces the whole document. On error nothing changes.
    pub fn import_document(&mut self, raw: &str) -> Result<()> {
        let mut imported = TransferService::parse(raw)?;
        if imported.id.trim().is_empty() {
            imported.id = self.document.id.clone();
        }
        info!(
            key = %self.key,
            questions = imported.questions.len(),
            "Imported quiz document"
        );
        self.document = imported;
        self.revision += 1;
        self.persist();
        Ok(())
    }

    pub fn prepare_publish(&self) -> PublishOutcome {
        PublishService::build(&self.document)
    }

    pub fn mark_published(&mut self) {
        self.document.status = QuizStatus::Published;
        self.document.touch();
        self.revision += 1;
        self.persist();
    }

    /// Marks the document published only if nothing changed since `revision`
    /// was read, so edits made while a payload was in flight stay drafts.
    pub fn mark_published_if_unchanged(&mut self, revision: u64) -> bool {
        if self.revision != revision {
            warn!(
                key = %self.key,
                expected = revision,
                current = self.revision,
                "Quiz changed while publishing, leaving it unpublished"
            );
            return false;
        }
        self.mark_published();
        true
    }

    /// Builds the payload and marks the document published.
    pub fn publish(&mut self) -> PublishOutcome {
        let outcome = self.prepare_publish();
        self.mark_published();
        outcome
    }
}

/// Applies one command to the document. Does not touch `updated_at`.
pub fn reduce(document: &mut QuizDocument, command: QuizCommand) -> CommandOutcome {
    match command {
        QuizCommand::SetTitle { title } => {
            document.title = title;
            CommandOutcome::matched()
        }
        QuizCommand::SetDescription { description } => {
            document.description = description;
            CommandOutcome::matched()
        }
        QuizCommand::AddQuestion { question_type } => {
            let question = Question::new(question_type);
            let id = question.id.clone();
            document.questions.push(question);
            CommandOutcome::created(id)
        }
        QuizCommand::UpdateQuestion { id, patch } => match document.question_mut(&id) {
            Some(question) => {
                apply_question_patch(question, patch);
                CommandOutcome::matched()
            }
            None => CommandOutcome::unmatched(),
        },
        QuizCommand::RemoveQuestion { id } => {
            let before = document.questions.len();
            document.questions.retain(|q| q.id != id);
            CommandOutcome::from_match(document.questions.len() != before)
        }
        QuizCommand::DuplicateQuestion { id } => match document.position_of(&id) {
            Some(pos) => {
                let copy = document.questions[pos].duplicate();
                let copy_id = copy.id.clone();
                document.questions.insert(pos + 1, copy);
                CommandOutcome::created(copy_id)
            }
            None => CommandOutcome::unmatched(),
        },
        QuizCommand::MoveQuestion { id, to_index } => match document.position_of(&id) {
            Some(pos) => {
                let question = document.questions.remove(pos);
                let target = to_index.min(document.questions.len());
                document.questions.insert(target, question);
                CommandOutcome::matched()
            }
            None => CommandOutcome::unmatched(),
        },
        QuizCommand::AddOption { question_id } => {
            let Some(question) = document.question_mut(&question_id) else {
                return CommandOutcome::unmatched();
            };
            let Some(options) = question.options.as_mut() else {
                return CommandOutcome::unmatched();
            };
            let option = QuizOption::new(QuizOption::label_for(options.len() + 1), false);
            let option_id = option.id.clone();
            options.push(option);
            question.dirty = true;
            CommandOutcome::created(option_id)
        }
        QuizCommand::UpdateOption {
            question_id,
            option_id,
            patch,
        } => {
            let Some(question) = document.question_mut(&question_id) else {
                return CommandOutcome::unmatched();
            };
            let Some(option) = question.option_mut(&option_id) else {
                return CommandOutcome::unmatched();
            };
            if let Some(text) = patch.text {
                option.text = text;
            }
            if let Some(correct) = patch.correct {
                option.correct = correct;
            }
            question.dirty = true;
            CommandOutcome::matched()
        }
        QuizCommand::RemoveOption {
            question_id,
            option_id,
        } => {
            let Some(question) = document.question_mut(&question_id) else {
                return CommandOutcome::unmatched();
            };
            let Some(options) = question.options.as_mut() else {
                return CommandOutcome::unmatched();
            };
            let Some(pos) = options.iter().position(|o| o.id == option_id) else {
                return CommandOutcome::unmatched();
            };
            // a choice question keeps at least one option
            if options.len() == 1 {
                return CommandOutcome::unmatched();
            }
            options.remove(pos);
            question.dirty = true;
            CommandOutcome::matched()
        }
        QuizCommand::SetSingleCorrect {
            question_id,
            option_id,
        } => {
            let Some(question) = document.question_mut(&question_id) else {
                return CommandOutcome::unmatched();
            };
            let Some(options) = question.options.as_mut() else {
                return CommandOutcome::unmatched();
            };
            if !options.iter().any(|o| o.id == option_id) {
                return CommandOutcome::unmatched();
            }
            for option in options.iter_mut() {
                option.correct = option.id == option_id;
            }
            question.dirty = true;
            CommandOutcome::matched()
        }
        QuizCommand::FinishEditing { id } => match document.question_mut(&id) {
            Some(question) => {
                question.collapsed = true;
                question.dirty = false;
                CommandOutcome::matched()
            }
            None => CommandOutcome::unmatched(),
        },
        QuizCommand::UpdateSettings { patch } => {
            apply_settings_patch(&mut document.settings, patch);
            CommandOutcome::matched()
        }
        QuizCommand::SyncFromRemote { questions } => {
            document.questions = map_remote_questions(questions);
            CommandOutcome::matched()
        }
    }
}

fn apply_question_patch(question: &mut Question, patch: QuestionPatch) {
    let content_changed = patch.touches_content();
    let QuestionPatch {
        title,
        description,
        question_type,
        required,
        points,
        options,
        answer_key_text,
        collapsed,
    } = patch;
    let options_patched = options.is_some();

    if let Some(title) = title {
        question.title = title;
    }
    if let Some(description) = description {
        question.description = description;
    }
    if let Some(required) = required {
        question.required = required;
    }
    if let Some(points) = points {
        question.points = points;
    }
    if let Some(question_type) = question_type {
        question.question_type = question_type;
    }
    if let Some(options) = options {
        if question.question_type.has_options() {
            question.options = Some(options);
        }
    }
    if let Some(answer_key_text) = answer_key_text {
        if !question.question_type.has_options() {
            question.answer_key_text = Some(answer_key_text);
        }
    }
    if question_type.is_some() || options_patched {
        question.conform_to_type();
    }
    if let Some(collapsed) = collapsed {
        question.collapsed = collapsed;
    }
    if content_changed {
        question.dirty = true;
    }
}

fn apply_settings_patch(settings: &mut QuizSettings, patch: SettingsPatch) {
    let SettingsPatch {
        shuffle_questions,
        shuffle_options,
        time_limit_minutes,
        attempts_allowed,
        start_at,
        end_at,
        require_login,
        prevent_back_navigation,
        one_question_per_page,
        show_correct_after_submit,
    } = patch;

    if let Some(v) = shuffle_questions {
        settings.shuffle_questions = v;
    }
    if let Some(v) = shuffle_options {
        settings.shuffle_options = v;
    }
    if let Some(v) = time_limit_minutes {
        settings.time_limit_minutes = v;
    }
    if let Some(v) = attempts_allowed {
        settings.attempts_allowed = v;
    }
    if let Some(v) = start_at {
        settings.start_at = v;
    }
    if let Some(v) = end_at {
        settings.end_at = v;
    }
    if let Some(v) = require_login {
        settings.require_login = v;
    }
    if let Some(v) = prevent_back_navigation {
        settings.prevent_back_navigation = v;
    }
    if let Some(v) = one_question_per_page {
        settings.one_question_per_page = v;
    }
    if let Some(v) = show_correct_after_submit {
        settings.show_correct_after_submit = v;
    }
}
