pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod utils;

use std::time::Duration;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::services::{remote_service::RemoteQuizService, workspace_service::QuizWorkspace};
use crate::storage::SharedRepository;

#[derive(Clone)]
pub struct AppState {
    pub workspace: QuizWorkspace,
    pub remote: Option<RemoteQuizService>,
}

impl AppState {
    pub fn new(repository: SharedRepository) -> error::Result<Self> {
        let config = crate::config::get_config();
        let remote = match config.quiz_api_base_url.clone() {
            Some(base_url) => Some(RemoteQuizService::new(
                base_url,
                Duration::from_secs(config.remote_timeout_secs),
            )?),
            None => {
                tracing::info!("Remote quiz API disabled (QUIZ_API_BASE_URL not set)");
                None
            }
        };
        Ok(Self {
            workspace: QuizWorkspace::with_capacity(repository, config.max_open_quizzes),
            remote,
        })
    }

    pub fn with_parts(repository: SharedRepository, remote: Option<RemoteQuizService>) -> Self {
        Self {
            workspace: QuizWorkspace::new(repository),
            remote,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let quiz_api = Router::new()
        .route(
            "/api/quizzes/:quiz_id",
            get(routes::quiz::get_quiz).patch(routes::quiz::update_metadata),
        )
        .route(
            "/api/quizzes/:quiz_id/commands",
            post(routes::quiz::apply_command),
        )
        .route(
            "/api/quizzes/:quiz_id/questions",
            post(routes::quiz::add_question),
        )
        .route(
            "/api/quizzes/:quiz_id/questions/:question_id",
            patch(routes::quiz::update_question).delete(routes::quiz::remove_question),
        )
        .route(
            "/api/quizzes/:quiz_id/questions/:question_id/duplicate",
            post(routes::quiz::duplicate_question),
        )
        .route(
            "/api/quizzes/:quiz_id/questions/:question_id/move",
            post(routes::quiz::move_question),
        )
        .route(
            "/api/quizzes/:quiz_id/questions/:question_id/finish",
            post(routes::quiz::finish_editing_question),
        )
        .route(
            "/api/quizzes/:quiz_id/questions/:question_id/options",
            post(routes::quiz::add_option),
        )
        .route(
            "/api/quizzes/:quiz_id/questions/:question_id/options/:option_id",
            patch(routes::quiz::update_option).delete(routes::quiz::remove_option),
        )
        .route(
            "/api/quizzes/:quiz_id/questions/:question_id/options/:option_id/correct",
            post(routes::quiz::set_single_correct),
        )
        .route(
            "/api/quizzes/:quiz_id/settings",
            patch(routes::quiz::update_settings),
        )
        .route(
            "/api/quizzes/:quiz_id/export",
            get(routes::transfer::export_quiz),
        )
        .route(
            "/api/quizzes/:quiz_id/import",
            post(routes::transfer::import_quiz),
        )
        .route(
            "/api/quizzes/:quiz_id/sync",
            post(routes::transfer::sync_quiz),
        )
        .route(
            "/api/quizzes/:quiz_id/publish",
            post(routes::transfer::publish_quiz),
        );

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(quiz_api)
        .with_state(state)
}
