use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::builder_dto::{
        AddQuestionPayload, MetadataPatch, MoveQuestionPayload, OptionPatch, QuestionPatch,
        QuizMutationResponse, SettingsPatch,
    },
    error::Result,
    services::{document_store::QuizDocumentStore, quiz_command::{CommandOutcome, QuizCommand}},
    storage::SharedRepository,
    AppState,
};

/// Runs one mutation against the quiz and replies with the resulting document.
fn mutate(
    state: &AppState,
    quiz_id: &str,
    f: impl FnOnce(&mut QuizDocumentStore<SharedRepository>) -> CommandOutcome,
) -> Result<QuizMutationResponse> {
    state.workspace.with_store(quiz_id, |store| {
        let outcome = f(store);
        QuizMutationResponse::new(outcome, store.document().clone())
    })
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse> {
    let document = state
        .workspace
        .with_store(&quiz_id, |store| store.document().clone())?;
    Ok(Json(document))
}

#[axum::debug_handler]
pub async fn apply_command(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(command): Json<QuizCommand>,
) -> Result<impl IntoResponse> {
    command.validate()?;
    let response = mutate(&state, &quiz_id, |store| store.apply(command))?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn update_metadata(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<MetadataPatch>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let response = mutate(&state, &quiz_id, |store| {
        let mut outcome = CommandOutcome::matched();
        if let Some(title) = payload.title {
            outcome = store.set_title(title);
        }
        if let Some(description) = payload.description {
            outcome = store.set_description(description);
        }
        outcome
    })?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn add_question(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<AddQuestionPayload>,
) -> Result<impl IntoResponse> {
    let response = mutate(&state, &quiz_id, |store| {
        store.apply(QuizCommand::AddQuestion {
            question_type: payload.question_type,
        })
    })?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn update_question(
    State(state): State<AppState>,
    Path((quiz_id, question_id)): Path<(String, String)>,
    Json(patch): Json<QuestionPatch>,
) -> Result<impl IntoResponse> {
    patch.validate()?;
    let response = mutate(&state, &quiz_id, |store| {
        store.update_question(&question_id, patch)
    })?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn remove_question(
    State(state): State<AppState>,
    Path((quiz_id, question_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let response = mutate(&state, &quiz_id, |store| store.remove_question(&question_id))?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn duplicate_question(
    State(state): State<AppState>,
    Path((quiz_id, question_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let response = mutate(&state, &quiz_id, |store| {
        store.duplicate_question(&question_id)
    })?;
    let status = if response.created_id.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(response)))
}

#[axum::debug_handler]
pub async fn move_question(
    State(state): State<AppState>,
    Path((quiz_id, question_id)): Path<(String, String)>,
    Json(payload): Json<MoveQuestionPayload>,
) -> Result<impl IntoResponse> {
    let response = mutate(&state, &quiz_id, |store| {
        store.move_question(&question_id, payload.to_index)
    })?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn finish_editing_question(
    State(state): State<AppState>,
    Path((quiz_id, question_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let response = mutate(&state, &quiz_id, |store| {
        store.finish_editing_question(&question_id)
    })?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn add_option(
    State(state): State<AppState>,
    Path((quiz_id, question_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let response = mutate(&state, &quiz_id, |store| store.add_option(&question_id))?;
    let status = if response.created_id.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(response)))
}

#[axum::debug_handler]
pub async fn update_option(
    State(state): State<AppState>,
    Path((quiz_id, question_id, option_id)): Path<(String, String, String)>,
    Json(patch): Json<OptionPatch>,
) -> Result<impl IntoResponse> {
    let response = mutate(&state, &quiz_id, |store| {
        store.update_option(&question_id, &option_id, patch)
    })?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn remove_option(
    State(state): State<AppState>,
    Path((quiz_id, question_id, option_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse> {
    let response = mutate(&state, &quiz_id, |store| {
        store.remove_option(&question_id, &option_id)
    })?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn set_single_correct(
    State(state): State<AppState>,
    Path((quiz_id, question_id, option_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse> {
    let response = mutate(&state, &quiz_id, |store| {
        store.set_single_correct(&question_id, &option_id)
    })?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn update_settings(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(patch): Json<SettingsPatch>,
) -> Result<impl IntoResponse> {
    patch.validate()?;
    let response = mutate(&state, &quiz_id, |store| store.update_settings(patch))?;
    Ok(Json(response))
}
