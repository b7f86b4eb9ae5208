use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Serialize;

use crate::{
    dto::remote_dto::PublishPayload,
    error::{Error, Result},
    models::quiz::QuizStatus,
    services::{
        publish_service::SkippedQuestion, transfer_service::EXPORT_CONTENT_TYPE,
        workspace_service::normalize_quiz_id,
    },
    AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub status: QuizStatus,
    pub remote_delivered: bool,
    /// True when the quiz was edited while the payload was being delivered;
    /// the document then stays a draft.
    pub changed_during_publish: bool,
    pub payload: PublishPayload,
    pub skipped: Vec<SkippedQuestion>,
}

/// Download the quiz as `<slug>.quiz.json`
pub async fn export_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse> {
    let exported = state
        .workspace
        .with_store(&quiz_id, |store| store.export_document())??;
    let disposition = format!("attachment; filename=\"{}\"", exported.filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        exported.contents,
    ))
}

/// Replace the quiz with an uploaded export. The body is the raw JSON file.
pub async fn import_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    body: String,
) -> Result<impl IntoResponse> {
    let document = state.workspace.with_store(&quiz_id, |store| {
        store
            .import_document(&body)
            .map(|_| store.document().clone())
    })??;
    Ok(Json(document))
}

/// Pull the question list from the school backend and overwrite local questions.
pub async fn sync_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse> {
    let quiz_id = normalize_quiz_id(&quiz_id)?;
    let remote = state
        .remote
        .as_ref()
        .ok_or_else(|| Error::Config("Remote quiz API is not configured".to_string()))?;
    let questions = remote.fetch_questions(quiz_id).await?;
    let document = state.workspace.with_store(quiz_id, |store| {
        store.sync_from_remote(questions);
        store.document().clone()
    })?;
    Ok(Json(document))
}

/// Build the publish payload, deliver it when a backend is configured, and
/// mark the quiz published once delivery succeeded and nothing changed in
/// the meantime.
pub async fn publish_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse> {
    let quiz_id = normalize_quiz_id(&quiz_id)?;
    let (outcome, revision) = state
        .workspace
        .with_store(quiz_id, |store| (store.prepare_publish(), store.revision()))?;

    let remote_delivered = match state.remote.as_ref() {
        Some(remote) => {
            remote.push_publish(&outcome.payload).await?;
            true
        }
        None => {
            tracing::info!(quiz_id = %quiz_id, "No remote quiz API configured, publishing locally");
            false
        }
    };

    let (published, status) = state.workspace.with_store(quiz_id, |store| {
        let published = store.mark_published_if_unchanged(revision);
        (published, store.document().status)
    })?;

    Ok(Json(PublishResponse {
        status,
        remote_delivered,
        changed_during_publish: !published,
        payload: outcome.payload,
        skipped: outcome.skipped,
    }))
}
