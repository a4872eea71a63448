//! `/api/notes` handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use store::Note;

use super::{guarded, parse_id, Envelope, JsonBody};
use crate::error::ApiResult;
use crate::models::NoteInput;
use crate::state::{AppState, Store};

pub(super) fn routes<S: Store>(state: &AppState<S>) -> Router<AppState<S>> {
    let reads = state.access.notes.guards_reads();

    Router::new()
        .route(
            "/notes",
            guarded(state, get(list::<S>), reads).merge(guarded(state, post(create::<S>), reads)),
        )
        .route(
            "/notes/{id}",
            guarded(state, get(fetch::<S>), reads)
                .merge(guarded(state, put(update::<S>).delete(remove::<S>), true)),
        )
}

async fn list<S: Store>(State(state): State<AppState<S>>) -> ApiResult<Json<Vec<Note>>> {
    Ok(Json(state.notes().list().await?))
}

async fn fetch<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Option<Note>>> {
    Ok(Json(state.notes().get(parse_id(&id)?).await?))
}

async fn create<S: Store>(
    State(state): State<AppState<S>>,
    JsonBody(input): JsonBody<NoteInput>,
) -> ApiResult<(StatusCode, Json<Envelope<Note>>)> {
    let note = state.notes().create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("Note created successfully", note)),
    ))
}

async fn update<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<NoteInput>,
) -> ApiResult<Json<Envelope<Note>>> {
    let note = state.notes().update(parse_id(&id)?, input).await?;
    Ok(Json(Envelope::new("Note updated successfully", note)))
}

async fn remove<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Note>>> {
    let note = state.notes().delete(parse_id(&id)?).await?;
    Ok(Json(Envelope::new("Note deleted successfully", note)))
}
