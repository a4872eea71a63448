//! `/api/students` handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use super::{guarded, parse_id, Envelope, JsonBody};
use crate::error::ApiResult;
use crate::models::{StudentInfo, StudentInput};
use crate::state::{AppState, Store};

pub(super) fn routes<S: Store>(state: &AppState<S>) -> Router<AppState<S>> {
    let reads = state.access.students.guards_reads();

    Router::new()
        .route(
            "/students",
            guarded(state, get(list::<S>), reads).merge(guarded(state, post(create::<S>), reads)),
        )
        .route(
            "/students/{id}",
            guarded(state, get(fetch::<S>), reads)
                .merge(guarded(state, put(update::<S>).delete(remove::<S>), true)),
        )
}

async fn list<S: Store>(State(state): State<AppState<S>>) -> ApiResult<Json<Vec<StudentInfo>>> {
    let students = state.students().list().await?;
    Ok(Json(students.iter().map(StudentInfo::from).collect()))
}

async fn fetch<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Option<StudentInfo>>> {
    let student = state.students().get(parse_id(&id)?).await?;
    Ok(Json(student.map(StudentInfo::from)))
}

async fn create<S: Store>(
    State(state): State<AppState<S>>,
    JsonBody(input): JsonBody<StudentInput>,
) -> ApiResult<(StatusCode, Json<Envelope<StudentInfo>>)> {
    let student = state.students().create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("Student created successfully", StudentInfo::from(student))),
    ))
}

async fn update<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<StudentInput>,
) -> ApiResult<Json<Envelope<StudentInfo>>> {
    let student = state.students().update(parse_id(&id)?, input).await?;
    Ok(Json(Envelope::new(
        "Student updated successfully",
        StudentInfo::from(student),
    )))
}

async fn remove<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<StudentInfo>>> {
    let student = state.students().delete(parse_id(&id)?).await?;
    Ok(Json(Envelope::new(
        "Student deleted successfully",
        StudentInfo::from(student),
    )))
}
