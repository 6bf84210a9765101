use axum::Json;
use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::{Todo, TodoPayload};
use crate::state::AppState;
use crate::validation::{self, TodoQueryParams};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/todos/", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}/",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/agenda/", get(agenda))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.ping().await?;
    Ok(StatusCode::OK)
}

async fn list_todos(
    State(state): State<AppState>,
    Query(params): Query<TodoQueryParams>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let filter = validation::validate_query(&params)?;
    debug!(?filter, "listing todos");
    let todos = state.store.list_todos(&filter).await?;
    Ok(Json(todos))
}

/// A missing id answers 200 with an empty body.
async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    debug!(id, "fetching todo");
    let response = match state.store.find_todo(id).await? {
        Some(todo) => Json(todo).into_response(),
        None => StatusCode::OK.into_response(),
    };
    Ok(response)
}

async fn agenda(
    State(state): State<AppState>,
    Query(params): Query<TodoQueryParams>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let filter = validation::validate_agenda_query(&params)?;
    debug!(?filter, "listing agenda");
    let todos = state.store.list_todos(&filter).await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<AppState>,
    Json(payload): Json<TodoPayload>,
) -> Result<&'static str, AppError> {
    let todo = validation::validate_body(&payload)?.into_new_todo()?;
    state.store.insert_todo(&todo).await?;
    info!(id = todo.id, "todo created");
    Ok("Todo Successfully Added")
}

/// Writes exactly one field; see `ValidatedBody::into_change` for which.
/// A body with nothing to update is accepted and changes nothing.
async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<TodoPayload>,
) -> Result<&'static str, AppError> {
    let Some(change) = validation::validate_body(&payload)?.into_change() else {
        debug!(id, "update without any updatable field");
        return Ok("");
    };
    let touched = state.store.update_todo(id, &change).await?;
    info!(id, column = change.column(), touched, "todo updated");
    Ok(change.confirmation())
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<&'static str, AppError> {
    let touched = state.store.delete_todo(id).await?;
    info!(id, touched, "todo deleted");
    Ok("Todo Deleted")
}
