/*
 * Responsibility
 * - /todos handlers, always scoped to the authorized principal (AuthCtx)
 * - DTO validation -> store / upload signer
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::todos::{
            CreateTodoRequest, TodoItemResponse, TodoListResponse, UpdateTodoRequest,
            UploadUrlResponse,
        },
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    repos::TodoRow,
    state::AppState,
};

pub async fn list_todos(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<TodoListResponse>, AppError> {
    let rows = state.todos.list_by_user(&ctx.user_id).await?;

    Ok(Json(TodoListResponse {
        items: rows.into_iter().map(Into::into).collect(),
    }))
}

pub async fn create_todo(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoItemResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_TODO", msg))?;

    let todo_id = Uuid::new_v4();
    let row = TodoRow {
        user_id: ctx.user_id,
        todo_id,
        created_at: Utc::now(),
        name: req.name.trim().to_string(),
        due_date: req.due_date,
        done: false,
        attachment_url: Some(state.uploads.object_url(&todo_id.to_string())),
    };

    let row = state.todos.create(&row).await?;
    tracing::info!(todo_id = %row.todo_id, "todo created");

    Ok((
        StatusCode::CREATED,
        Json(TodoItemResponse { item: row.into() }),
    ))
}

pub async fn update_todo(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(todo_id): Path<Uuid>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<Json<TodoItemResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_TODO", msg))?;

    let row = state
        .todos
        .update(&ctx.user_id, todo_id, &req.into_update())
        .await?
        .ok_or(AppError::not_found("todo"))?;

    Ok(Json(TodoItemResponse { item: row.into() }))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(todo_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.todos.delete(&ctx.user_id, todo_id).await? {
        tracing::info!(todo_id = %todo_id, "todo deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("todo"))
    }
}

pub async fn create_upload_url(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(todo_id): Path<Uuid>,
) -> Result<(StatusCode, Json<UploadUrlResponse>), AppError> {
    // Only the owner may upload an attachment for a todo.
    state
        .todos
        .get(&ctx.user_id, todo_id)
        .await?
        .ok_or(AppError::not_found("todo"))?;

    let key = todo_id.to_string();
    let upload_url = state.uploads.upload_url(&key)?;
    state
        .todos
        .set_attachment_url(&ctx.user_id, todo_id, &state.uploads.object_url(&key))
        .await?;
    tracing::info!(todo_id = %todo_id, "upload url issued");

    Ok((StatusCode::CREATED, Json(UploadUrlResponse { upload_url })))
}
