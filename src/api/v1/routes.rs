/*
 * Responsibility
 * - v1 URL layout
 * - /authorize is public (it is the gate itself); /todos sits behind the bearer middleware
 */
use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::api::v1::handlers::{
    authorizer::authorize,
    todos::{create_todo, create_upload_url, delete_todo, list_todos, update_todo},
};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let todos = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{todo_id}", patch(update_todo).delete(delete_todo))
        .route("/todos/{todo_id}/attachment", post(create_upload_url));

    Router::new()
        .route("/authorize", post(authorize))
        .merge(middleware::auth::access::apply(todos, state))
}
