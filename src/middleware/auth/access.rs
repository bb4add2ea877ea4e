//! Bearer-token gate for the todo routes.
//!
//! Runs the `Authorizer` on the `Authorization` header. A Deny becomes a bare
//! 401; an Allow puts `AuthCtx { user_id: principal }` into the request
//! extensions for the handlers.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// Put the bearer gate in front of every route in `router`.
///
/// ```ignore
/// let todos = middleware::auth::access::apply(todo_routes(), state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8: from_fn cannot take the State extractor, so pass state explicitly
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Non-UTF-8 header values are treated like a missing header.
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let decision = state.authorizer.authorize(authorization).await;
    if !decision.is_allowed() {
        return Err(AppError::Unauthorized);
    }

    // middleware -> extractor handoff
    req.extensions_mut()
        .insert(AuthCtx::new(decision.principal_id));

    Ok(next.run(req).await)
}
