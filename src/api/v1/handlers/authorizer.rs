/*
 * Responsibility
 * - POST /authorize: gateway-style TOKEN authorizer
 * - Always 200; Deny is expressed in the policy document, not the status
 */
use axum::{Json, extract::State};
use tracing::Instrument;

use crate::api::v1::dto::authorizer::AuthorizerEvent;
use crate::services::auth::policy::AuthorizerResponse;
use crate::state::AppState;

pub async fn authorize(
    State(state): State<AppState>,
    Json(event): Json<AuthorizerEvent>,
) -> Json<AuthorizerResponse> {
    let span = tracing::info_span!(
        "authorizer",
        method_arn = %event.method_arn.as_deref().unwrap_or("-"),
        event_type = %event.event_type.as_deref().unwrap_or("-"),
    );

    let decision = state
        .authorizer
        .authorize(event.authorization_token.as_deref())
        .instrument(span)
        .await;

    Json(decision.to_policy_response())
}
