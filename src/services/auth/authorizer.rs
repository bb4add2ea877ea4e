//! Bearer-token authorizer.
//!
//! Runs header parsing, unverified decoding, key resolution and signature
//! verification strictly in that order. Any failure ends in a Deny decision;
//! the reason is logged and never returned.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::services::auth::error::{AuthError, AuthStage};
use crate::services::auth::jwks::KeyResolver;
use crate::services::auth::policy::AuthDecision;
use crate::services::auth::verifier::{Claims, TokenVerifier};
use crate::services::auth::{bearer, token};

#[derive(Clone)]
pub struct Authorizer {
    resolver: Arc<dyn KeyResolver>,
    verifier: TokenVerifier,
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("verifier", &self.verifier)
            .finish()
    }
}

impl Authorizer {
    pub fn new(resolver: Arc<dyn KeyResolver>, verifier: TokenVerifier) -> Self {
        Self { resolver, verifier }
    }

    /// Run the pipeline and return the verified claims or the failure kind.
    pub async fn evaluate(&self, raw_header: Option<&str>) -> Result<Claims, AuthError> {
        debug!(stage = %AuthStage::Received, "authorizing request");

        debug!(stage = %AuthStage::ParsingHeader, "parsing authorization header");
        let raw_token = bearer::parse(raw_header.ok_or(AuthError::MissingHeader)?)?;

        debug!(stage = %AuthStage::DecodingToken, "decoding token");
        let decoded = token::decode(raw_token)?;
        let kid = decoded.key_id().ok_or(AuthError::MissingKeyId)?;

        debug!(
            stage = %AuthStage::ResolvingKey,
            kid = %kid,
            alg = %decoded.header.alg,
            "resolving signing key"
        );
        let key = self.resolver.resolve(kid).await?;

        debug!(stage = %AuthStage::VerifyingSignature, kid = %key.kid(), "verifying signature");
        self.verifier.verify(raw_token, &decoded.header, &key)
    }

    /// Allow/deny decision for the given `Authorization` header value.
    ///
    /// Emits exactly one log event per call, in the caller's span.
    pub async fn authorize(&self, raw_header: Option<&str>) -> AuthDecision {
        match self.evaluate(raw_header).await {
            Ok(claims) => {
                info!(
                    stage = %AuthStage::Allowed,
                    principal_id = %claims.sub,
                    "request authorized"
                );
                AuthDecision::allow(claims.sub)
            }
            Err(err) => {
                warn!(
                    stage = %AuthStage::Denied,
                    failed_stage = %err.stage(),
                    reason = err.kind(),
                    error = ?err,
                    "request denied"
                );
                AuthDecision::deny()
            }
        }
    }
}
