/// Factory: build the `Authorizer` from application `AuthConfig`.
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::services::auth::Authorizer;
use crate::services::auth::jwks::JwksClient;
use crate::services::auth::verifier::TokenVerifier;

pub fn build_authorizer(config: &AuthConfig) -> Arc<Authorizer> {
    let resolver = JwksClient::new(
        config.jwks_url.clone(),
        config.jwks_cache_ttl,
        config.jwks_timeout,
    );

    let verifier = TokenVerifier::new(
        config.issuer.as_deref(),
        config.audience.as_deref(),
        config.leeway_seconds,
    );

    Arc::new(Authorizer::new(Arc::new(resolver), verifier))
}
