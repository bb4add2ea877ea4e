//! Signing key lookup against a remote JWKS endpoint.
//!
//! Keys are cached per key id. A cache miss always goes to the network; an
//! entry older than the TTL is refreshed, and served stale only if the refresh
//! itself fails.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, PublicKeyUse};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::services::auth::error::AuthError;

/// Public key material for one key id.
#[derive(Debug, Clone)]
pub struct SigningKey {
    kid: String,
    jwk: Jwk,
}

impl SigningKey {
    pub fn new(kid: impl Into<String>, jwk: Jwk) -> Self {
        Self {
            kid: kid.into(),
            jwk,
        }
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn jwk(&self) -> &Jwk {
        &self.jwk
    }
}

/// Resolves a token's key id to the key that should verify it.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve(&self, kid: &str) -> Result<SigningKey, AuthError>;
}

// Keys are parsed one by one so a single unsupported entry does not poison the set.
#[derive(Debug, Deserialize)]
struct RawJwkSet {
    keys: Vec<serde_json::Value>,
}

struct CachedKey {
    key: SigningKey,
    fetched_at: Instant,
}

pub struct JwksClient {
    jwks_url: Url,
    http_client: reqwest::Client,
    cache: RwLock<HashMap<String, CachedKey>>,
    cache_ttl: Duration,
}

impl std::fmt::Debug for JwksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksClient")
            .field("jwks_url", &self.jwks_url.as_str())
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl JwksClient {
    pub fn new(jwks_url: Url, cache_ttl: Duration, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build JWKS http client, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
            cache: RwLock::new(HashMap::new()),
            cache_ttl,
        }
    }

    pub fn jwks_url(&self) -> &Url {
        &self.jwks_url
    }

    async fn fetch_key_set(&self) -> Result<HashMap<String, SigningKey>, AuthError> {
        debug!(url = %self.jwks_url, "fetching JWKS");

        let response = self
            .http_client
            .get(self.jwks_url.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::KeyFetchError("JWKS request timed out".to_string())
                } else {
                    AuthError::KeyFetchError(format!("JWKS request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::KeyFetchError(format!(
                "JWKS endpoint returned {status}"
            )));
        }

        let raw: RawJwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::KeyFetchError(format!("JWKS body is invalid: {e}")))?;

        let mut keys = HashMap::with_capacity(raw.keys.len());
        for value in raw.keys {
            let jwk: Jwk = match serde_json::from_value(value) {
                Ok(jwk) => jwk,
                Err(e) => {
                    debug!(error = %e, "skipping unsupported JWK");
                    continue;
                }
            };
            if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
                continue;
            }
            let Some(kid) = jwk.common.key_id.clone().filter(|k| !k.is_empty()) else {
                continue;
            };
            keys.insert(kid.clone(), SigningKey::new(kid, jwk));
        }

        info!(key_count = keys.len(), "JWKS fetched");
        Ok(keys)
    }

    async fn store(&self, keys: &HashMap<String, SigningKey>) {
        let fetched_at = Instant::now();
        let mut cache = self.cache.write().await;
        *cache = keys
            .iter()
            .map(|(kid, key)| {
                (
                    kid.clone(),
                    CachedKey {
                        key: key.clone(),
                        fetched_at,
                    },
                )
            })
            .collect();
    }
}

#[async_trait]
impl KeyResolver for JwksClient {
    #[instrument(skip(self), fields(kid = %kid))]
    async fn resolve(&self, kid: &str) -> Result<SigningKey, AuthError> {
        if kid.trim().is_empty() {
            return Err(AuthError::MissingKeyId);
        }

        let stale = {
            let cache = self.cache.read().await;
            match cache.get(kid) {
                Some(cached) if cached.fetched_at.elapsed() < self.cache_ttl => {
                    debug!("signing key cache hit");
                    return Ok(cached.key.clone());
                }
                Some(cached) => Some(cached.key.clone()),
                None => None,
            }
        };

        let keys = match self.fetch_key_set().await {
            Ok(keys) => keys,
            Err(err) => {
                if let Some(key) = stale {
                    warn!(error = %err, "JWKS refresh failed, serving cached signing key");
                    return Ok(key);
                }
                debug!(error = %err, "JWKS fetch failed");
                return Err(err);
            }
        };

        self.store(&keys).await;

        keys.get(kid).cloned().ok_or_else(|| {
            debug!("no JWKS key matches the token key id");
            AuthError::KeyNotFound
        })
    }
}
