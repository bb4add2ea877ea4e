//! Unverified JWT decoding.
//!
//! Splits a compact JWT into its three segments and parses header and payload
//! without checking the signature. Nothing here may be trusted until the
//! verifier has accepted the token; it only exists so the key id can be read
//! before a key is resolved.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::services::auth::error::AuthError;

/// Tokens above this size are rejected before any parsing.
pub const MAX_TOKEN_BYTES: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub typ: Option<String>,
}

/// Payload claims as they appear on the wire, before verification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnverifiedClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub header: TokenHeader,
    pub payload: UnverifiedClaims,
    pub signature: Vec<u8>,
}

impl DecodedToken {
    /// Non-empty key id from the header.
    pub fn key_id(&self) -> Option<&str> {
        self.header.kid.as_deref().filter(|kid| !kid.trim().is_empty())
    }
}

pub fn decode(token: &str) -> Result<DecodedToken, AuthError> {
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    if token.len() > MAX_TOKEN_BYTES {
        return Err(AuthError::DecodeError("token too large"));
    }

    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::DecodeError("expected three segments"));
    };

    let header: TokenHeader = decode_json_segment(
        header,
        "header is not base64url",
        "header is not a JSON object",
    )?;
    let payload: UnverifiedClaims = decode_json_segment(
        payload,
        "payload is not base64url",
        "payload is not a JSON object",
    )?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| AuthError::DecodeError("signature is not base64url"))?;

    Ok(DecodedToken {
        header,
        payload,
        signature,
    })
}

fn decode_json_segment<T: DeserializeOwned>(
    segment: &str,
    not_base64: &'static str,
    not_json: &'static str,
) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::DecodeError(not_base64))?;

    serde_json::from_slice(&bytes).map_err(|_| AuthError::DecodeError(not_json))
}
