//! `Authorization: Bearer <token>` header parsing.

use crate::services::auth::error::AuthError;

const BEARER_PREFIX: &str = "bearer ";

/// Extract the token from a bearer header value.
///
/// The scheme is matched case-insensitively. The returned slice is trimmed and
/// may be empty (`"Bearer "`); the decoder rejects that as a missing token.
pub fn parse(header_value: &str) -> Result<&str, AuthError> {
    if header_value.trim().is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let scheme = header_value
        .get(..BEARER_PREFIX.len())
        .ok_or(AuthError::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return Err(AuthError::MalformedHeader);
    }

    let token = header_value[BEARER_PREFIX.len()..].trim();
    if token.split_whitespace().nth(1).is_some() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}
