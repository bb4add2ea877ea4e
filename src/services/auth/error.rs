use std::fmt;

/// Why a bearer token was rejected.
///
/// Every variant ends the current authorization with a Deny decision. The
/// variant is only ever logged, never returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("authorization header is not a bearer credential")]
    MalformedHeader,
    #[error("missing bearer token")]
    MissingToken,
    #[error("token could not be decoded: {0}")]
    DecodeError(&'static str),
    #[error("token header has no key id")]
    MissingKeyId,
    #[error("no signing key matches the token key id")]
    KeyNotFound,
    #[error("signing keys could not be fetched: {0}")]
    KeyFetchError(String),
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    ExpiredToken,
    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("token claims are invalid: {0}")]
    InvalidClaims(String),
}

impl AuthError {
    /// Pipeline stage that produced this error.
    pub fn stage(&self) -> AuthStage {
        match self {
            Self::MissingHeader | Self::MalformedHeader => AuthStage::ParsingHeader,
            Self::MissingToken | Self::DecodeError(_) => AuthStage::DecodingToken,
            Self::MissingKeyId | Self::KeyNotFound | Self::KeyFetchError(_) => {
                AuthStage::ResolvingKey
            }
            Self::InvalidSignature
            | Self::ExpiredToken
            | Self::UnsupportedAlgorithm(_)
            | Self::InvalidClaims(_) => AuthStage::VerifyingSignature,
        }
    }

    /// Stable, low-cardinality name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::MalformedHeader => "malformed_header",
            Self::MissingToken => "missing_token",
            Self::DecodeError(_) => "decode_error",
            Self::MissingKeyId => "missing_key_id",
            Self::KeyNotFound => "key_not_found",
            Self::KeyFetchError(_) => "key_fetch_error",
            Self::InvalidSignature => "invalid_signature",
            Self::ExpiredToken => "expired_token",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::InvalidClaims(_) => "invalid_claims",
        }
    }
}

/// States of one authorization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    Received,
    ParsingHeader,
    DecodingToken,
    ResolvingKey,
    VerifyingSignature,
    Allowed,
    Denied,
}

impl AuthStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::ParsingHeader => "parsing_header",
            Self::DecodingToken => "decoding_token",
            Self::ResolvingKey => "resolving_key",
            Self::VerifyingSignature => "verifying_signature",
            Self::Allowed => "allowed",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
