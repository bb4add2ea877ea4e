//! RS256 signature and claim verification.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{AlgorithmParameters, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::debug;

use crate::services::auth::error::AuthError;
use crate::services::auth::jwks::SigningKey;
use crate::services::auth::token::TokenHeader;

/// The only algorithm tokens may be signed with.
pub const ALLOWED_ALGORITHM: &str = "RS256";

/// Verified claim set.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub iss: Option<String>,
    // String or array of strings.
    #[serde(default)]
    pub aud: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Access-token verifier.
///
/// Issuer and audience are only checked when configured; once configured,
/// tokens without the claim are rejected. `nbf` is honoured when present.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(issuer: Option<&str>, audience: Option<&str>, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = leeway_seconds;
        validation.validate_exp = true;
        validation.validate_nbf = true;

        // A configured issuer or audience cannot match a token that omits the claim.
        let mut required = vec!["exp", "sub"];
        if issuer.is_some() {
            required.push("iss");
        }
        if audience.is_some() {
            required.push("aud");
        }
        validation.set_required_spec_claims(&required);

        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self { validation }
    }

    /// Verify `token` with `key`.
    ///
    /// `header` is the unverified header of the same token; its algorithm is
    /// checked before any cryptographic work so `none` and HMAC tokens never
    /// reach the signature check.
    pub fn verify(
        &self,
        token: &str,
        header: &TokenHeader,
        key: &SigningKey,
    ) -> Result<Claims, AuthError> {
        if header.alg != ALLOWED_ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm(printable_alg(&header.alg)));
        }

        let jwk = key.jwk();
        if let Some(alg) = jwk.common.key_algorithm.as_ref()
            && *alg != KeyAlgorithm::RS256
        {
            return Err(AuthError::UnsupportedAlgorithm(format!(
                "key {} is for {alg:?}",
                key.kid()
            )));
        }
        if !matches!(jwk.algorithm, AlgorithmParameters::RSA(_)) {
            return Err(AuthError::UnsupportedAlgorithm(format!(
                "key {} is not an RSA key",
                key.kid()
            )));
        }

        let decoding_key = DecodingKey::from_jwk(jwk).map_err(|e| {
            debug!(kid = %key.kid(), error = %e, "unusable JWK material");
            AuthError::InvalidSignature
        })?;

        let data = jsonwebtoken::decode::<Claims>(token, &decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "token verification failed");
                map_jwt_error(e.kind(), &header.alg)
            })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidClaims("empty sub".to_string()));
        }

        Ok(data.claims)
    }
}

/// Longest `alg` value carried into an error; the value comes from the client.
const MAX_ALG_CHARS: usize = 32;

// Client-supplied, so control characters are escaped and the length is capped.
fn printable_alg(alg: &str) -> String {
    alg.chars()
        .take(MAX_ALG_CHARS)
        .flat_map(char::escape_debug)
        .collect()
}

fn map_jwt_error(kind: &ErrorKind, alg: &str) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            AuthError::UnsupportedAlgorithm(printable_alg(alg))
        }
        ErrorKind::InvalidIssuer => AuthError::InvalidClaims("iss".to_string()),
        ErrorKind::InvalidAudience => AuthError::InvalidClaims("aud".to_string()),
        ErrorKind::ImmatureSignature => AuthError::InvalidClaims("nbf".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::InvalidClaims(format!("missing {claim}"))
        }
        ErrorKind::Json(_) => AuthError::InvalidClaims("malformed claims".to_string()),
        _ => AuthError::InvalidSignature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rsa_key(kid: &str, alg: Option<&str>) -> SigningKey {
        let mut json = serde_json::json!({
            "kty": "RSA",
            "kid": kid,
            "use": "sig",
            "n": "sXchDaQebHnPiGvyDOAT4saGEUetSyo9MKLOoWFsueri23bOdgWp4Dy1WlUzewbgBHod5pcM9H95GQRV3JDXboIRROSBigeC5yjU1hGzHHyXss8UDprecbAYxknTcQkhslANGRUZmdTOQ5qTRsLAt6BTYuyvVRdhS8exSZEy_c4gs_7svlJJQ4H9_NxsiIoLwAEk7-Q3UXERGYw_75IDrGA84-lA_-Ct4eTlXHBIY2EaV7t7LjJaynVJCpkv4LKjTTAumiGUIuQhrNhZLuF_RJLqHpM2kgWFLU7-VTdL1VbC2tejvcI2BlMkEpk1BzBZI0KQB0GaDWFLN-aEAw3vRw",
            "e": "AQAB"
        });
        if let Some(alg) = alg {
            json["alg"] = serde_json::json!(alg);
        }
        SigningKey::new(kid, serde_json::from_value(json).unwrap())
    }

    fn header(alg: &str) -> TokenHeader {
        TokenHeader {
            alg: alg.to_string(),
            kid: Some("key-1".to_string()),
            typ: Some("JWT".to_string()),
        }
    }

    #[test]
    fn none_and_symmetric_algorithms_are_rejected_up_front() {
        let verifier = TokenVerifier::new(None, None, 0);
        let key = rsa_key("key-1", Some("RS256"));

        for alg in ["none", "HS256", "ES256", "RS512", "rs256"] {
            let err = verifier.verify("a.b.c", &header(alg), &key).unwrap_err();
            assert_eq!(err, AuthError::UnsupportedAlgorithm(alg.to_string()));
        }
    }

    #[test]
    fn key_declaring_another_algorithm_is_rejected() {
        let verifier = TokenVerifier::new(None, None, 0);
        let key = rsa_key("key-1", Some("RS384"));

        let err = verifier
            .verify("a.b.c", &header("RS256"), &key)
            .unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn non_rsa_key_is_rejected() {
        let verifier = TokenVerifier::new(None, None, 0);
        let jwk = serde_json::from_value(serde_json::json!({
            "kty": "oct",
            "kid": "key-1",
            "k": "c2VjcmV0"
        }))
        .unwrap();
        let key = SigningKey::new("key-1", jwk);

        let err = verifier
            .verify("a.b.c", &header("RS256"), &key)
            .unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn garbage_token_with_rsa_key_fails_verification() {
        let verifier = TokenVerifier::new(None, None, 0);
        let key = rsa_key("key-1", None);

        let err = verifier
            .verify("a.b.c", &header("RS256"), &key)
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidSignature | AuthError::InvalidClaims(_)
        ));
    }

    #[test]
    fn configured_issuer_and_audience_become_required_claims() {
        let open = TokenVerifier::new(None, None, 0);
        assert!(!open.validation.required_spec_claims.contains("iss"));
        assert!(!open.validation.required_spec_claims.contains("aud"));

        let strict = TokenVerifier::new(Some("https://issuer.example/"), Some("todo-api"), 30);
        for claim in ["exp", "sub", "iss", "aud"] {
            assert!(strict.validation.required_spec_claims.contains(claim), "{claim}");
        }
        assert!(strict.validation.validate_nbf);
        assert_eq!(strict.validation.leeway, 30);
    }

    #[test]
    fn client_supplied_algorithm_is_escaped_and_capped() {
        let verifier = TokenVerifier::new(None, None, 0);
        let key = rsa_key("key-1", Some("RS256"));

        let err = verifier
            .verify("a.b.c", &header("x\nINFO forged line"), &key)
            .unwrap_err();
        let AuthError::UnsupportedAlgorithm(alg) = &err else {
            panic!("unexpected error {err:?}");
        };
        assert!(!alg.contains('\n'));
        assert!(!err.to_string().contains('\n'));

        let long = "A".repeat(500);
        let err = verifier.verify("a.b.c", &header(&long), &key).unwrap_err();
        assert_eq!(err, AuthError::UnsupportedAlgorithm("A".repeat(MAX_ALG_CHARS)));
    }

    #[test]
    fn jwt_error_kinds_map_onto_the_taxonomy() {
        assert_eq!(
            map_jwt_error(&ErrorKind::ExpiredSignature, "RS256"),
            AuthError::ExpiredToken
        );
        assert_eq!(
            map_jwt_error(&ErrorKind::InvalidSignature, "RS256"),
            AuthError::InvalidSignature
        );
        assert_eq!(
            map_jwt_error(&ErrorKind::InvalidAlgorithm, "HS256"),
            AuthError::UnsupportedAlgorithm("HS256".to_string())
        );
        assert_eq!(
            map_jwt_error(&ErrorKind::ImmatureSignature, "RS256"),
            AuthError::InvalidClaims("nbf".to_string())
        );
        assert_eq!(
            map_jwt_error(&ErrorKind::MissingRequiredClaim("sub".into()), "RS256"),
            AuthError::InvalidClaims("missing sub".to_string())
        );
    }
}
