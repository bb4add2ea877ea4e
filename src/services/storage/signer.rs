//! Upload URL interface used by the attachment handler.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object key must not be empty")]
    EmptyKey,
    #[error("failed to sign upload url: {0}")]
    Signing(String),
}

/// Issues time-limited URLs that let a client upload one object directly.
///
/// Implementations must be cheap to share (`Arc<dyn UploadUrlSigner>`).
pub trait UploadUrlSigner: Send + Sync {
    /// Pre-signed `PUT` URL for `key`, valid for the signer's configured lifetime.
    fn upload_url(&self, key: &str) -> Result<String, StorageError>;

    /// Public location the object will have once uploaded.
    fn object_url(&self, key: &str) -> String;
}
