pub mod s3;
pub mod signer;

pub use s3::S3Presigner;
pub use signer::{StorageError, UploadUrlSigner};
