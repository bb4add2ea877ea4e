/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - todo store, authorizer, upload URL signer
 * - Cheap to clone (everything behind Arc)
 */
use std::sync::Arc;

use crate::repos::TodoStore;
use crate::services::auth::Authorizer;
use crate::services::storage::UploadUrlSigner;

#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<dyn TodoStore>,
    pub authorizer: Arc<Authorizer>,
    pub uploads: Arc<dyn UploadUrlSigner>,
}

impl AppState {
    pub fn new(
        todos: Arc<dyn TodoStore>,
        authorizer: Arc<Authorizer>,
        uploads: Arc<dyn UploadUrlSigner>,
    ) -> Self {
        Self {
            todos,
            authorizer,
            uploads,
        }
    }
}
