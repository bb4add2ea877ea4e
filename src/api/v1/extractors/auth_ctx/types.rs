/*
 * Responsibility
 * - The authenticated context handlers see
 * - Filled in by the bearer middleware; handlers depend only on this type
 */

/// Context attached to an authorized request.
///
/// `user_id` is the token subject (`sub`) and owns every todo the handlers touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: String,
}

impl AuthCtx {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
