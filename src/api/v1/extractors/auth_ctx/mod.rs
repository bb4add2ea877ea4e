/*!
 * Authenticated request context
 *
 * Responsibility:
 * - Hand the principal the bearer gate authorized to handlers (AuthCtx)
 * - axum glue lives in core, the type in types
 */

mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use types::AuthCtx;
