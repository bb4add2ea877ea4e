pub mod authorizer;
pub mod bearer;
pub mod error;
pub mod factory;
pub mod jwks;
pub mod policy;
pub mod token;
pub mod verifier;

pub use authorizer::Authorizer;
pub use error::{AuthError, AuthStage};
pub use factory::build_authorizer;
pub use policy::{AuthDecision, Effect};
