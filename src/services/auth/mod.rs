pub mod bearer;
pub mod identity;
pub mod resolver;
pub mod verifier;

pub use bearer::bearer_token;
pub use identity::{
    IDENTITY_CONTEXT_KEY, Identity, Session, session_from_extensions, session_from_request,
};
pub use resolver::KeyResolver;
pub use verifier::{PINNED_ALGORITHM, TokenVerifier, VerifiedClaims};
