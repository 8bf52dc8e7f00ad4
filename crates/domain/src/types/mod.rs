//! Domain types and models
//!
//! Everything here is plain data: decoded transiently from the wire or from
//! a token string and handed to the caller.

pub mod assurance;
pub mod authorization;
pub mod claims;
pub mod discovery;
pub mod step_up;
pub mod tokens;
pub mod user;
pub mod validation;

pub use assurance::AssuranceLevel;
pub use authorization::{AuthorizationRequest, AuthorizationUrl, PkceChallenge};
pub use claims::{Audience, JwtClaims};
pub use discovery::{JsonWebKey, JsonWebKeySet, OidcDiscoveryDocument};
pub use step_up::{StepUpDecision, StepUpOptions};
pub use tokens::{TokenIntrospection, TokenResponse, TokenTypeHint};
pub use user::{SessionInfo, UserInfo};
pub use validation::{TokenValidation, ValidationErrorCode, ValidationOptions};
