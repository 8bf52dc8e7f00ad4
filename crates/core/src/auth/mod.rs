//! Token acquisition, validation and refresh.

pub mod assurance;
pub mod authorize_url;
pub mod client;
pub mod discovery;
pub mod http;
pub mod jwt;
pub mod pkce;
pub mod ports;
pub mod refresh;
pub mod signature;
pub mod user_context;
pub mod validator;

pub use assurance::{assurance_level, ensure_assurance};
pub use authorize_url::build_authorization_url;
pub use jwt::decode_claims;
pub use pkce::{
    generate_code_challenge, generate_code_verifier, generate_pkce_challenge, generate_state,
    validate_state,
};
pub use validator::{validate_claims_at, validate_token_at};
