//! Assurance level extraction and checks

use authkit_domain::{AssuranceLevel, AuthError, Result};

use super::jwt::decode_claims;

/// Current assurance level of `token`, from its `acr` claim.
///
/// Unrecognized or missing `acr` values degrade to `Aal1`.
///
/// # Errors
/// Returns `AuthError::InvalidToken` if the token cannot be decoded at all.
pub fn assurance_level(token: &str) -> Result<AssuranceLevel> {
    Ok(decode_claims(token)?.assurance_level())
}

/// Return the token's level if it meets `target`.
///
/// # Errors
/// Returns `AuthError::StepUpRequired` when the level is too low, or
/// `AuthError::InvalidToken` when the token cannot be decoded.
pub fn ensure_assurance(token: &str, target: AssuranceLevel) -> Result<AssuranceLevel> {
    let current = assurance_level(token)?;
    if current.satisfies(target) {
        Ok(current)
    } else {
        Err(AuthError::StepUpRequired { current: Some(current), required: Some(target) })
    }
}
