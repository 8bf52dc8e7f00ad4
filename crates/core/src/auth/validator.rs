//! Token validation
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. decode (`malformed`)
//! 2. `exp + tolerance < now` (`expired`)
//! 3. `nbf - tolerance > now` (`expired`)
//! 4. issuer (`invalid_issuer`)
//! 5. audience (`invalid_audience`)
//! 6. required scopes (`insufficient_scope`)
//! 7. assurance level (`insufficient_assurance`)
//!
//! Callers depend on this order: an expired token that also lacks scopes
//! reports `expired`.

use authkit_domain::{JwtClaims, TokenValidation, ValidationErrorCode, ValidationOptions};
use tracing::debug;

use super::jwt::decode_claims;

/// Validate `token` against `options` at `now` (seconds since the epoch).
///
/// Decodes without checking the signature.
#[must_use]
pub fn validate_token_at(token: &str, options: &ValidationOptions, now: i64) -> TokenValidation {
    match decode_claims(token) {
        Ok(claims) => validate_claims_at(claims, options, now),
        Err(err) => {
            debug!(error = %err, "token failed to decode");
            TokenValidation::invalid(
                ValidationErrorCode::Malformed,
                format!("Token could not be decoded: {err}"),
            )
        }
    }
}

/// Run checks 2 to 7 on already decoded claims.
#[must_use]
pub fn validate_claims_at(
    claims: JwtClaims,
    options: &ValidationOptions,
    now: i64,
) -> TokenValidation {
    match check(&claims, options, now) {
        Ok(()) => TokenValidation::valid(claims),
        Err((code, message)) => {
            debug!(error_code = %code, sub = %claims.sub, "token rejected");
            TokenValidation::invalid(code, message)
        }
    }
}

fn check(
    claims: &JwtClaims,
    options: &ValidationOptions,
    now: i64,
) -> Result<(), (ValidationErrorCode, String)> {
    let tolerance = i64::try_from(options.clock_tolerance.as_secs()).unwrap_or(i64::MAX);

    if let Some(exp) = claims.exp {
        if exp.saturating_add(tolerance) < now {
            return Err((ValidationErrorCode::Expired, "Token has expired".to_string()));
        }
    }

    if let Some(nbf) = claims.nbf {
        if nbf.saturating_sub(tolerance) > now {
            return Err((ValidationErrorCode::Expired, "Token is not yet valid".to_string()));
        }
    }

    if let Some(issuer) = &options.issuer {
        if claims.iss.as_deref() != Some(issuer.as_str()) {
            return Err((
                ValidationErrorCode::InvalidIssuer,
                format!(
                    "Expected issuer {issuer}, got {}",
                    claims.iss.as_deref().unwrap_or("none")
                ),
            ));
        }
    }

    if let Some(audience) = &options.audience {
        if !claims.aud.as_ref().is_some_and(|aud| aud.contains(audience)) {
            return Err((
                ValidationErrorCode::InvalidAudience,
                format!("Token audience does not include {audience}"),
            ));
        }
    }

    let missing: Vec<&str> = options
        .required_scopes
        .iter()
        .map(String::as_str)
        .filter(|scope| !claims.has_scope(scope))
        .collect();
    if !missing.is_empty() {
        return Err((
            ValidationErrorCode::InsufficientScope,
            format!("Missing required scopes: {}", missing.join(" ")),
        ));
    }

    if let Some(required) = options.required_assurance_level {
        let current = claims.assurance_level();
        if !current.satisfies(required) {
            return Err((
                ValidationErrorCode::InsufficientAssurance,
                format!("Assurance level {current} is below required {required}"),
            ));
        }
    }

    Ok(())
}
