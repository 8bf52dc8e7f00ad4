//! Unverified JWT decoding
//!
//! Splits a compact JWS and deserializes its payload. No signature is
//! checked here; see [`super::signature`] for that.

use authkit_domain::{AuthError, JwtClaims};
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// base64url that accepts segments with or without `=` padding.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenDecodeError {
    #[error("expected 3 dot-separated segments, found {0}")]
    SegmentCount(usize),

    #[error("segment is not valid base64url: {0}")]
    Base64(String),

    #[error("payload is not valid claims JSON: {0}")]
    Json(String),
}

impl From<TokenDecodeError> for AuthError {
    fn from(value: TokenDecodeError) -> Self {
        Self::InvalidToken(value.to_string())
    }
}

fn segments(token: &str) -> Result<[&str; 3], TokenDecodeError> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    match parts.as_slice() {
        [header, payload, signature] if !header.is_empty() && !payload.is_empty() => {
            Ok([*header, *payload, *signature])
        }
        [_, _, _] => Err(TokenDecodeError::Base64("empty segment".to_string())),
        _ => Err(TokenDecodeError::SegmentCount(parts.len())),
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenDecodeError> {
    let bytes =
        SEGMENT_ENGINE.decode(segment).map_err(|e| TokenDecodeError::Base64(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenDecodeError::Json(e.to_string()))
}

/// Decode the payload of `token` into [`JwtClaims`].
///
/// # Errors
/// Returns [`TokenDecodeError`] if the token is not three segments, the
/// payload is not base64url, or it does not deserialize as claims.
pub fn decode_claims(token: &str) -> Result<JwtClaims, TokenDecodeError> {
    let [_, payload, _] = segments(token)?;
    decode_segment(payload)
}

/// Decode the payload of `token` into an arbitrary type.
///
/// # Errors
/// Same as [`decode_claims`].
pub fn decode_payload<T: DeserializeOwned>(token: &str) -> Result<T, TokenDecodeError> {
    let [_, payload, _] = segments(token)?;
    decode_segment(payload)
}

/// `exp` of a token in seconds since the epoch, if it decodes and has one.
#[must_use]
pub fn expiry_of(token: &str) -> Option<i64> {
    decode_claims(token).ok().and_then(|claims| claims.exp)
}
