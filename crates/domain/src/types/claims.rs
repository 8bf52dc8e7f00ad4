//! Decoded JWT claims
//!
//! Claims are decoded per call and never cached. Nothing here has been
//! signature-checked unless it came out of `verify_token`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::assurance::AssuranceLevel;

/// The `aud` claim, which issuers emit either as a string or as an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    /// Whether `audience` is one of the listed values.
    #[must_use]
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Self::One(aud) => aud == audience,
            Self::Many(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Token payload as issued by the authorization server.
///
/// Only `sub` is strict. A registered claim of an unexpected JSON type
/// decodes as absent instead of failing the whole payload, and NumericDate
/// claims accept fractional seconds (floored).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings", skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings", skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Space-delimited scope list.
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient::numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub nbf: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient::numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::audience",
        skip_serializing_if = "Option::is_none"
    )]
    pub aud: Option<Audience>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub acr: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings", skip_serializing_if = "Vec::is_empty")]
    pub amr: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Any claim not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JwtClaims {
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.as_deref().unwrap_or_default().split_whitespace()
    }

    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes().any(|granted| granted == scope)
    }

    #[must_use]
    pub fn assurance_level(&self) -> AssuranceLevel {
        AssuranceLevel::from_acr_or_default(self.acr.as_deref())
    }
}

/// Claim decoders that never reject a payload over one claim's type.
mod lenient {
    use super::{Audience, Deserialize, Deserializer, Value};

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(value) => Some(value),
            _ => None,
        })
    }

    /// Array elements that are strings; a bare string is a one-element list.
    pub fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(value) => Some(value),
                    _ => None,
                })
                .collect(),
            Value::String(value) => vec![value],
            _ => Vec::new(),
        })
    }

    /// RFC 7519 NumericDate: any JSON number, floored to whole seconds.
    #[allow(clippy::cast_possible_truncation)]
    pub fn numeric_date<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(number) => number.as_i64().or_else(|| {
                number.as_f64().filter(|secs| secs.is_finite()).map(|secs| secs.floor() as i64)
            }),
            _ => None,
        })
    }

    pub fn audience<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Audience>, D::Error> {
        Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
    }
}
