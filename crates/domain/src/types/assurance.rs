//! Authentication assurance levels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AuthError;

/// Ordinal strength of an authentication event.
///
/// Variants are declared in ascending order so the derived `Ord` compares by
/// position: `Aal1 < Aal2 < Aal3`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AssuranceLevel {
    #[default]
    Aal1,
    Aal2,
    Aal3,
}

impl AssuranceLevel {
    pub const ALL: [Self; 3] = [Self::Aal1, Self::Aal2, Self::Aal3];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aal1 => "aal1",
            Self::Aal2 => "aal2",
            Self::Aal3 => "aal3",
        }
    }

    /// Map an `acr` claim value to a known level, if it is one.
    #[must_use]
    pub fn from_acr(acr: &str) -> Option<Self> {
        let acr = acr.trim();
        Self::ALL.into_iter().find(|level| level.as_str().eq_ignore_ascii_case(acr))
    }

    /// Level carried by an optional `acr` claim; absent or unrecognized values
    /// degrade to [`AssuranceLevel::Aal1`].
    #[must_use]
    pub fn from_acr_or_default(acr: Option<&str>) -> Self {
        acr.and_then(Self::from_acr).unwrap_or_default()
    }

    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }
}

impl fmt::Display for AssuranceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssuranceLevel {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_acr(s)
            .ok_or_else(|| AuthError::InvalidRequest(format!("unknown assurance level: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_positional() {
        assert!(AssuranceLevel::Aal1 < AssuranceLevel::Aal2);
        assert!(AssuranceLevel::Aal2 < AssuranceLevel::Aal3);
        assert!(AssuranceLevel::Aal3.satisfies(AssuranceLevel::Aal2));
        assert!(AssuranceLevel::Aal2.satisfies(AssuranceLevel::Aal2));
        assert!(!AssuranceLevel::Aal1.satisfies(AssuranceLevel::Aal2));
    }

    #[test]
    fn acr_mapping() {
        assert_eq!(AssuranceLevel::from_acr("aal3"), Some(AssuranceLevel::Aal3));
        assert_eq!(AssuranceLevel::from_acr(" AAL2 "), Some(AssuranceLevel::Aal2));
        assert_eq!(AssuranceLevel::from_acr("urn:mace:incommon:iap:silver"), None);
        assert_eq!(AssuranceLevel::from_acr_or_default(None), AssuranceLevel::Aal1);
        assert_eq!(AssuranceLevel::from_acr_or_default(Some("bogus")), AssuranceLevel::Aal1);
    }

    #[test]
    fn parse_and_serde() {
        assert_eq!("aal2".parse::<AssuranceLevel>().unwrap(), AssuranceLevel::Aal2);
        assert!("aal9".parse::<AssuranceLevel>().is_err());
        assert_eq!(serde_json::to_string(&AssuranceLevel::Aal3).unwrap(), "\"aal3\"");
    }
}
