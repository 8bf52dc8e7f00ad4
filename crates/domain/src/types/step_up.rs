//! Step-up authentication types

use serde::{Deserialize, Serialize};

use super::assurance::AssuranceLevel;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepUpOptions {
    /// Human-readable reason shown by the authorization server.
    pub reason: Option<String>,
    pub redirect_uri: Option<String>,
}

/// Outcome of `require_step_up`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepUpDecision {
    /// The token already meets the target; carry on with it.
    Satisfied {
        current_level: AssuranceLevel,
        target_level: AssuranceLevel,
        access_token: String,
    },
    /// The user must re-authenticate at `step_up_url`.
    Required {
        current_level: AssuranceLevel,
        target_level: AssuranceLevel,
        step_up_url: String,
    },
}

impl StepUpDecision {
    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self, Self::Required { .. })
    }

    #[must_use]
    pub const fn current_level(&self) -> AssuranceLevel {
        match self {
            Self::Satisfied { current_level, .. } | Self::Required { current_level, .. } => {
                *current_level
            }
        }
    }

    #[must_use]
    pub const fn target_level(&self) -> AssuranceLevel {
        match self {
            Self::Satisfied { target_level, .. } | Self::Required { target_level, .. } => {
                *target_level
            }
        }
    }

    #[must_use]
    pub fn step_up_url(&self) -> Option<&str> {
        match self {
            Self::Required { step_up_url, .. } => Some(step_up_url),
            Self::Satisfied { .. } => None,
        }
    }
}
