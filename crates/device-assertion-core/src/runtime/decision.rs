// crates/device-assertion-core/src/runtime/decision.rs
// ============================================================================
// Module: Registration Decision
// Description: Enablement policy applied to lookup outcomes.
// Purpose: Map a registry answer onto the assertion status, independent of signing.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The decision is a pure function of the lookup outcome:
//! absent records are `NotFound`, records with `enabled = false` are
//! `Forbidden`, and everything else is eligible for a token. A record whose
//! `enabled` flag is not a boolean is rejected rather than guessed at.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AssertionStatus;
use crate::core::LookupOutcome;
use crate::core::RecordError;
use crate::core::RegistrationRecord;

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Outcome of the enablement policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationDecision {
    /// No registration exists.
    Absent,
    /// Registration exists but is disabled.
    Disabled,
    /// Registration exists and is enabled; the record will carry the token.
    Enabled(RegistrationRecord),
}

impl RegistrationDecision {
    /// Returns the assertion status this decision produces.
    #[must_use]
    pub const fn status(&self) -> AssertionStatus {
        match self {
            Self::Absent => AssertionStatus::NotFound,
            Self::Disabled => AssertionStatus::Forbidden,
            Self::Enabled(_) => AssertionStatus::Success,
        }
    }
}

/// Applies the enablement policy to a lookup outcome.
///
/// # Errors
///
/// Returns [`RecordError::InvalidEnabled`] when the record's `enabled` field
/// is present but not a boolean.
pub fn decide_registration(outcome: LookupOutcome) -> Result<RegistrationDecision, RecordError> {
    match outcome {
        LookupOutcome::NotFound => Ok(RegistrationDecision::Absent),
        LookupOutcome::Found(record) => {
            if record.enablement()? {
                Ok(RegistrationDecision::Enabled(record))
            } else {
                Ok(RegistrationDecision::Disabled)
            }
        }
    }
}
