// crates/rbac-conformance-core/src/model/outcome.rs
// ============================================================================
// Module: Outcomes
// Description: Expected and observed trial outcomes.
// Purpose: Collapse every trial to success(code), Forbidden, or NotFound.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The oracle vocabulary has exactly three outcome classes. Anything the
//! service returns outside these classes is an observation the oracle can
//! never predict, so it only exists on the observed side
//! ([`ObservedOutcome`]).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::model::operation::Operation;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Expected outcome class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "class", content = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Success with the given status code.
    Success(u16),
    /// Authorization denied (403).
    Forbidden,
    /// Resource not found or not discoverable (404).
    NotFound,
}

impl Outcome {
    /// Returns true for a success outcome.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(status) => write!(f, "success({status})"),
            Self::Forbidden => f.write_str("forbidden"),
            Self::NotFound => f.write_str("not_found"),
        }
    }
}

/// Outcome actually returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum ObservedOutcome {
    /// 2xx response.
    Success {
        /// Response status code.
        status: u16,
    },
    /// 403 response.
    Forbidden,
    /// 404 response.
    NotFound,
    /// Any other status code.
    UnexpectedStatus {
        /// Response status code.
        status: u16,
    },
    /// The request never produced a response.
    Transport {
        /// Failure description.
        message: String,
    },
}

impl ObservedOutcome {
    /// Returns true when the observation satisfies the expectation.
    #[must_use]
    pub const fn satisfies(&self, expected: Outcome) -> bool {
        match (self, expected) {
            (Self::Success { status }, Outcome::Success(code)) => *status == code,
            (Self::Forbidden, Outcome::Forbidden) | (Self::NotFound, Outcome::NotFound) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ObservedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { status } => write!(f, "success({status})"),
            Self::Forbidden => f.write_str("forbidden"),
            Self::NotFound => f.write_str("not_found"),
            Self::UnexpectedStatus { status } => write!(f, "unexpected_status({status})"),
            Self::Transport { message } => write!(f, "transport_error({message})"),
        }
    }
}

// ============================================================================
// SECTION: Expectations
// ============================================================================

/// Which items a successful list call must return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingScope {
    /// Every fixture item is listed.
    Everything,
    /// Only items the actor can discover for listing are returned.
    Filtered,
}

/// Oracle verdict for one trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expectation {
    /// Operation the verdict applies to.
    pub operation: Operation,
    /// Expected outcome class.
    pub outcome: Outcome,
    /// Name of the table entry that produced the verdict.
    pub rule: String,
    /// Listing predicate scope, for successful list operations.
    pub listing: Option<ListingScope>,
}
