// crates/rbac-conformance-core/src/lib.rs
// ============================================================================
// Module: RBAC Conformance Core Library
// Description: Public API surface for the conformance model and oracle.
// Purpose: Expose personas, resources, operations, and the expectation oracle.
// Dependencies: crate::{model, oracle}
// ============================================================================

//! ## Overview
//! RBAC conformance core describes authorization trials against an image
//! registry and predicts their outcome. It performs no I/O: clients, fixture
//! provisioning, and trial execution live in sibling crates and consume the
//! [`Oracle`] through plain values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod model;
pub mod oracle;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use model::*;

pub use oracle::ActorView;
pub use oracle::ListedItem;
pub use oracle::Oracle;
pub use oracle::OverrideOutcome;
pub use oracle::OverrideRule;
pub use oracle::Subject;
pub use oracle::TrialFacts;
pub use oracle::TrialQuery;
pub use oracle::Verdict;
pub use oracle::legacy_overrides;
