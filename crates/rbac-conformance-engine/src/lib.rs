// crates/rbac-conformance-engine/src/lib.rs
// ============================================================================
// Module: RBAC Conformance Engine Library
// Description: Public API surface for provisioning, fixtures, and trials.
// Purpose: Run persona x operation x fixture matrices against live services.
// Dependencies: rbac-conformance-{clients, config, core}, fd-lock, tokio
// ============================================================================

//! ## Overview
//! The engine turns the oracle's predictions into executed trials. A
//! [`Harness`] provisions personas through an [`IdentityBackend`], the
//! matrices build fixtures and run every trial through the [`TrialRunner`],
//! and the [`CleanupStack`] removes whatever was acquired once the scenario
//! ends, successfully or not.
//!
//! [`IdentityBackend`]: rbac_conformance_clients::IdentityBackend

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod cleanup;
pub mod fixtures;
pub mod harness;
pub mod lock;
pub mod matrix;
pub mod naming;
pub mod registry;
pub mod runner;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::ScenarioAuditEvent;
pub use audit::ScenarioPhase;
pub use audit::StderrAuditSink;
pub use audit::TrialAuditEvent;
pub use audit::TrialAuditSink;
pub use audit::TrialVerdict;
pub use cleanup::CleanupAction;
pub use cleanup::CleanupError;
pub use cleanup::CleanupReport;
pub use cleanup::CleanupStack;
pub use fixtures::ChildFixture;
pub use fixtures::FixtureBuilder;
pub use fixtures::FixtureError;
pub use fixtures::ImageFixture;
pub use fixtures::NamespaceFixture;
pub use harness::Harness;
pub use harness::HarnessParams;
pub use harness::ScenarioContext;
pub use harness::ScenarioError;
pub use harness::ScenarioOutcome;
pub use lock::LOCK_POLL_INTERVAL;
pub use lock::LockError;
pub use lock::METADEF_LOCK_NAME;
pub use lock::ScenarioLock;
pub use matrix::MatrixReport;
pub use matrix::family_matrix;
pub use matrix::scenario_name;
pub use matrix::scenario_personas;
pub use registry::Actor;
pub use registry::PersonaRegistry;
pub use registry::RegistryError;
pub use registry::RegistrySettings;
pub use registry::RoleNames;
pub use runner::ListingCandidate;
pub use runner::Mismatch;
pub use runner::TrialFailure;
pub use runner::TrialResult;
pub use runner::TrialRunner;
