// crates/rbac-conformance-config/src/lib.rs
// ============================================================================
// Module: RBAC Conformance Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for rbac-conformance.toml semantics.
// Dependencies: rbac-conformance-core, serde, toml, url
// ============================================================================

//! ## Overview
//! `rbac-conformance-config` defines the configuration model for conformance
//! runs: service endpoints, bootstrap credentials, persona placement, oracle
//! overrides, the metadef lock directory, and trial auditing. Validation is
//! strict and fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
