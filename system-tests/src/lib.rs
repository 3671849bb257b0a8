// system-tests/src/lib.rs
// ============================================================================
// Module: RBAC Conformance System Tests Library
// Description: Shared configuration for live-deployment suites.
// Purpose: Provide typed run settings to the system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts the run settings shared by the live suites in
//! `system-tests/tests`. The suites talk to a real identity backend and
//! image service described by the conformance configuration file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
