// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for live conformance suites.
// Purpose: Provide artifact reporting, timeouts, and family scenario runs.
// Dependencies: system-tests, rbac-conformance-engine
// ============================================================================

//! ## Overview
//! Shared helpers for the live conformance suites. Every scenario writes a
//! `summary.json` and `summary.md` under its run root, even when it panics.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod scenarios;
pub mod timeouts;
