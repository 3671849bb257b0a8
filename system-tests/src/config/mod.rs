// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Environment-backed run settings for live suites.
// Purpose: Provide typed access to run root, config path and timeout.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Run settings are read from environment variables and mapped into a small
//! typed structure. Endpoints and credentials live in the conformance config
//! file, which these settings only point at.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
pub use env::read_env_strict;
