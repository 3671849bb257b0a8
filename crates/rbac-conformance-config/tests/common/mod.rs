// crates/rbac-conformance-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for rbac-conformance-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use rbac_conformance_config::ConformanceConfig;
use rbac_conformance_config::ConfigError;

/// Smallest TOML document that passes validation.
pub const MINIMAL_TOML: &str = r#"
[identity]
endpoint = "http://keystone.test:5000/v3"
username = "admin"
password = "secret"
project_name = "admin"

[image]
endpoint = "http://glance.test:9292"
"#;

/// Parses a TOML string into a `ConformanceConfig` without validating it.
pub fn config_from_toml(toml_str: &str) -> Result<ConformanceConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns the minimal config with all defaults applied.
pub fn minimal_config() -> Result<ConformanceConfig, toml::de::Error> {
    config_from_toml(MINIMAL_TOML)
}

/// Returns the minimal config with extra TOML appended, parsed and validated.
pub fn minimal_with(extra: &str) -> Result<ConformanceConfig, ConfigError> {
    ConformanceConfig::from_toml_str(&format!("{MINIMAL_TOML}\n{extra}"))
}
