// system-tests/tests/helpers/timeouts.rs
// ============================================================================
// Module: System Test Timeouts
// Description: Scenario timeout with an environment override.
// Purpose: Keep live scenario timeouts consistent across suites.
// Dependencies: system-tests
// ============================================================================

use std::time::Duration;

use system_tests::config::SystemTestConfig;

/// Timeout for one family scenario when nothing overrides it.
pub const DEFAULT_SCENARIO_TIMEOUT: Duration = Duration::from_secs(1_800);

/// Returns the effective timeout; the configured override acts as a minimum.
pub fn resolve_timeout(requested: Duration) -> Result<Duration, String> {
    let config = SystemTestConfig::load()?;
    Ok(config.timeout.map_or(requested, |floor| requested.max(floor)))
}
