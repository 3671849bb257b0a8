// system-tests/tests/helpers/scenarios.rs
// ============================================================================
// Module: Family Scenarios
// Description: Runs one family matrix against the configured deployment.
// Purpose: Share harness setup, timeout and reporting across suites.
// Dependencies: rbac-conformance-config, rbac-conformance-engine, tokio
// ============================================================================

use std::error::Error;

use rbac_conformance_config::ConformanceConfig;
use rbac_conformance_core::Persona;
use rbac_conformance_core::ResourceFamily;
use rbac_conformance_engine::CleanupReport;
use rbac_conformance_engine::Harness;
use rbac_conformance_engine::MatrixReport;
use rbac_conformance_engine::ScenarioOutcome;
use rbac_conformance_engine::family_matrix;
use rbac_conformance_engine::scenario_name;
use rbac_conformance_engine::scenario_personas;
use serde::Serialize;
use system_tests::config::SystemTestConfig;

use super::artifacts::ScenarioReporter;
use super::artifacts::Tally;
use super::artifacts::Verdict;
use super::timeouts::DEFAULT_SCENARIO_TIMEOUT;
use super::timeouts::resolve_timeout;

/// Matrix outcome written next to the summary.
#[derive(Debug, Serialize)]
struct MatrixArtifact {
    scenario: String,
    trials: usize,
    passed: usize,
    failures: Vec<String>,
    cleanup_removed: usize,
    cleanup_already_gone: usize,
    cleanup_failures: Vec<String>,
}

impl MatrixArtifact {
    fn new(matrix: &MatrixReport, cleanup: &CleanupReport) -> Self {
        Self {
            scenario: matrix.scenario.clone(),
            trials: matrix.trials,
            passed: matrix.passed,
            failures: matrix.failures.iter().map(ToString::to_string).collect(),
            cleanup_removed: cleanup.removed,
            cleanup_already_gone: cleanup.already_gone,
            cleanup_failures: cleanup
                .failures
                .iter()
                .map(|failure| format!("{}: {}", failure.action, failure.message))
                .collect(),
        }
    }

    fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.cleanup_failures.is_empty()
    }
}

/// Runs the `family` matrix as `persona` and fails on any mismatch or
/// leftover resource.
///
/// A timed-out scenario abandons its teardown; its resources carry the
/// configured name prefix so they can be swept by hand.
pub async fn run_family(family: ResourceFamily, persona: Persona) -> Result<(), Box<dyn Error>> {
    let name = scenario_name(family, persona);
    let mut reporter = ScenarioReporter::open(&name, family, persona)?;
    let settings = SystemTestConfig::load()?;
    let config = ConformanceConfig::load(settings.config_path.as_deref())?;
    let harness = Harness::from_config(&config)?;
    let personas = scenario_personas(family, persona);
    let timeout = resolve_timeout(DEFAULT_SCENARIO_TIMEOUT)?;

    let run = harness.run(&name, &personas, family.is_metadef(), move |ctx| async move {
        family_matrix(&ctx, family, persona).await
    });
    let outcome = tokio::time::timeout(timeout, run)
        .await
        .map_err(|_| format!("{name} timed out after {}s", timeout.as_secs()))??;

    let (matrix, cleanup) = match outcome {
        ScenarioOutcome::Skipped => {
            reporter.note("scoped policy enforcement is disabled for the image service");
            reporter.close(Verdict::Skipped)?;
            return Ok(());
        }
        ScenarioOutcome::Completed { matrix, cleanup } => (matrix, cleanup),
    };
    let artifact = MatrixArtifact::new(&matrix, &cleanup);
    reporter.attach_json("matrix.json", &artifact)?;
    reporter.tally(Tally {
        trials: artifact.trials,
        passed: artifact.passed,
        removed: artifact.cleanup_removed,
        already_gone: artifact.cleanup_already_gone,
    });
    for failure in &artifact.failures {
        reporter.note(failure.clone());
    }
    for failure in &artifact.cleanup_failures {
        reporter.note(format!("cleanup: {failure}"));
    }
    let clean = artifact.is_clean();
    reporter.close(if clean { Verdict::Pass } else { Verdict::Fail })?;
    if !clean {
        return Err(format!(
            "{name}: {} trial mismatches, {} cleanup failures",
            artifact.failures.len(),
            artifact.cleanup_failures.len()
        )
        .into());
    }
    Ok(())
}
