// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Scenario Artifacts
// Description: Per-scenario artifact directory and verdict summary.
// Purpose: Leave a reviewable record of every live family matrix run.
// Dependencies: rbac-conformance-core, system-tests, serde, serde_jcs
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rbac_conformance_core::Persona;
use rbac_conformance_core::ResourceFamily;
use serde::Serialize;
use system_tests::config::SystemTestConfig;

/// Summary file names every scenario directory ends up holding.
const SUMMARY_JSON: &str = "summary.json";
const SUMMARY_MD: &str = "summary.md";

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// How a scenario ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every trial matched and cleanup left nothing behind.
    Pass,
    /// At least one mismatch or leftover resource.
    Fail,
    /// Enforcement is disabled for the deployment.
    Skipped,
    /// The scenario body panicked.
    Panicked,
    /// The reporter was dropped without a verdict, e.g. after a timeout.
    Abandoned,
}

impl Verdict {
    const fn label(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skipped => "skipped",
            Self::Panicked => "panicked",
            Self::Abandoned => "abandoned",
        }
    }
}

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Trial and cleanup counts of a completed matrix.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Tally {
    /// Trials run.
    pub trials: usize,
    /// Trials whose outcome matched the oracle.
    pub passed: usize,
    /// Resources deleted at teardown.
    pub removed: usize,
    /// Teardown entries that were already gone.
    pub already_gone: usize,
}

#[derive(Debug, Serialize)]
struct ScenarioSummary<'a> {
    scenario: &'a str,
    family: ResourceFamily,
    persona: Persona,
    verdict: Verdict,
    started_unix_ms: u128,
    elapsed_ms: u128,
    tally: Option<Tally>,
    notes: &'a [String],
    files: Vec<&'a str>,
}

fn unix_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

fn scenario_dir(config: &SystemTestConfig, scenario: &str) -> PathBuf {
    config
        .run_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("target/system-tests").join(format!("run_{}", unix_millis())))
        .join(scenario)
}

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Collects notes and attachments for one scenario and writes its summary
/// exactly once, from [`ScenarioReporter::close`] or on drop.
pub struct ScenarioReporter {
    dir: PathBuf,
    scenario: String,
    family: ResourceFamily,
    persona: Persona,
    started: Instant,
    started_unix_ms: u128,
    tally: Option<Tally>,
    notes: Vec<String>,
    files: BTreeSet<String>,
    closed: bool,
}

impl ScenarioReporter {
    /// Prepares the directory for `scenario`; a directory left over from an
    /// earlier run is refused unless overwriting is configured.
    pub fn open(scenario: &str, family: ResourceFamily, persona: Persona) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        let dir = scenario_dir(&config, scenario);
        let occupied = fs::read_dir(&dir).is_ok_and(|mut entries| entries.next().is_some());
        if occupied && !config.allow_overwrite {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already holds artifacts", dir.display()),
            ));
        }
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            scenario: scenario.to_string(),
            family,
            persona,
            started: Instant::now(),
            started_unix_ms: unix_millis(),
            tally: None,
            notes: Vec::new(),
            files: BTreeSet::new(),
            closed: false,
        })
    }

    /// Adds a line to the summary notes.
    pub fn note(&mut self, line: impl Into<String>) {
        self.notes.push(line.into());
    }

    /// Records the matrix counts shown in the summary header.
    pub fn tally(&mut self, tally: Tally) {
        self.tally = Some(tally);
    }

    /// Writes `value` as canonical JSON next to the summary.
    pub fn attach_json<T: Serialize>(&mut self, name: &str, value: &T) -> io::Result<()> {
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(self.dir.join(name), bytes)?;
        self.files.insert(name.to_string());
        Ok(())
    }

    /// Writes both summaries with `verdict`.
    pub fn close(&mut self, verdict: Verdict) -> io::Result<()> {
        self.closed = true;
        let mut files: Vec<&str> = self.files.iter().map(String::as_str).collect();
        files.extend([SUMMARY_JSON, SUMMARY_MD]);
        let summary = ScenarioSummary {
            scenario: &self.scenario,
            family: self.family,
            persona: self.persona,
            verdict,
            started_unix_ms: self.started_unix_ms,
            elapsed_ms: self.started.elapsed().as_millis(),
            tally: self.tally,
            notes: &self.notes,
            files,
        };
        let json = serde_jcs::to_vec(&summary).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(self.dir.join(SUMMARY_JSON), json)?;
        fs::write(self.dir.join(SUMMARY_MD), render_markdown(&summary))?;
        Ok(())
    }
}

impl Drop for ScenarioReporter {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let verdict = if std::thread::panicking() { Verdict::Panicked } else { Verdict::Abandoned };
        self.note("no verdict was recorded before the reporter was dropped");
        let _ = self.close(verdict);
    }
}

// ============================================================================
// SECTION: Markdown
// ============================================================================

fn render_markdown(summary: &ScenarioSummary<'_>) -> String {
    let mut rows = vec![
        ("Family", summary.family.to_string()),
        ("Persona", summary.persona.to_string()),
        ("Verdict", summary.verdict.label().to_string()),
        ("Elapsed", format!("{} ms", summary.elapsed_ms)),
    ];
    if let Some(tally) = summary.tally {
        rows.push(("Trials matched", format!("{} / {}", tally.passed, tally.trials)));
        rows.push(("Removed at teardown", tally.removed.to_string()));
        rows.push(("Already gone", tally.already_gone.to_string()));
    }
    let mut out = format!("# {}\n\n| | |\n|---|---|\n", summary.scenario);
    for (field, value) in rows {
        out.push_str(&format!("| {field} | {value} |\n"));
    }
    if !summary.notes.is_empty() {
        out.push_str("\n## Notes\n\n");
        for note in summary.notes {
            out.push_str(&format!("- {note}\n"));
        }
    }
    out.push_str("\n## Files\n\n");
    out.push_str(&summary.files.iter().map(|file| format!("`{file}`")).collect::<Vec<_>>().join(", "));
    out.push('\n');
    out
}
