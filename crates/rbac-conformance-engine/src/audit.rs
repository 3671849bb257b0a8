// crates/rbac-conformance-engine/src/audit.rs
// ============================================================================
// Module: Trial Audit Logging
// Description: Structured audit events for trials and scenarios.
// Purpose: Emit JSON-lines records without a logging framework dependency.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every trial emits a [`TrialAuditEvent`]; scenario start, skip, and finish
//! emit a [`ScenarioAuditEvent`]. Sinks write one JSON object per line to
//! stderr or an append-only file, or drop events entirely. Credentials are
//! never part of an event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rbac_conformance_core::Operation;
use rbac_conformance_core::RoleKind;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Trial verdict label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialVerdict {
    /// Observed outcome matched the expectation.
    Pass,
    /// Observed outcome did not match.
    Fail,
}

/// One trial record.
#[derive(Debug, Clone, Serialize)]
pub struct TrialAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Persona name or ad hoc label.
    pub persona: String,
    /// Actor role.
    pub role: RoleKind,
    /// Operation under trial.
    pub operation: Operation,
    /// Resource identifier label.
    pub resource: String,
    /// Expected outcome.
    pub expected: String,
    /// Observed outcome.
    pub actual: String,
    /// Verdict.
    pub verdict: TrialVerdict,
    /// Decision table entry behind the expectation.
    pub rule: String,
}

/// Fields of a trial record.
pub struct TrialAuditEventParams {
    /// Persona name or ad hoc label.
    pub persona: String,
    /// Actor role.
    pub role: RoleKind,
    /// Operation under trial.
    pub operation: Operation,
    /// Resource identifier label.
    pub resource: String,
    /// Expected outcome.
    pub expected: String,
    /// Observed outcome.
    pub actual: String,
    /// Verdict.
    pub verdict: TrialVerdict,
    /// Decision table entry behind the expectation.
    pub rule: String,
}

impl TrialAuditEvent {
    /// Creates a trial event with a consistent timestamp.
    #[must_use]
    pub fn new(params: TrialAuditEventParams) -> Self {
        Self {
            event: "rbac_trial",
            timestamp_ms: now_ms(),
            persona: params.persona,
            role: params.role,
            operation: params.operation,
            resource: params.resource,
            expected: params.expected,
            actual: params.actual,
            verdict: params.verdict,
            rule: params.rule,
        }
    }
}

/// Scenario lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPhase {
    /// Provisioning is about to start.
    Started,
    /// Scoped enforcement is off; nothing ran.
    Skipped,
    /// Body and cleanup finished.
    Finished,
}

/// One scenario lifecycle record.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Scenario name.
    pub scenario: String,
    /// Lifecycle phase.
    pub phase: ScenarioPhase,
    /// Trials run (finished only).
    pub trials: usize,
    /// Trial failures (finished only).
    pub failures: usize,
    /// Cleanup failures (finished only).
    pub cleanup_failures: usize,
}

impl ScenarioAuditEvent {
    /// Creates a lifecycle event with no counts.
    #[must_use]
    pub fn new(scenario: &str, phase: ScenarioPhase) -> Self {
        Self {
            event: "rbac_scenario",
            timestamp_ms: now_ms(),
            scenario: scenario.to_string(),
            phase,
            trials: 0,
            failures: 0,
            cleanup_failures: 0,
        }
    }
}

/// Milliseconds since the epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for trial and scenario events.
pub trait TrialAuditSink: Send + Sync {
    /// Record a trial event.
    fn record(&self, event: &TrialAuditEvent);

    /// Record a scenario lifecycle event.
    fn record_scenario(&self, _event: &ScenarioAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl TrialAuditSink for StderrAuditSink {
    fn record(&self, event: &TrialAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_scenario(&self, event: &ScenarioAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Writes one serialized line.
    fn write_line(&self, payload: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl TrialAuditSink for FileAuditSink {
    fn record(&self, event: &TrialAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.write_line(&payload);
        }
    }

    fn record_scenario(&self, event: &ScenarioAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.write_line(&payload);
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl TrialAuditSink for NoopAuditSink {
    fn record(&self, _event: &TrialAuditEvent) {}
}
