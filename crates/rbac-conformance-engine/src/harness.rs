// crates/rbac-conformance-engine/src/harness.rs
// ============================================================================
// Module: Scenario Harness
// Description: Scenario lifecycle: skip gate, lock, provisioning, cleanup.
// Purpose: Run scenario bodies with guaranteed teardown.
// Dependencies: rbac-conformance-clients, rbac-conformance-config, tokio
// ============================================================================

//! ## Overview
//! [`Harness::run`] drives one scenario:
//! 1. self-skip when scoped enforcement is off;
//! 2. wait for the metadef lock in metadef scenarios, polling without
//!    blocking the runtime;
//! 3. provision the declared personas;
//! 4. run the body on its own task;
//! 5. always drain the cleanup stack, then resume a body panic if any.
//!
//! The lock guard outlives cleanup, so metadef names are released only
//! after the namespaces are gone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use rbac_conformance_clients::GlanceImageApi;
use rbac_conformance_clients::HttpSettings;
use rbac_conformance_clients::IdentityBackend;
use rbac_conformance_clients::ImageApi;
use rbac_conformance_clients::KeystoneIdentity;
use rbac_conformance_clients::TokenScope;
use rbac_conformance_config::ConformanceConfig;
use rbac_conformance_core::Oracle;
use rbac_conformance_core::Persona;
use rbac_conformance_core::ProjectId;
use rbac_conformance_core::ProjectSlot;
use thiserror::Error;

use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::ScenarioAuditEvent;
use crate::audit::ScenarioPhase;
use crate::audit::StderrAuditSink;
use crate::audit::TrialAuditSink;
use crate::cleanup::CleanupReport;
use crate::cleanup::CleanupStack;
use crate::fixtures::FixtureBuilder;
use crate::fixtures::FixtureError;
use crate::lock::LOCK_POLL_INTERVAL;
use crate::lock::LockError;
use crate::lock::METADEF_LOCK_NAME;
use crate::lock::ScenarioLock;
use crate::matrix::MatrixReport;
use crate::registry::Actor;
use crate::registry::PersonaRegistry;
use crate::registry::RegistryError;
use crate::registry::RegistrySettings;
use crate::runner::TrialRunner;

// ============================================================================
// SECTION: Context
// ============================================================================

/// Everything a scenario body works with.
pub struct ScenarioContext {
    /// Identity backend.
    identity: Arc<dyn IdentityBackend>,
    /// Image service.
    api: Arc<dyn ImageApi>,
    /// Expectation oracle.
    oracle: Arc<Oracle>,
    /// Audit sink.
    audit: Arc<dyn TrialAuditSink>,
    /// Teardown registry.
    cleanup: Arc<CleanupStack>,
    /// Provisioned personas.
    registry: PersonaRegistry,
}

impl ScenarioContext {
    /// Trial runner bound to this scenario.
    #[must_use]
    pub fn runner(&self) -> TrialRunner<'_> {
        TrialRunner::new(self.api.as_ref(), self.oracle.as_ref(), self.audit.as_ref())
    }

    /// Fixture builder bound to this scenario.
    #[must_use]
    pub fn fixtures(&self) -> FixtureBuilder<'_> {
        FixtureBuilder::new(self.api.as_ref(), self.cleanup.as_ref())
    }

    /// Expectation oracle.
    #[must_use]
    pub fn oracle(&self) -> &Oracle {
        self.oracle.as_ref()
    }

    /// Provisioned personas.
    #[must_use]
    pub const fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    /// Teardown registry.
    #[must_use]
    pub fn cleanup(&self) -> &CleanupStack {
        self.cleanup.as_ref()
    }

    /// Actor for a declared persona.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Registry`] for undeclared personas.
    pub fn actor(&self, persona: Persona) -> Result<&Actor, ScenarioError> {
        self.registry.actor(persona).map_err(ScenarioError::from)
    }

    /// Project provisioned for a slot.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Registry`] when no declared persona used it.
    pub fn project(&self, slot: ProjectSlot) -> Result<&ProjectId, ScenarioError> {
        self.registry.project(slot).map_err(ScenarioError::from)
    }

    /// Mints a member actor on `project`, or on a fresh project.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Registry`] when an identity call fails.
    pub async fn mint_member(&self, project: Option<&ProjectId>) -> Result<Actor, ScenarioError> {
        self.registry
            .mint_member(self.identity.as_ref(), project, self.cleanup.as_ref())
            .await
            .map_err(ScenarioError::from)
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Parameters for building a harness from injected backends.
pub struct HarnessParams {
    /// Identity backend.
    pub identity: Arc<dyn IdentityBackend>,
    /// Image service.
    pub api: Arc<dyn ImageApi>,
    /// Expectation oracle.
    pub oracle: Oracle,
    /// Audit sink.
    pub audit: Arc<dyn TrialAuditSink>,
    /// Provisioning inputs.
    pub settings: RegistrySettings,
    /// Whether scoped enforcement is on; scenarios skip otherwise.
    pub enabled: bool,
    /// Directory holding the metadef lock file.
    pub lock_dir: PathBuf,
}

/// How a scenario ended.
#[derive(Debug)]
pub enum ScenarioOutcome {
    /// Scoped enforcement is off; nothing ran.
    Skipped,
    /// The body ran and teardown finished.
    Completed {
        /// Trial results.
        matrix: MatrixReport,
        /// Teardown summary.
        cleanup: CleanupReport,
    },
}

/// Scenario driver.
pub struct Harness {
    /// Identity backend.
    identity: Arc<dyn IdentityBackend>,
    /// Image service.
    api: Arc<dyn ImageApi>,
    /// Expectation oracle.
    oracle: Arc<Oracle>,
    /// Audit sink.
    audit: Arc<dyn TrialAuditSink>,
    /// Provisioning inputs.
    settings: RegistrySettings,
    /// Scoped enforcement flag.
    enabled: bool,
    /// Metadef lock directory.
    lock_dir: PathBuf,
}

impl Harness {
    /// Builds a harness from injected backends.
    #[must_use]
    pub fn new(params: HarnessParams) -> Self {
        Self {
            identity: params.identity,
            api: params.api,
            oracle: Arc::new(params.oracle),
            audit: params.audit,
            settings: params.settings,
            enabled: params.enabled,
            lock_dir: params.lock_dir,
        }
    }

    /// Builds a harness with HTTP backends described by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Setup`] when a client or the audit log
    /// cannot be created.
    pub fn from_config(config: &ConformanceConfig) -> Result<Self, ScenarioError> {
        let http =
            HttpSettings::from_millis(config.http.connect_timeout_ms, config.http.request_timeout_ms);
        let identity = KeystoneIdentity::new(&config.identity.endpoint, http)
            .map_err(|err| ScenarioError::Setup(err.to_string()))?;
        let api = GlanceImageApi::new(&config.image.endpoint, http)
            .map_err(|err| ScenarioError::Setup(err.to_string()))?;
        let audit: Arc<dyn TrialAuditSink> = match (config.audit.enabled, config.audit.path.as_deref()) {
            (false, _) => Arc::new(NoopAuditSink),
            (true, None) => Arc::new(StderrAuditSink),
            (true, Some(path)) => Arc::new(
                FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ScenarioError::Setup(format!("audit log {path}: {err}")))?,
            ),
        };
        Ok(Self::new(HarnessParams {
            identity: Arc::new(identity),
            api: Arc::new(api),
            oracle: config.oracle.build_oracle(),
            audit,
            settings: RegistrySettings::from_config(config),
            enabled: config.scenarios_enabled(),
            lock_dir: config.lock.resolved_dir(),
        }))
    }

    /// Runs one scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] when the lock, provisioning, or the body
    /// fails. Cleanup runs in every case past provisioning.
    ///
    /// # Panics
    ///
    /// Resumes a panic raised by the body, after cleanup.
    pub async fn run<F, Fut>(
        &self,
        name: &str,
        personas: &[Persona],
        metadef: bool,
        body: F,
    ) -> Result<ScenarioOutcome, ScenarioError>
    where
        F: FnOnce(Arc<ScenarioContext>) -> Fut,
        Fut: Future<Output = Result<MatrixReport, ScenarioError>> + Send + 'static,
    {
        if !self.enabled {
            self.audit.record_scenario(&ScenarioAuditEvent::new(name, ScenarioPhase::Skipped));
            return Ok(ScenarioOutcome::Skipped);
        }
        let mut lock = if metadef {
            Some(ScenarioLock::open(&self.lock_dir, METADEF_LOCK_NAME)?)
        } else {
            None
        };
        let _guard = match lock.as_mut() {
            Some(lock) => Some(loop {
                match lock.try_acquire() {
                    Ok(guard) => break guard,
                    Err(LockError::Busy(_)) => tokio::time::sleep(LOCK_POLL_INTERVAL).await,
                    Err(err) => return Err(err.into()),
                }
            }),
            None => None,
        };
        self.audit.record_scenario(&ScenarioAuditEvent::new(name, ScenarioPhase::Started));

        let cleanup = Arc::new(CleanupStack::new());
        let registry = match PersonaRegistry::provision(
            self.identity.as_ref(),
            &self.settings,
            personas,
            cleanup.as_ref(),
        )
        .await
        {
            Ok(registry) => registry,
            Err(err) => {
                let report = self.cleanup_after_failed_provisioning(cleanup.as_ref()).await;
                self.record_finished(name, 0, 0, &report);
                return Err(err.into());
            }
        };
        let context = Arc::new(ScenarioContext {
            identity: Arc::clone(&self.identity),
            api: Arc::clone(&self.api),
            oracle: Arc::clone(&self.oracle),
            audit: Arc::clone(&self.audit),
            cleanup: Arc::clone(&cleanup),
            registry,
        });

        let joined = tokio::spawn(body(Arc::clone(&context))).await;
        let report = cleanup
            .run(self.identity.as_ref(), self.api.as_ref(), Some(context.registry.bootstrap()))
            .await;
        let result = match joined {
            Ok(result) => result,
            Err(err) if err.is_panic() => {
                self.record_finished(name, 0, 0, &report);
                std::panic::resume_unwind(err.into_panic());
            }
            Err(err) => Err(ScenarioError::Join(err.to_string())),
        };
        match result {
            Ok(matrix) => {
                self.record_finished(name, matrix.trials, matrix.failures.len(), &report);
                Ok(ScenarioOutcome::Completed {
                    matrix,
                    cleanup: report,
                })
            }
            Err(err) => {
                self.record_finished(name, 0, 0, &report);
                Err(err)
            }
        }
    }

    /// Drains the stack with a fresh bootstrap credential when provisioning
    /// stopped partway.
    async fn cleanup_after_failed_provisioning(&self, cleanup: &CleanupStack) -> CleanupReport {
        if cleanup.is_empty() {
            return CleanupReport::default();
        }
        let scope = TokenScope::ProjectName {
            name: self.settings.bootstrap_project.clone(),
            domain_id: self.settings.bootstrap.domain_id.clone(),
        };
        let admin = self.identity.issue_token(&self.settings.bootstrap, &scope).await.ok();
        cleanup.run(self.identity.as_ref(), self.api.as_ref(), admin.as_ref()).await
    }

    /// Emits the finished lifecycle event.
    fn record_finished(&self, name: &str, trials: usize, failures: usize, report: &CleanupReport) {
        let mut event = ScenarioAuditEvent::new(name, ScenarioPhase::Finished);
        event.trials = trials;
        event.failures = failures;
        event.cleanup_failures = report.failures.len();
        self.audit.record_scenario(&event);
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Scenario failures other than trial mismatches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// Harness construction failed.
    #[error("scenario setup failed: {0}")]
    Setup(String),
    /// The metadef lock could not be taken.
    #[error(transparent)]
    Lock(#[from] LockError),
    /// Persona provisioning or lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Fixture creation failed.
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    /// The body task was cancelled.
    #[error("scenario task failed: {0}")]
    Join(String),
}
