// crates/rbac-conformance-config/src/config.rs
// ============================================================================
// Module: RBAC Conformance Configuration
// Description: Configuration loading and validation for conformance runs.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: rbac-conformance-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed: a run never starts against
//! endpoints or credentials that did not validate.
//!
//! The `[enforce_scope]` flag gates every scenario. When `image` is false the
//! service is not running the scoped policy model and scenarios skip.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use rbac_conformance_core::Operation;
use rbac_conformance_core::Oracle;
use rbac_conformance_core::OverrideRule;
use rbac_conformance_core::Persona;
use rbac_conformance_core::PersonaScope;
use rbac_conformance_core::ProjectSlot;
use rbac_conformance_core::legacy_overrides;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "rbac-conformance.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "RBAC_CONFORMANCE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of identity names (users, projects, roles, domains).
pub(crate) const MAX_NAME_LENGTH: usize = 255;
/// Maximum length of an endpoint URL.
pub(crate) const MAX_URL_LENGTH: usize = 2048;
/// Maximum number of custom oracle override entries.
pub(crate) const MAX_ORACLE_OVERRIDES: usize = 256;
/// Minimum HTTP connect timeout in milliseconds.
pub(crate) const MIN_CONNECT_TIMEOUT_MS: u64 = 100;
/// Maximum HTTP connect timeout in milliseconds.
pub(crate) const MAX_CONNECT_TIMEOUT_MS: u64 = 60_000;
/// Minimum HTTP request timeout in milliseconds.
pub(crate) const MIN_REQUEST_TIMEOUT_MS: u64 = 500;
/// Maximum HTTP request timeout in milliseconds.
pub(crate) const MAX_REQUEST_TIMEOUT_MS: u64 = 600_000;
/// Default HTTP connect timeout in milliseconds.
pub(crate) const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
/// Default HTTP request timeout in milliseconds.
pub(crate) const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Conformance run configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConformanceConfig {
    /// Scoped-policy enforcement flags of the service under test.
    #[serde(default)]
    pub enforce_scope: EnforceScopeConfig,
    /// Identity backend connection and bootstrap credentials.
    pub identity: IdentityConfig,
    /// Image service connection.
    pub image: ImageServiceConfig,
    /// HTTP client timeouts.
    #[serde(default)]
    pub http: HttpConfig,
    /// Persona project-slot overrides.
    #[serde(default)]
    pub personas: PersonaConfig,
    /// Expectation oracle configuration.
    #[serde(default)]
    pub oracle: OracleConfig,
    /// Metadef lock configuration.
    #[serde(default)]
    pub lock: LockConfig,
    /// Trial audit configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl ConformanceConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.identity.validate()?;
        self.image.validate()?;
        self.http.validate()?;
        self.personas.validate()?;
        self.oracle.validate()?;
        self.lock.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Returns true when scenarios should run against the service.
    #[must_use]
    pub const fn scenarios_enabled(&self) -> bool {
        self.enforce_scope.image
    }
}

/// Scoped-policy enforcement flags.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnforceScopeConfig {
    /// Whether the image service enforces scoped policies.
    #[serde(default)]
    pub image: bool,
}

/// Identity backend configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Identity API base URL (for example `http://keystone:5000/v3`).
    pub endpoint: String,
    /// Domain users and projects are created in.
    #[serde(default = "default_domain_id")]
    pub domain_id: String,
    /// Bootstrap administrator user name.
    pub username: String,
    /// Bootstrap administrator password.
    pub password: String,
    /// Bootstrap administrator project name.
    pub project_name: String,
    /// Role name granted to members.
    #[serde(default = "default_member_role")]
    pub member_role: String,
    /// Role name granted to readers.
    #[serde(default = "default_reader_role")]
    pub reader_role: String,
    /// Role name granted to administrators.
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
}

impl IdentityConfig {
    /// Validates identity configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("identity.endpoint", &self.endpoint)?;
        validate_name("identity.domain_id", &self.domain_id)?;
        validate_name("identity.username", &self.username)?;
        validate_name("identity.project_name", &self.project_name)?;
        validate_name("identity.member_role", &self.member_role)?;
        validate_name("identity.reader_role", &self.reader_role)?;
        validate_name("identity.admin_role", &self.admin_role)?;
        if self.password.is_empty() {
            return Err(ConfigError::Invalid("identity.password must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Image service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageServiceConfig {
    /// Image API base URL (without the `/v2` suffix).
    pub endpoint: String,
}

impl ImageServiceConfig {
    /// Validates image service configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("image.endpoint", &self.endpoint)
    }
}

/// HTTP client timeout configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Maximum time to establish a connection.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Maximum end-to-end request time (connect + body).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl HttpConfig {
    /// Validates HTTP timeout configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout_range(
            "http.connect_timeout_ms",
            self.connect_timeout_ms,
            MIN_CONNECT_TIMEOUT_MS,
            MAX_CONNECT_TIMEOUT_MS,
        )?;
        validate_timeout_range(
            "http.request_timeout_ms",
            self.request_timeout_ms,
            MIN_REQUEST_TIMEOUT_MS,
            MAX_REQUEST_TIMEOUT_MS,
        )?;
        if self.request_timeout_ms < self.connect_timeout_ms {
            return Err(ConfigError::Invalid(
                "http.request_timeout_ms must be >= connect_timeout_ms".to_string(),
            ));
        }
        Ok(())
    }
}

/// Persona project-slot overrides keyed by persona name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PersonaConfig {
    /// Slot per persona name.
    pub slots: BTreeMap<String, ProjectSlot>,
}

impl PersonaConfig {
    /// Validates persona overrides.
    fn validate(&self) -> Result<(), ConfigError> {
        for name in self.slots.keys() {
            let persona: Persona =
                name.parse().map_err(|err| ConfigError::Invalid(format!("personas: {err}")))?;
            if persona.default_scope() == PersonaScope::System {
                return Err(ConfigError::Invalid(format!(
                    "personas.{name} is system scoped and takes no project slot"
                )));
            }
        }
        Ok(())
    }

    /// Returns the effective scope for a persona.
    #[must_use]
    pub fn scope_for(&self, persona: Persona) -> PersonaScope {
        match persona.default_scope() {
            PersonaScope::System => PersonaScope::System,
            PersonaScope::Project(slot) => PersonaScope::Project(
                self.slots.get(persona.as_str()).copied().unwrap_or(slot),
            ),
        }
    }
}

/// Expectation oracle configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleConfig {
    /// Whether the legacy-posture override entries are active.
    #[serde(default = "default_legacy_overrides")]
    pub legacy_overrides: bool,
    /// Operations whose blanket policy is checked before the target lookup.
    #[serde(default)]
    pub blanket_policy_first: Vec<Operation>,
    /// Custom override entries, evaluated before the legacy entries.
    #[serde(default)]
    pub overrides: Vec<OverrideRule>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            legacy_overrides: default_legacy_overrides(),
            blanket_policy_first: Vec::new(),
            overrides: Vec::new(),
        }
    }
}

impl OracleConfig {
    /// Validates oracle configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.overrides.len() > MAX_ORACLE_OVERRIDES {
            return Err(ConfigError::Invalid(format!(
                "oracle.overrides exceeds max entries ({MAX_ORACLE_OVERRIDES})"
            )));
        }
        let mut names = BTreeSet::new();
        for entry in &self.overrides {
            validate_name("oracle.overrides.name", &entry.name)?;
            if !names.insert(entry.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "oracle.overrides contains duplicate name: {}",
                    entry.name
                )));
            }
            for visibility in &entry.visibilities {
                let metadef_only = !entry.families.is_empty()
                    && entry.families.iter().all(|family| family.is_metadef());
                if metadef_only
                    && !entry
                        .families
                        .iter()
                        .all(|family| family.descriptor().visibility_model.allows(*visibility))
                {
                    return Err(ConfigError::Invalid(format!(
                        "oracle.overrides.{}: visibility {} never applies to its families",
                        entry.name,
                        visibility.as_str()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Builds the oracle described by this configuration.
    #[must_use]
    pub fn build_oracle(&self) -> Oracle {
        let mut entries = self.overrides.clone();
        if self.legacy_overrides {
            entries.extend(legacy_overrides());
        }
        Oracle::new(entries, self.blanket_policy_first.iter().copied().collect())
    }
}

/// Metadef lock configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockConfig {
    /// Directory holding lock files (defaults to the system temp dir).
    #[serde(default)]
    pub dir: Option<String>,
}

impl LockConfig {
    /// Validates lock configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.dir {
            validate_path_string("lock.dir", dir)?;
        }
        Ok(())
    }

    /// Returns the directory lock files are created in.
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.as_ref().map_or_else(env::temp_dir, |dir| PathBuf::from(dir.trim()))
    }
}

/// Trial audit configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enable structured trial audit events.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when absent.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a non-empty, bounded name.
fn validate_name(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

/// Validates an absolute http(s) URL.
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() > MAX_URL_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let url = Url::parse(value.trim())
        .map_err(|err| ConfigError::Invalid(format!("{field} is not a valid url: {err}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::Invalid(format!("{field} has unsupported scheme: {other}")));
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::Invalid(format!("{field} must include a host")));
    }
    Ok(())
}

/// Validates a timeout range in milliseconds.
fn validate_timeout_range(
    field: &str,
    value_ms: u64,
    min_ms: u64,
    max_ms: u64,
) -> Result<(), ConfigError> {
    if value_ms < min_ms || value_ms > max_ms {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between {min_ms} and {max_ms} milliseconds",
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default identity domain.
fn default_domain_id() -> String {
    "default".to_string()
}

/// Default member role name.
fn default_member_role() -> String {
    "member".to_string()
}

/// Default reader role name.
fn default_reader_role() -> String {
    "reader".to_string()
}

/// Default administrator role name.
fn default_admin_role() -> String {
    "admin".to_string()
}

/// Default HTTP connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Default HTTP request timeout.
const fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

/// Legacy overrides stay on until the service adopts the scoped model.
const fn default_legacy_overrides() -> bool {
    true
}

/// Default audit enabled flag.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Tests
// ============================================================================
