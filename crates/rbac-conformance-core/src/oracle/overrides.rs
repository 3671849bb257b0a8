// crates/rbac-conformance-core/src/oracle/overrides.rs
// ============================================================================
// Module: Oracle Overrides
// Description: Data-driven entries evaluated before the built-in table.
// Purpose: Express legacy service behavior as editable data, not logic.
// Dependencies: crate::model, serde
// ============================================================================

//! ## Overview
//! An [`OverrideRule`] matches when every non-empty matcher matches; empty
//! matchers match anything. The first matching entry wins. The legacy set
//! returned by [`legacy_overrides`] describes how the service behaves while
//! it lacks a finer-grained scope model: administrators act across projects
//! and system-scoped tokens are shut out of image resources. When the
//! service changes, these entries are dropped or edited in config.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::model::AccessClass;
use crate::model::ListingScope;
use crate::model::Operation;
use crate::model::Relation;
use crate::model::ResourceFamily;
use crate::model::RoleKind;
use crate::model::Visibility;
use crate::oracle::rules::TrialFacts;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome class an override forces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideOutcome {
    /// Success with the operation's status code.
    Success,
    /// Forbidden.
    Forbidden,
    /// NotFound.
    NotFound,
}

/// Overridable decision-table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideRule {
    /// Entry name reported with every verdict it produces.
    pub name: String,
    /// Families matched (empty = any).
    #[serde(default)]
    pub families: Vec<ResourceFamily>,
    /// Operations matched (empty = any).
    #[serde(default)]
    pub operations: Vec<Operation>,
    /// Access classes matched (empty = any).
    #[serde(default)]
    pub access: Vec<AccessClass>,
    /// Roles matched (empty = any).
    #[serde(default)]
    pub roles: Vec<RoleKind>,
    /// Actor relations matched (empty = any, including no target).
    #[serde(default)]
    pub relations: Vec<Relation>,
    /// Visibilities matched (empty = any).
    #[serde(default)]
    pub visibilities: Vec<Visibility>,
    /// Discoverability matched (absent = any).
    #[serde(default)]
    pub discoverable: Option<bool>,
    /// Forced outcome.
    pub outcome: OverrideOutcome,
    /// Listing scope for successful list operations (default filtered).
    #[serde(default)]
    pub listing: Option<ListingScope>,
}

impl OverrideRule {
    /// Returns true when the entry applies to the trial.
    #[must_use]
    pub fn matches(&self, facts: &TrialFacts) -> bool {
        if !self.families.is_empty() && !self.families.contains(&facts.family) {
            return false;
        }
        if !self.operations.is_empty() && !self.operations.contains(&facts.operation) {
            return false;
        }
        if !self.access.is_empty() && !self.access.contains(&facts.access) {
            return false;
        }
        if !self.roles.is_empty() && !self.roles.contains(&facts.role) {
            return false;
        }
        if !self.relations.is_empty()
            && !facts.relation.is_some_and(|relation| self.relations.contains(&relation))
        {
            return false;
        }
        if !self.visibilities.is_empty()
            && !facts.visibility.is_some_and(|visibility| self.visibilities.contains(&visibility))
        {
            return false;
        }
        self.discoverable.is_none_or(|expected| expected == facts.discoverable)
    }

    /// Returns a named entry with every matcher empty.
    #[must_use]
    pub fn any(name: impl Into<String>, outcome: OverrideOutcome) -> Self {
        Self {
            name: name.into(),
            families: Vec::new(),
            operations: Vec::new(),
            access: Vec::new(),
            roles: Vec::new(),
            relations: Vec::new(),
            visibilities: Vec::new(),
            discoverable: None,
            outcome,
            listing: None,
        }
    }
}

// ============================================================================
// SECTION: Legacy Entries
// ============================================================================

/// Legacy entry: administrators succeed everywhere and list everything.
pub const LEGACY_ADMIN_GLOBAL: &str = "legacy_admin_global";
/// Legacy entry: system scope cannot create or list images.
pub const LEGACY_SYSTEM_SCOPE_CREATE_LIST: &str = "legacy_system_scope_create_list";
/// Legacy entry: system scope never finds image resources.
pub const LEGACY_SYSTEM_SCOPE_EXCLUDED: &str = "legacy_system_scope_excluded";

/// Returns the entries describing the current legacy service posture.
#[must_use]
pub fn legacy_overrides() -> Vec<OverrideRule> {
    let mut admin_global = OverrideRule::any(LEGACY_ADMIN_GLOBAL, OverrideOutcome::Success);
    admin_global.roles = vec![RoleKind::Admin];
    admin_global.listing = Some(ListingScope::Everything);

    let mut system_create_list =
        OverrideRule::any(LEGACY_SYSTEM_SCOPE_CREATE_LIST, OverrideOutcome::Forbidden);
    system_create_list.families = vec![ResourceFamily::Image];
    system_create_list.roles = vec![RoleKind::SystemAdmin];
    system_create_list.access = vec![AccessClass::Create, AccessClass::ListCollection];

    let mut system_excluded =
        OverrideRule::any(LEGACY_SYSTEM_SCOPE_EXCLUDED, OverrideOutcome::NotFound);
    system_excluded.families = vec![ResourceFamily::Image, ResourceFamily::ImageMember];
    system_excluded.roles = vec![RoleKind::SystemAdmin];

    vec![admin_global, system_create_list, system_excluded]
}
