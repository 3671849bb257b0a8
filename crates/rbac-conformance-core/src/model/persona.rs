// crates/rbac-conformance-core/src/model/persona.rs
// ============================================================================
// Module: Personas and Roles
// Description: Role kinds, project slots, and the built-in persona catalog.
// Purpose: Replace string-formatted persona lookups with an explicit mapping.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A persona is a logical role name (`project_member`, `system_admin`, ...)
//! that resolves to a [`RoleKind`] and a [`PersonaScope`]. The catalog is
//! closed: parsing an unknown name fails with [`UnknownPersona`] instead of
//! silently producing a default actor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Role Kinds
// ============================================================================

/// Authorization role held by an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    /// Project administrator.
    Admin,
    /// Project member.
    Member,
    /// Read-only project member.
    Reader,
    /// System-scoped administrator with no project.
    SystemAdmin,
}

impl RoleKind {
    /// All role kinds in declaration order.
    pub const ALL: [Self; 4] = [Self::Admin, Self::Member, Self::Reader, Self::SystemAdmin];

    /// Returns the canonical role label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Reader => "reader",
            Self::SystemAdmin => "system_admin",
        }
    }

    /// Returns true when the role is granted on the system scope.
    #[must_use]
    pub const fn is_system_scoped(self) -> bool {
        matches!(self, Self::SystemAdmin)
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Scopes
// ============================================================================

/// Logical project slot a persona is provisioned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSlot {
    /// Separate administrator project, only used through slot overrides.
    Admin,
    /// Home project under test.
    Home,
    /// Second, non-overlapping project for cross-project paths.
    Alt,
}

impl ProjectSlot {
    /// Returns the slot label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Home => "home",
            Self::Alt => "alt",
        }
    }
}

/// Scope a persona's credential is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaScope {
    /// Project-scoped credential in the given slot.
    Project(ProjectSlot),
    /// System-scoped credential (project-less).
    System,
}

// ============================================================================
// SECTION: Persona Catalog
// ============================================================================

/// Built-in persona names used by scenario matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Administrator of the admin project.
    ProjectAdmin,
    /// Member of the home project.
    ProjectMember,
    /// Reader of the home project.
    ProjectReader,
    /// Administrator of the alt project.
    ProjectAltAdmin,
    /// Member of the alt project.
    ProjectAltMember,
    /// Reader of the alt project.
    ProjectAltReader,
    /// System-scoped administrator.
    SystemAdmin,
}

impl Persona {
    /// All personas in declaration order.
    pub const ALL: [Self; 7] = [
        Self::ProjectAdmin,
        Self::ProjectMember,
        Self::ProjectReader,
        Self::ProjectAltAdmin,
        Self::ProjectAltMember,
        Self::ProjectAltReader,
        Self::SystemAdmin,
    ];

    /// Returns the canonical persona name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectAdmin => "project_admin",
            Self::ProjectMember => "project_member",
            Self::ProjectReader => "project_reader",
            Self::ProjectAltAdmin => "project_alt_admin",
            Self::ProjectAltMember => "project_alt_member",
            Self::ProjectAltReader => "project_alt_reader",
            Self::SystemAdmin => "system_admin",
        }
    }

    /// Returns the role the persona holds.
    #[must_use]
    pub const fn role(self) -> RoleKind {
        match self {
            Self::ProjectAdmin | Self::ProjectAltAdmin => RoleKind::Admin,
            Self::ProjectMember | Self::ProjectAltMember => RoleKind::Member,
            Self::ProjectReader | Self::ProjectAltReader => RoleKind::Reader,
            Self::SystemAdmin => RoleKind::SystemAdmin,
        }
    }

    /// Returns the default scope for the persona.
    #[must_use]
    pub const fn default_scope(self) -> PersonaScope {
        match self {
            Self::ProjectAdmin | Self::ProjectMember | Self::ProjectReader => {
                PersonaScope::Project(ProjectSlot::Home)
            }
            Self::ProjectAltAdmin | Self::ProjectAltMember | Self::ProjectAltReader => {
                PersonaScope::Project(ProjectSlot::Alt)
            }
            Self::SystemAdmin => PersonaScope::System,
        }
    }

    /// Returns the cross-project counterpart (same role, other project).
    #[must_use]
    pub const fn alt_counterpart(self) -> Self {
        match self {
            Self::ProjectAdmin => Self::ProjectAltAdmin,
            Self::ProjectMember => Self::ProjectAltMember,
            Self::ProjectReader => Self::ProjectAltReader,
            Self::ProjectAltAdmin => Self::ProjectAdmin,
            Self::ProjectAltMember => Self::ProjectMember,
            Self::ProjectAltReader => Self::ProjectReader,
            Self::SystemAdmin => Self::SystemAdmin,
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = UnknownPersona;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|persona| persona.as_str() == value)
            .ok_or_else(|| UnknownPersona(value.to_string()))
    }
}

/// Persona name that is not part of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown persona: {0}")]
pub struct UnknownPersona(pub String);
