// crates/rbac-conformance-core/src/oracle/discovery.rs
// ============================================================================
// Module: Discoverability
// Description: Discovery and listing predicates for actors and resources.
// Purpose: Decide whether an actor can locate a resource at all.
// Dependencies: crate::model
// ============================================================================

//! ## Overview
//! Discoverability is checked before any authority question. Single-target
//! discovery counts accepted shares, and pending shares for calls that only
//! read; listing counts accepted shares only. System-scoped actors reach the
//! metadata catalog but never locate project-owned images or memberships.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::model::AccessClass;
use crate::model::ListingKind;
use crate::model::MemberStatus;
use crate::model::ProjectId;
use crate::model::ResourceFamily;
use crate::model::ResourceState;
use crate::model::RoleKind;
use crate::model::Visibility;
use crate::model::VisibilityModel;

// ============================================================================
// SECTION: Types
// ============================================================================

/// The acting side of a trial as seen by the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorView {
    /// Role the actor holds.
    pub role: RoleKind,
    /// Actor's project; `None` for system scope.
    pub project: Option<ProjectId>,
}

impl ActorView {
    /// Creates an actor view.
    #[must_use]
    pub const fn new(role: RoleKind, project: Option<ProjectId>) -> Self {
        Self {
            role,
            project,
        }
    }

    /// Returns true when the actor's project owns the resource.
    #[must_use]
    pub fn owns(&self, state: &ResourceState) -> bool {
        self.project.is_some() && self.project == state.owner
    }
}

/// One item of a list response, as predicted from fixtures.
#[derive(Debug, Clone, Copy)]
pub enum ListedItem<'a> {
    /// An image or namespace.
    Resource(&'a ResourceState),
    /// One membership of an image.
    Membership {
        /// The shared image.
        image: &'a ResourceState,
        /// The member project.
        member: &'a ProjectId,
    },
}

// ============================================================================
// SECTION: Predicates
// ============================================================================

/// Returns true when the actor can locate the resource by identifier.
///
/// A pending share only reveals the image to non-mutating calls; mutations
/// need an accepted share.
#[must_use]
pub fn discoverable(
    family: ResourceFamily,
    access: AccessClass,
    actor: &ActorView,
    state: &ResourceState,
) -> bool {
    if actor.role.is_system_scoped() {
        return family.admits_system_scope();
    }
    if actor.owns(state) {
        return true;
    }
    match family.descriptor().visibility_model {
        VisibilityModel::Catalog => true,
        VisibilityModel::TwoTier => state.visibility == Visibility::Public,
        VisibilityModel::FourTier => match state.visibility {
            Visibility::Public | Visibility::Community => true,
            Visibility::Private | Visibility::Shared => actor
                .project
                .as_ref()
                .and_then(|project| state.membership_of(project))
                .is_some_and(|status| match status {
                    MemberStatus::Accepted => true,
                    MemberStatus::Pending => access.honors_pending_share(),
                    MemberStatus::Rejected => false,
                }),
        },
    }
}

/// Returns true when a filtered list call made by the actor includes the item.
#[must_use]
pub fn listable(kind: ListingKind, actor: &ActorView, item: ListedItem<'_>) -> bool {
    if actor.role.is_system_scoped() {
        return kind == ListingKind::Namespaces;
    }
    match (kind, item) {
        (ListingKind::Images, ListedItem::Resource(state)) => {
            actor.owns(state)
                || matches!(state.visibility, Visibility::Public | Visibility::Community)
                || actor
                    .project
                    .as_ref()
                    .is_some_and(|project| state.membership_of(project) == Some(MemberStatus::Accepted))
        }
        (ListingKind::Namespaces, ListedItem::Resource(state)) => {
            actor.owns(state) || state.visibility == Visibility::Public
        }
        (
            ListingKind::Members,
            ListedItem::Membership {
                image,
                member,
            },
        ) => actor.owns(image) || actor.project.as_ref() == Some(member),
        _ => false,
    }
}
