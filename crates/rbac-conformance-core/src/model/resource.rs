// crates/rbac-conformance-core/src/model/resource.rs
// ============================================================================
// Module: Resource Model
// Description: Visibility, membership, resource families, and resource state.
// Purpose: Describe what the oracle needs to classify a resource offline.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Each fixture resource is described by a [`ResourceState`]: its owning
//! project, its visibility, and (for share-based resources) the membership
//! status of every project it has been shared with. A [`ResourceFamily`]
//! carries a small [`FamilyDescriptor`] so one decision table can serve all
//! families without per-family branching.
//!
//! Invariants:
//! - A project appears at most once in a membership set.
//! - Namespace-backed families only use `private` and `public`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::model::identifiers::ProjectId;
use crate::model::operation::AccessClass;
use crate::model::persona::RoleKind;

// ============================================================================
// SECTION: Visibility and Membership
// ============================================================================

/// Resource visibility attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to the owner only.
    Private,
    /// Visible to the owner and explicit members.
    Shared,
    /// Discoverable by anyone, listed on request.
    Community,
    /// Visible to everyone.
    Public,
}

impl Visibility {
    /// Image visibilities in fixture order.
    pub const IMAGE: [Self; 4] = [Self::Private, Self::Shared, Self::Community, Self::Public];
    /// Namespace visibilities in fixture order.
    pub const NAMESPACE: [Self; 2] = [Self::Public, Self::Private];

    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Shared => "shared",
            Self::Community => "community",
            Self::Public => "public",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::IMAGE.into_iter().find(|visibility| visibility.as_str() == value)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a share relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Share offered, not yet answered.
    Pending,
    /// Share accepted by the member project.
    Accepted,
    /// Share rejected by the member project.
    Rejected,
}

impl MemberStatus {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        [Self::Pending, Self::Accepted, Self::Rejected]
            .into_iter()
            .find(|status| status.as_str() == value)
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship between an actor's project and a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Actor's project owns the resource.
    Owner,
    /// Actor's project holds a pending share.
    PendingMember,
    /// Actor's project holds an accepted share.
    AcceptedMember,
    /// Actor's project holds a rejected share.
    RejectedMember,
    /// Resource belongs to another project with no share.
    Foreign,
    /// Actor has no project (system scope).
    Unscoped,
}

// ============================================================================
// SECTION: Resource State
// ============================================================================

/// Ownership, visibility, and shares of a single fixture resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Owning project, absent for orphaned resources.
    pub owner: Option<ProjectId>,
    /// Visibility attribute.
    pub visibility: Visibility,
    /// Member projects and their share status.
    #[serde(default)]
    pub memberships: BTreeMap<ProjectId, MemberStatus>,
}

impl ResourceState {
    /// Creates a resource state with no memberships.
    #[must_use]
    pub const fn new(owner: Option<ProjectId>, visibility: Visibility) -> Self {
        Self {
            owner,
            visibility,
            memberships: BTreeMap::new(),
        }
    }

    /// Returns the state with a membership recorded (replacing any prior status).
    #[must_use]
    pub fn with_membership(mut self, project: ProjectId, status: MemberStatus) -> Self {
        self.memberships.insert(project, status);
        self
    }

    /// Records or replaces a membership status.
    pub fn set_membership(&mut self, project: ProjectId, status: MemberStatus) {
        self.memberships.insert(project, status);
    }

    /// Removes a membership.
    pub fn remove_membership(&mut self, project: &ProjectId) {
        self.memberships.remove(project);
    }

    /// Returns the membership status for a project.
    #[must_use]
    pub fn membership_of(&self, project: &ProjectId) -> Option<MemberStatus> {
        self.memberships.get(project).copied()
    }

    /// Classifies the relationship of an actor project to this resource.
    #[must_use]
    pub fn relation_to(&self, project: Option<&ProjectId>) -> Relation {
        let Some(project) = project else {
            return Relation::Unscoped;
        };
        if self.owner.as_ref() == Some(project) {
            return Relation::Owner;
        }
        match self.membership_of(project) {
            Some(MemberStatus::Pending) => Relation::PendingMember,
            Some(MemberStatus::Accepted) => Relation::AcceptedMember,
            Some(MemberStatus::Rejected) => Relation::RejectedMember,
            None => Relation::Foreign,
        }
    }
}

// ============================================================================
// SECTION: Families
// ============================================================================

/// Visibility model of a resource family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityModel {
    /// `private`, `shared`, `community`, `public` with share-based discovery.
    FourTier,
    /// `private` and `public` only; discovery by ownership or public.
    TwoTier,
    /// Global catalog readable by every authenticated actor.
    Catalog,
}

impl VisibilityModel {
    /// Returns true when the visibility is valid for this model.
    #[must_use]
    pub const fn allows(self, visibility: Visibility) -> bool {
        match self {
            Self::FourTier => true,
            Self::TwoTier | Self::Catalog => {
                matches!(visibility, Visibility::Private | Visibility::Public)
            }
        }
    }
}

/// Relationship model of a resource family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipModel {
    /// Explicit member projects with a status.
    Membership,
    /// Ownership and visibility only.
    None,
}

/// Which roles may ever exercise each access class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCeiling {
    /// Members manage their own resources; readers only read; publishing
    /// requires an administrator.
    OwnerManaged,
    /// Only administrators mutate; everyone else reads.
    AdminManaged,
}

impl RoleCeiling {
    /// Returns true when system-scoped roles act on the family.
    ///
    /// Project-owned image data is closed to the system scope; the shared
    /// metadata catalog is administered from it.
    #[must_use]
    pub const fn admits_system_scope(self) -> bool {
        matches!(self, Self::AdminManaged)
    }

    /// Returns true when the role may ever perform the access class,
    /// independent of ownership.
    #[must_use]
    pub const fn permits(
        self,
        role: RoleKind,
        access: AccessClass,
        requested: Option<Visibility>,
    ) -> bool {
        match role {
            RoleKind::Admin => return true,
            RoleKind::SystemAdmin => return self.admits_system_scope(),
            RoleKind::Member | RoleKind::Reader => {}
        }
        match access {
            AccessClass::ListCollection | AccessClass::Read => true,
            AccessClass::Create => match self {
                Self::OwnerManaged => {
                    matches!(role, RoleKind::Member)
                        && !matches!(requested, Some(Visibility::Public))
                }
                Self::AdminManaged => false,
            },
            AccessClass::Download
            | AccessClass::Write
            | AccessClass::Delete
            | AccessClass::ShareGrant
            | AccessClass::ShareRespond => match self {
                Self::OwnerManaged => matches!(role, RoleKind::Member),
                Self::AdminManaged => false,
            },
        }
    }
}

/// Static description of a resource family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyDescriptor {
    /// Visibility model.
    pub visibility_model: VisibilityModel,
    /// Relationship model.
    pub relationship_model: RelationshipModel,
    /// Role ceiling policy.
    pub role_ceiling: RoleCeiling,
    /// Whether names live in the single global metadata-definition namespace.
    pub global_names: bool,
}

/// Resource families under RBAC control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceFamily {
    /// Images.
    Image,
    /// Image membership relationships.
    ImageMember,
    /// Metadata-definition namespaces.
    Namespace,
    /// Namespace objects.
    NamespaceObject,
    /// Namespace properties.
    NamespaceProperty,
    /// Namespace tags.
    NamespaceTag,
    /// Resource type associations of a namespace.
    ResourceTypeAssociation,
    /// Global resource type catalog.
    ResourceType,
}

impl ResourceFamily {
    /// All families in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Image,
        Self::ImageMember,
        Self::Namespace,
        Self::NamespaceObject,
        Self::NamespaceProperty,
        Self::NamespaceTag,
        Self::ResourceTypeAssociation,
        Self::ResourceType,
    ];

    /// Returns the family label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::ImageMember => "image_member",
            Self::Namespace => "namespace",
            Self::NamespaceObject => "namespace_object",
            Self::NamespaceProperty => "namespace_property",
            Self::NamespaceTag => "namespace_tag",
            Self::ResourceTypeAssociation => "resource_type_association",
            Self::ResourceType => "resource_type",
        }
    }

    /// Returns the family descriptor.
    #[must_use]
    pub const fn descriptor(self) -> FamilyDescriptor {
        match self {
            Self::Image | Self::ImageMember => FamilyDescriptor {
                visibility_model: VisibilityModel::FourTier,
                relationship_model: RelationshipModel::Membership,
                role_ceiling: RoleCeiling::OwnerManaged,
                global_names: false,
            },
            Self::Namespace
            | Self::NamespaceObject
            | Self::NamespaceProperty
            | Self::NamespaceTag
            | Self::ResourceTypeAssociation => FamilyDescriptor {
                visibility_model: VisibilityModel::TwoTier,
                relationship_model: RelationshipModel::None,
                role_ceiling: RoleCeiling::AdminManaged,
                global_names: true,
            },
            Self::ResourceType => FamilyDescriptor {
                visibility_model: VisibilityModel::Catalog,
                relationship_model: RelationshipModel::None,
                role_ceiling: RoleCeiling::AdminManaged,
                global_names: true,
            },
        }
    }

    /// Returns true when system-scoped roles reach resources of the family.
    #[must_use]
    pub const fn admits_system_scope(self) -> bool {
        self.descriptor().role_ceiling.admits_system_scope()
    }

    /// Returns true for families stored in the global metadef namespace.
    #[must_use]
    pub const fn is_metadef(self) -> bool {
        self.descriptor().global_names
    }
}

impl fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
