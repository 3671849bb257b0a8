// crates/rbac-conformance-core/src/model/operation.rs
// ============================================================================
// Module: Operations
// Description: Catalog of operations exercised against the image service.
// Purpose: Attach family, access class, and success status to every call.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every API call a scenario can issue is an [`Operation`]. Its
//! [`OperationDescriptor`] tells the oracle which family it belongs to, which
//! [`AccessClass`] the role ceiling is checked against, and which status code
//! a successful call returns.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::model::resource::ResourceFamily;

// ============================================================================
// SECTION: Access Classes
// ============================================================================

/// Authority class of an operation, independent of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessClass {
    /// Creates a top-level resource; no existing target.
    Create,
    /// Lists a top-level collection; no existing target.
    ListCollection,
    /// Reads a target resource or its children.
    Read,
    /// Downloads resource data.
    Download,
    /// Mutates a target resource, including creating children under it.
    Write,
    /// Deletes a target resource or its children.
    Delete,
    /// Grants or revokes a share on a target resource.
    ShareGrant,
    /// Answers a share offered to the actor's project.
    ShareRespond,
}

impl AccessClass {
    /// Returns true when the class addresses an existing resource.
    #[must_use]
    pub const fn is_targeted(self) -> bool {
        !matches!(self, Self::Create | Self::ListCollection)
    }

    /// Returns true when a pending share is enough to locate the target.
    #[must_use]
    pub const fn honors_pending_share(self) -> bool {
        matches!(self, Self::ListCollection | Self::Read | Self::Download | Self::ShareRespond)
    }

    /// Returns true when the class changes state on the service.
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::Create | Self::Write | Self::Delete | Self::ShareGrant | Self::ShareRespond
        )
    }
}

/// Which per-item predicate a list response is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    /// Image listing.
    Images,
    /// Namespace listing.
    Namespaces,
    /// Image member listing.
    Members,
}

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Descriptor attached to each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Family the operation acts on.
    pub family: ResourceFamily,
    /// Access class checked against the role ceiling.
    pub access: AccessClass,
    /// Status code returned on success.
    pub success_status: u16,
    /// Per-item listing predicate, for set-returning calls.
    pub listing: Option<ListingKind>,
}

/// Operations consumed from the image service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create an image record.
    CreateImage,
    /// Show an image.
    GetImage,
    /// List images.
    ListImages,
    /// Patch image attributes.
    UpdateImage,
    /// Upload image data.
    UploadImage,
    /// Download image data.
    DownloadImage,
    /// Delete an image.
    DeleteImage,
    /// Deactivate an image.
    DeactivateImage,
    /// Reactivate an image.
    ReactivateImage,
    /// Share an image with a project.
    AddMember,
    /// Show one image membership.
    GetMember,
    /// List image memberships.
    ListMembers,
    /// Accept or reject a membership.
    UpdateMember,
    /// Remove a membership.
    DeleteMember,
    /// Create a namespace.
    CreateNamespace,
    /// Show a namespace.
    GetNamespace,
    /// List namespaces.
    ListNamespaces,
    /// Update a namespace.
    UpdateNamespace,
    /// Delete a namespace.
    DeleteNamespace,
    /// Create a namespace object.
    CreateObject,
    /// Show a namespace object.
    GetObject,
    /// List namespace objects.
    ListObjects,
    /// Update a namespace object.
    UpdateObject,
    /// Delete a namespace object.
    DeleteObject,
    /// Create a namespace property.
    CreateProperty,
    /// Show a namespace property.
    GetProperty,
    /// List namespace properties.
    ListProperties,
    /// Update a namespace property.
    UpdateProperty,
    /// Delete a namespace property.
    DeleteProperty,
    /// Create one namespace tag.
    CreateTag,
    /// Create several namespace tags in one call.
    CreateTags,
    /// Show a namespace tag.
    GetTag,
    /// List namespace tags.
    ListTags,
    /// Rename a namespace tag.
    UpdateTag,
    /// Delete one namespace tag.
    DeleteTag,
    /// Delete every tag of a namespace in one call.
    DeleteTags,
    /// Associate a resource type with a namespace.
    CreateResourceTypeAssociation,
    /// List resource type associations of a namespace.
    ListResourceTypeAssociations,
    /// Remove a resource type association.
    DeleteResourceTypeAssociation,
    /// List the global resource type catalog.
    ListResourceTypes,
}

impl Operation {
    /// All operations in declaration order.
    pub const ALL: [Self; 40] = [
        Self::CreateImage,
        Self::GetImage,
        Self::ListImages,
        Self::UpdateImage,
        Self::UploadImage,
        Self::DownloadImage,
        Self::DeleteImage,
        Self::DeactivateImage,
        Self::ReactivateImage,
        Self::AddMember,
        Self::GetMember,
        Self::ListMembers,
        Self::UpdateMember,
        Self::DeleteMember,
        Self::CreateNamespace,
        Self::GetNamespace,
        Self::ListNamespaces,
        Self::UpdateNamespace,
        Self::DeleteNamespace,
        Self::CreateObject,
        Self::GetObject,
        Self::ListObjects,
        Self::UpdateObject,
        Self::DeleteObject,
        Self::CreateProperty,
        Self::GetProperty,
        Self::ListProperties,
        Self::UpdateProperty,
        Self::DeleteProperty,
        Self::CreateTag,
        Self::CreateTags,
        Self::GetTag,
        Self::ListTags,
        Self::UpdateTag,
        Self::DeleteTag,
        Self::DeleteTags,
        Self::CreateResourceTypeAssociation,
        Self::ListResourceTypeAssociations,
        Self::DeleteResourceTypeAssociation,
        Self::ListResourceTypes,
    ];

    /// Returns the canonical operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateImage => "create_image",
            Self::GetImage => "get_image",
            Self::ListImages => "list_images",
            Self::UpdateImage => "update_image",
            Self::UploadImage => "upload_image",
            Self::DownloadImage => "download_image",
            Self::DeleteImage => "delete_image",
            Self::DeactivateImage => "deactivate_image",
            Self::ReactivateImage => "reactivate_image",
            Self::AddMember => "add_member",
            Self::GetMember => "get_member",
            Self::ListMembers => "list_members",
            Self::UpdateMember => "update_member",
            Self::DeleteMember => "delete_member",
            Self::CreateNamespace => "create_namespace",
            Self::GetNamespace => "get_namespace",
            Self::ListNamespaces => "list_namespaces",
            Self::UpdateNamespace => "update_namespace",
            Self::DeleteNamespace => "delete_namespace",
            Self::CreateObject => "create_object",
            Self::GetObject => "get_object",
            Self::ListObjects => "list_objects",
            Self::UpdateObject => "update_object",
            Self::DeleteObject => "delete_object",
            Self::CreateProperty => "create_property",
            Self::GetProperty => "get_property",
            Self::ListProperties => "list_properties",
            Self::UpdateProperty => "update_property",
            Self::DeleteProperty => "delete_property",
            Self::CreateTag => "create_tag",
            Self::CreateTags => "create_tags",
            Self::GetTag => "get_tag",
            Self::ListTags => "list_tags",
            Self::UpdateTag => "update_tag",
            Self::DeleteTag => "delete_tag",
            Self::DeleteTags => "delete_tags",
            Self::CreateResourceTypeAssociation => "create_resource_type_association",
            Self::ListResourceTypeAssociations => "list_resource_type_associations",
            Self::DeleteResourceTypeAssociation => "delete_resource_type_association",
            Self::ListResourceTypes => "list_resource_types",
        }
    }

    /// Returns the operation descriptor.
    #[must_use]
    pub const fn descriptor(self) -> OperationDescriptor {
        use AccessClass::Create;
        use AccessClass::Delete;
        use AccessClass::Download;
        use AccessClass::ListCollection;
        use AccessClass::Read;
        use AccessClass::ShareGrant;
        use AccessClass::ShareRespond;
        use AccessClass::Write;
        use ResourceFamily as F;

        let (family, access, success_status) = match self {
            Self::CreateImage => (F::Image, Create, 201),
            Self::GetImage => (F::Image, Read, 200),
            Self::ListImages => (F::Image, ListCollection, 200),
            Self::UpdateImage => (F::Image, Write, 200),
            Self::UploadImage | Self::DeactivateImage | Self::ReactivateImage => {
                (F::Image, Write, 204)
            }
            Self::DownloadImage => (F::Image, Download, 204),
            Self::DeleteImage => (F::Image, Delete, 204),
            Self::AddMember => (F::ImageMember, ShareGrant, 200),
            Self::GetMember | Self::ListMembers => (F::ImageMember, Read, 200),
            Self::UpdateMember => (F::ImageMember, ShareRespond, 200),
            Self::DeleteMember => (F::ImageMember, ShareGrant, 204),
            Self::CreateNamespace => (F::Namespace, Create, 201),
            Self::GetNamespace => (F::Namespace, Read, 200),
            Self::ListNamespaces => (F::Namespace, ListCollection, 200),
            Self::UpdateNamespace => (F::Namespace, Write, 200),
            Self::DeleteNamespace => (F::Namespace, Delete, 204),
            Self::CreateObject => (F::NamespaceObject, Write, 201),
            Self::GetObject | Self::ListObjects => (F::NamespaceObject, Read, 200),
            Self::UpdateObject => (F::NamespaceObject, Write, 200),
            Self::DeleteObject => (F::NamespaceObject, Delete, 204),
            Self::CreateProperty => (F::NamespaceProperty, Write, 201),
            Self::GetProperty | Self::ListProperties => (F::NamespaceProperty, Read, 200),
            Self::UpdateProperty => (F::NamespaceProperty, Write, 200),
            Self::DeleteProperty => (F::NamespaceProperty, Delete, 204),
            Self::CreateTag | Self::CreateTags => (F::NamespaceTag, Write, 201),
            Self::GetTag | Self::ListTags => (F::NamespaceTag, Read, 200),
            Self::UpdateTag => (F::NamespaceTag, Write, 200),
            Self::DeleteTag | Self::DeleteTags => (F::NamespaceTag, Delete, 204),
            Self::CreateResourceTypeAssociation => (F::ResourceTypeAssociation, Write, 201),
            Self::ListResourceTypeAssociations => (F::ResourceTypeAssociation, Read, 200),
            Self::DeleteResourceTypeAssociation => (F::ResourceTypeAssociation, Delete, 204),
            Self::ListResourceTypes => (F::ResourceType, ListCollection, 200),
        };
        let listing = match self {
            Self::ListImages => Some(ListingKind::Images),
            Self::ListNamespaces => Some(ListingKind::Namespaces),
            Self::ListMembers => Some(ListingKind::Members),
            _ => None,
        };
        OperationDescriptor {
            family,
            access,
            success_status,
            listing,
        }
    }

    /// Returns the operation family.
    #[must_use]
    pub const fn family(self) -> ResourceFamily {
        self.descriptor().family
    }

    /// Returns the operation access class.
    #[must_use]
    pub const fn access(self) -> AccessClass {
        self.descriptor().access
    }

    /// Returns the operations of a family in declaration order.
    #[must_use]
    pub fn of_family(family: ResourceFamily) -> Vec<Self> {
        Self::ALL.into_iter().filter(|operation| operation.family() == family).collect()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
