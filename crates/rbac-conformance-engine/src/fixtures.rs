// crates/rbac-conformance-engine/src/fixtures.rs
// ============================================================================
// Module: Resource Fixture Builder
// Description: Creates tagged resources in controlled ownership/visibility.
// Purpose: Give the oracle a local picture of every resource under trial.
// Dependencies: rbac-conformance-clients, rbac-conformance-core
// ============================================================================

//! ## Overview
//! Each fixture handle carries the [`ResourceState`] it was created with, so
//! expectations are computed without re-querying the service. Creation
//! failures are setup defects: they abort with [`FixtureError`] and are
//! never retried. Every created resource registers its deletion on the
//! [`CleanupStack`] with the creator's credential.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rbac_conformance_clients::ApiRequest;
use rbac_conformance_clients::ApiResponse;
use rbac_conformance_clients::Credential;
use rbac_conformance_clients::ImageApi;
use rbac_conformance_core::ImageId;
use rbac_conformance_core::MemberStatus;
use rbac_conformance_core::NamespaceName;
use rbac_conformance_core::ProjectId;
use rbac_conformance_core::ResourceName;
use rbac_conformance_core::ResourceState;
use rbac_conformance_core::Visibility;
use thiserror::Error;

use crate::cleanup::CleanupAction;
use crate::cleanup::CleanupStack;
use crate::naming;
use crate::registry::Actor;

/// Size of uploaded image payloads.
pub const UPLOAD_BYTES: usize = 1024;

// ============================================================================
// SECTION: Handles
// ============================================================================

/// A created image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFixture {
    /// Image identifier.
    pub id: ImageId,
    /// Ownership, visibility, and shares.
    pub state: ResourceState,
    /// Credential of the creator.
    pub creator: Credential,
}

/// A created metadata-definition namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceFixture {
    /// Namespace name.
    pub name: NamespaceName,
    /// Ownership and visibility.
    pub state: ResourceState,
}

/// A named child of a namespace (object, property, tag, association).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildFixture {
    /// Parent namespace.
    pub namespace: NamespaceFixture,
    /// Child name.
    pub name: ResourceName,
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Creates fixtures through the image service.
#[derive(Clone, Copy)]
pub struct FixtureBuilder<'a> {
    /// Image service.
    api: &'a dyn ImageApi,
    /// Teardown registry.
    cleanup: &'a CleanupStack,
}

impl<'a> FixtureBuilder<'a> {
    /// Creates a builder.
    #[must_use]
    pub const fn new(api: &'a dyn ImageApi, cleanup: &'a CleanupStack) -> Self {
        Self {
            api,
            cleanup,
        }
    }

    /// Creates one image owned by the creator's project.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when creation fails.
    pub async fn create_image(
        &self,
        creator: &Actor,
        visibility: Visibility,
    ) -> Result<ImageFixture, FixtureError> {
        let scope = creator.project().map_or("system", ProjectId::as_str);
        let request = ApiRequest::CreateImage {
            name: format!("{scope}_image-{}", naming::random_suffix()),
            visibility,
        };
        let response = self.submit(creator, &request).await?;
        let id = response
            .str_field("id")
            .map(ImageId::new)
            .ok_or_else(|| FixtureError::InvalidResponse("image id missing".to_string()))?;
        self.cleanup.push(CleanupAction::DeleteImage {
            image: id.clone(),
            credential: creator.credential().clone(),
        });
        let owner = response.str_field("owner").map(ProjectId::new).or_else(|| creator.project().cloned());
        Ok(ImageFixture {
            id,
            state: ResourceState::new(owner, visibility),
            creator: creator.credential().clone(),
        })
    }

    /// Creates one image per visibility, in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when any creation fails.
    pub async fn image_batch(
        &self,
        creator: &Actor,
        visibilities: &[Visibility],
    ) -> Result<Vec<ImageFixture>, FixtureError> {
        let mut images = Vec::with_capacity(visibilities.len());
        for visibility in visibilities {
            images.push(self.create_image(creator, *visibility).await?);
        }
        Ok(images)
    }

    /// Uploads random data to an image.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the upload fails.
    pub async fn upload(&self, actor: &Actor, image: &ImageFixture) -> Result<(), FixtureError> {
        let request = ApiRequest::UploadImage {
            image: image.id.clone(),
            data: naming::random_bytes(UPLOAD_BYTES),
        };
        self.submit(actor, &request).await.map(|_| ())
    }

    /// Deactivates an image.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the call fails.
    pub async fn deactivate(&self, actor: &Actor, image: &ImageFixture) -> Result<(), FixtureError> {
        let request = ApiRequest::DeactivateImage {
            image: image.id.clone(),
        };
        self.submit(actor, &request).await.map(|_| ())
    }

    /// Shares an image with a project; the membership starts pending.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the share fails.
    pub async fn share(
        &self,
        owner: &Actor,
        image: &mut ImageFixture,
        member: &ProjectId,
    ) -> Result<(), FixtureError> {
        let request = ApiRequest::AddMember {
            image: image.id.clone(),
            member: member.clone(),
        };
        self.submit(owner, &request).await?;
        self.cleanup.push(CleanupAction::DeleteMember {
            image: image.id.clone(),
            member: member.clone(),
            credential: owner.credential().clone(),
        });
        image.state.set_membership(member.clone(), MemberStatus::Pending);
        Ok(())
    }

    /// Answers the member actor's share of an image.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the actor has no project or the call fails.
    pub async fn respond(
        &self,
        member: &Actor,
        image: &mut ImageFixture,
        status: MemberStatus,
    ) -> Result<(), FixtureError> {
        let project = member
            .project()
            .cloned()
            .ok_or_else(|| FixtureError::InvalidResponse(format!("{} has no project", member.label())))?;
        let request = ApiRequest::UpdateMember {
            image: image.id.clone(),
            member: project.clone(),
            status,
        };
        self.submit(member, &request).await?;
        image.state.set_membership(project, status);
        Ok(())
    }

    /// Creates a namespace owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when creation fails.
    pub async fn create_namespace(
        &self,
        creator: &Actor,
        owner: &ProjectId,
        visibility: Visibility,
    ) -> Result<NamespaceFixture, FixtureError> {
        let name = naming::namespace_name(owner, visibility);
        let request = ApiRequest::CreateNamespace {
            namespace: name.clone(),
            visibility,
            owner: Some(owner.clone()),
        };
        self.submit(creator, &request).await?;
        self.cleanup.push(CleanupAction::DeleteNamespace {
            namespace: name.clone(),
            credential: creator.credential().clone(),
        });
        Ok(NamespaceFixture {
            name,
            state: ResourceState::new(Some(owner.clone()), visibility),
        })
    }

    /// Creates public and private namespaces for every `(creator, owner)`
    /// pair, public ones first.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when any creation fails.
    pub async fn namespace_batch(
        &self,
        owners: &[(&Actor, &ProjectId)],
    ) -> Result<Vec<NamespaceFixture>, FixtureError> {
        let mut namespaces = Vec::with_capacity(owners.len() * Visibility::NAMESPACE.len());
        for visibility in Visibility::NAMESPACE {
            for (creator, owner) in owners {
                namespaces.push(self.create_namespace(creator, owner, visibility).await?);
            }
        }
        Ok(namespaces)
    }

    /// Creates the namespace's object.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when creation fails.
    pub async fn create_object(
        &self,
        creator: &Actor,
        namespace: &NamespaceFixture,
    ) -> Result<ChildFixture, FixtureError> {
        let name = naming::object_name(&namespace.name);
        let request = ApiRequest::CreateObject {
            namespace: namespace.name.clone(),
            name: name.clone(),
        };
        self.submit(creator, &request).await?;
        Ok(child(namespace, name))
    }

    /// Creates the namespace's property.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when creation fails.
    pub async fn create_property(
        &self,
        creator: &Actor,
        namespace: &NamespaceFixture,
    ) -> Result<ChildFixture, FixtureError> {
        let name = naming::property_name(&namespace.name);
        let request = ApiRequest::CreateProperty {
            namespace: namespace.name.clone(),
            name: name.clone(),
        };
        self.submit(creator, &request).await?;
        Ok(child(namespace, name))
    }

    /// Creates the namespace's single tag.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when creation fails.
    pub async fn create_tag(
        &self,
        creator: &Actor,
        namespace: &NamespaceFixture,
    ) -> Result<ChildFixture, FixtureError> {
        let name = naming::tag_name(&namespace.name);
        let request = ApiRequest::CreateTag {
            namespace: namespace.name.clone(),
            name: name.clone(),
        };
        self.submit(creator, &request).await?;
        Ok(child(namespace, name))
    }

    /// Creates the bulk tag set in one call.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when creation fails.
    pub async fn create_tags(
        &self,
        creator: &Actor,
        namespace: &NamespaceFixture,
    ) -> Result<Vec<ChildFixture>, FixtureError> {
        let names = naming::bulk_tag_names();
        let request = ApiRequest::CreateTags {
            namespace: namespace.name.clone(),
            names: names.clone(),
        };
        self.submit(creator, &request).await?;
        Ok(names.into_iter().map(|name| child(namespace, name)).collect())
    }

    /// Associates the namespace's resource type.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the association fails.
    pub async fn associate_resource_type(
        &self,
        creator: &Actor,
        namespace: &NamespaceFixture,
    ) -> Result<ChildFixture, FixtureError> {
        let name = naming::resource_type_name(&namespace.name);
        let request = ApiRequest::CreateResourceTypeAssociation {
            namespace: namespace.name.clone(),
            name: name.clone(),
        };
        self.submit(creator, &request).await?;
        Ok(child(namespace, name))
    }

    /// Sends a setup request and wraps failures.
    async fn submit(&self, actor: &Actor, request: &ApiRequest) -> Result<ApiResponse, FixtureError> {
        self.api.invoke(actor.credential(), request).await.map_err(|err| FixtureError::Request {
            operation: request.operation().to_string(),
            actor: actor.label().to_string(),
            message: err.to_string(),
        })
    }
}

/// Builds a child handle.
fn child(namespace: &NamespaceFixture, name: ResourceName) -> ChildFixture {
    ChildFixture {
        namespace: namespace.clone(),
        name,
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fixture setup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    /// A setup call failed.
    #[error("fixture {operation} by {actor} failed: {message}")]
    Request {
        /// Operation label.
        operation: String,
        /// Acting persona or ad hoc label.
        actor: String,
        /// Failure description.
        message: String,
    },
    /// A setup response was unusable.
    #[error("invalid fixture response: {0}")]
    InvalidResponse(String),
}
