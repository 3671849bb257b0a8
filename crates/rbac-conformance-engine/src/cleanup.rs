// crates/rbac-conformance-engine/src/cleanup.rs
// ============================================================================
// Module: Cleanup Stack
// Description: Deferred teardown of identities and fixtures.
// Purpose: Release everything a scenario acquired, whatever the scenario did.
// Dependencies: rbac-conformance-clients, rbac-conformance-core
// ============================================================================

//! ## Overview
//! Every acquisition registers a [`CleanupAction`] on a shared
//! [`CleanupStack`]. [`CleanupStack::run`] drains the stack in reverse order
//! of registration, attempts every action even after failures, and treats a
//! NotFound answer as "already gone" because trials may delete fixtures
//! themselves.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Mutex;
use std::sync::PoisonError;

use rbac_conformance_clients::ApiError;
use rbac_conformance_clients::ApiRequest;
use rbac_conformance_clients::Credential;
use rbac_conformance_clients::IdentityBackend;
use rbac_conformance_clients::IdentityError;
use rbac_conformance_clients::ImageApi;
use rbac_conformance_core::ImageId;
use rbac_conformance_core::NamespaceName;
use rbac_conformance_core::ProjectId;
use rbac_conformance_core::UserId;
use thiserror::Error;

// ============================================================================
// SECTION: Actions
// ============================================================================

/// One deferred teardown step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupAction {
    /// Delete an identity user (bootstrap credential).
    DeleteUser(UserId),
    /// Delete an identity project (bootstrap credential).
    DeleteProject(ProjectId),
    /// Delete an image with the creator's credential.
    DeleteImage {
        /// Image to delete.
        image: ImageId,
        /// Credential of the creator.
        credential: Credential,
    },
    /// Remove an image membership with the owner's credential.
    DeleteMember {
        /// Shared image.
        image: ImageId,
        /// Member project.
        member: ProjectId,
        /// Credential of the image owner.
        credential: Credential,
    },
    /// Delete a metadata-definition namespace with the creator's credential.
    DeleteNamespace {
        /// Namespace to delete.
        namespace: NamespaceName,
        /// Credential of the creator.
        credential: Credential,
    },
}

impl fmt::Display for CleanupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteUser(user) => write!(f, "user {user}"),
            Self::DeleteProject(project) => write!(f, "project {project}"),
            Self::DeleteImage { image, .. } => write!(f, "image {image}"),
            Self::DeleteMember { image, member, .. } => write!(f, "member {member} of image {image}"),
            Self::DeleteNamespace { namespace, .. } => write!(f, "namespace {namespace}"),
        }
    }
}

/// How a single action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settled {
    /// The resource was removed.
    Removed,
    /// The resource no longer existed.
    AlreadyGone,
}

// ============================================================================
// SECTION: Stack
// ============================================================================

/// Reverse-order teardown registry shared by the registry and fixtures.
#[derive(Debug, Default)]
pub struct CleanupStack {
    /// Registered actions in acquisition order.
    actions: Mutex<Vec<CleanupAction>>,
}

impl CleanupStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action to run at teardown.
    pub fn push(&self, action: CleanupAction) {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner).push(action);
    }

    /// Returns the number of pending actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every pending action in reverse order.
    ///
    /// Identity actions use `admin`; image-service actions use the
    /// credential recorded with the action.
    pub async fn run(
        &self,
        identity: &dyn IdentityBackend,
        api: &dyn ImageApi,
        admin: Option<&Credential>,
    ) -> CleanupReport {
        let actions = std::mem::take(
            &mut *self.actions.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let mut report = CleanupReport::default();
        for action in actions.into_iter().rev() {
            match settle(&action, identity, api, admin).await {
                Ok(Settled::Removed) => report.removed += 1,
                Ok(Settled::AlreadyGone) => report.already_gone += 1,
                Err(message) => report.failures.push(CleanupError {
                    action: action.to_string(),
                    message,
                }),
            }
        }
        report
    }
}

/// Executes one action and folds NotFound into success.
async fn settle(
    action: &CleanupAction,
    identity: &dyn IdentityBackend,
    api: &dyn ImageApi,
    admin: Option<&Credential>,
) -> Result<Settled, String> {
    match action {
        CleanupAction::DeleteUser(user) => {
            let admin = admin.ok_or_else(|| "no bootstrap credential".to_string())?;
            identity_settled(identity.delete_user(admin, user).await)
        }
        CleanupAction::DeleteProject(project) => {
            let admin = admin.ok_or_else(|| "no bootstrap credential".to_string())?;
            identity_settled(identity.delete_project(admin, project).await)
        }
        CleanupAction::DeleteImage { image, credential } => {
            let request = ApiRequest::DeleteImage {
                image: image.clone(),
            };
            api_settled(api.invoke(credential, &request).await.map(|_| ()))
        }
        CleanupAction::DeleteMember { image, member, credential } => {
            let request = ApiRequest::DeleteMember {
                image: image.clone(),
                member: member.clone(),
            };
            api_settled(api.invoke(credential, &request).await.map(|_| ()))
        }
        CleanupAction::DeleteNamespace { namespace, credential } => {
            let request = ApiRequest::DeleteNamespace {
                namespace: namespace.clone(),
            };
            api_settled(api.invoke(credential, &request).await.map(|_| ()))
        }
    }
}

/// Classifies an identity deletion result.
fn identity_settled(result: Result<(), IdentityError>) -> Result<Settled, String> {
    match result {
        Ok(()) => Ok(Settled::Removed),
        Err(IdentityError::NotFound(_)) => Ok(Settled::AlreadyGone),
        Err(err) => Err(err.to_string()),
    }
}

/// Classifies an image-service deletion result.
fn api_settled(result: Result<(), ApiError>) -> Result<Settled, String> {
    match result {
        Ok(()) => Ok(Settled::Removed),
        Err(ApiError::NotFound) => Ok(Settled::AlreadyGone),
        Err(err) => Err(err.to_string()),
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Summary of one teardown pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Actions that removed something.
    pub removed: usize,
    /// Actions whose target was already gone.
    pub already_gone: usize,
    /// Actions that failed.
    pub failures: Vec<CleanupError>,
}

impl CleanupReport {
    /// Returns true when every action settled.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A teardown action that did not settle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cleanup of {action} failed: {message}")]
pub struct CleanupError {
    /// Description of the action.
    pub action: String,
    /// Failure description.
    pub message: String,
}
