// crates/rbac-conformance-engine/src/registry.rs
// ============================================================================
// Module: Persona Registry
// Description: Provisions personas and mints ad hoc member actors.
// Purpose: Map persona names to authenticated, project-scoped actors.
// Dependencies: rbac-conformance-clients, rbac-conformance-config
// ============================================================================

//! ## Overview
//! [`PersonaRegistry::provision`] authenticates the bootstrap administrator,
//! creates one project per slot the declared personas need, then one user
//! per persona with the matching role grant and a scoped token. Every
//! created entity is registered on the [`CleanupStack`]. Provisioning fails
//! fast: there is no partially provisioned registry.
//!
//! Lookups of undeclared personas fail with
//! [`RegistryError::PersonaNotRegistered`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use rbac_conformance_clients::Credential;
use rbac_conformance_clients::IdentityBackend;
use rbac_conformance_clients::IdentityError;
use rbac_conformance_clients::PasswordAuth;
use rbac_conformance_clients::TokenScope;
use rbac_conformance_config::ConformanceConfig;
use rbac_conformance_core::ActorView;
use rbac_conformance_core::Persona;
use rbac_conformance_core::PersonaScope;
use rbac_conformance_core::ProjectId;
use rbac_conformance_core::ProjectSlot;
use rbac_conformance_core::RoleId;
use rbac_conformance_core::RoleKind;
use thiserror::Error;

use crate::cleanup::CleanupAction;
use crate::cleanup::CleanupStack;
use crate::naming::identity_name;
use crate::naming::random_password;

// ============================================================================
// SECTION: Actors
// ============================================================================

/// An authenticated identity acting with one role and scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Persona name or ad hoc label.
    label: String,
    /// Persona, absent for ad hoc actors.
    persona: Option<Persona>,
    /// Role held by the actor.
    role: RoleKind,
    /// Scoped credential.
    credential: Credential,
}

impl Actor {
    /// Builds an actor from its parts.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        persona: Option<Persona>,
        role: RoleKind,
        credential: Credential,
    ) -> Self {
        Self {
            label: label.into(),
            persona,
            role,
            credential,
        }
    }

    /// Persona name or ad hoc label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Persona, when declared.
    #[must_use]
    pub const fn persona(&self) -> Option<Persona> {
        self.persona
    }

    /// Role held by the actor.
    #[must_use]
    pub const fn role(&self) -> RoleKind {
        self.role
    }

    /// Scoped credential.
    #[must_use]
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Project the actor is scoped to; `None` for system scope.
    #[must_use]
    pub const fn project(&self) -> Option<&ProjectId> {
        self.credential.project_id.as_ref()
    }

    /// Oracle view of the actor.
    #[must_use]
    pub fn view(&self) -> ActorView {
        ActorView::new(self.role, self.credential.project_id.clone())
    }
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Role names as known to the identity backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleNames {
    /// Administrator role (project and system scope).
    pub admin: String,
    /// Member role.
    pub member: String,
    /// Reader role.
    pub reader: String,
}

impl RoleNames {
    /// Backend role name for a role kind.
    #[must_use]
    pub fn name_of(&self, role: RoleKind) -> &str {
        match role {
            RoleKind::Admin | RoleKind::SystemAdmin => &self.admin,
            RoleKind::Member => &self.member,
            RoleKind::Reader => &self.reader,
        }
    }
}

/// Inputs for provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Bootstrap administrator login.
    pub bootstrap: PasswordAuth,
    /// Project the bootstrap administrator authenticates into.
    pub bootstrap_project: String,
    /// Backend role names.
    pub roles: RoleNames,
    /// Scope per persona; personas not listed use their default scope.
    pub scopes: BTreeMap<Persona, PersonaScope>,
    /// Prefix of generated user and project names.
    pub prefix: String,
}

impl RegistrySettings {
    /// Derives settings from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &ConformanceConfig) -> Self {
        let identity = &config.identity;
        Self {
            bootstrap: PasswordAuth {
                username: identity.username.clone(),
                password: identity.password.clone(),
                domain_id: identity.domain_id.clone(),
            },
            bootstrap_project: identity.project_name.clone(),
            roles: RoleNames {
                admin: identity.admin_role.clone(),
                member: identity.member_role.clone(),
                reader: identity.reader_role.clone(),
            },
            scopes: Persona::ALL
                .into_iter()
                .map(|persona| (persona, config.personas.scope_for(persona)))
                .collect(),
            prefix: "rbac".to_string(),
        }
    }

    /// Scope a persona is provisioned with.
    #[must_use]
    pub fn scope_for(&self, persona: Persona) -> PersonaScope {
        self.scopes.get(&persona).copied().unwrap_or_else(|| persona.default_scope())
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Persona name to actor mapping for one scenario.
#[derive(Debug)]
pub struct PersonaRegistry {
    /// Bootstrap administrator credential.
    bootstrap: Credential,
    /// Domain of provisioned users and projects.
    domain_id: String,
    /// Backend member role, granted to ad hoc actors.
    member_role: RoleId,
    /// Prefix of generated names.
    prefix: String,
    /// Provisioned personas.
    actors: BTreeMap<Persona, Actor>,
    /// Provisioned project per slot.
    projects: BTreeMap<ProjectSlot, ProjectId>,
    /// Ad hoc actors minted so far.
    minted: AtomicUsize,
}

impl PersonaRegistry {
    /// Provisions the declared personas.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on the first identity failure.
    pub async fn provision(
        identity: &dyn IdentityBackend,
        settings: &RegistrySettings,
        personas: &[Persona],
        cleanup: &CleanupStack,
    ) -> Result<Self, RegistryError> {
        let bootstrap_scope = TokenScope::ProjectName {
            name: settings.bootstrap_project.clone(),
            domain_id: settings.bootstrap.domain_id.clone(),
        };
        let bootstrap = identity
            .issue_token(&settings.bootstrap, &bootstrap_scope)
            .await
            .map_err(|err| RegistryError::Bootstrap(err.to_string()))?;
        let mut role_ids: BTreeMap<RoleKind, RoleId> = BTreeMap::new();
        let member_role = find_role(identity, &bootstrap, &settings.roles.member).await?;
        role_ids.insert(RoleKind::Member, member_role.clone());
        let mut registry = Self {
            domain_id: settings.bootstrap.domain_id.clone(),
            bootstrap,
            member_role,
            prefix: settings.prefix.clone(),
            actors: BTreeMap::new(),
            projects: BTreeMap::new(),
            minted: AtomicUsize::new(0),
        };
        for persona in personas {
            if registry.actors.contains_key(persona) {
                continue;
            }
            let role = persona.role();
            let role_id = match role_ids.get(&role) {
                Some(role_id) => role_id.clone(),
                None => {
                    let role_id =
                        find_role(identity, &registry.bootstrap, settings.roles.name_of(role))
                            .await?;
                    role_ids.insert(role, role_id.clone());
                    role_id
                }
            };
            let scope = settings.scope_for(*persona);
            let project = match scope {
                PersonaScope::Project(slot) => {
                    Some(registry.ensure_project(identity, slot, cleanup).await?)
                }
                PersonaScope::System => None,
            };
            let actor = registry
                .create_actor(identity, persona.as_str(), role, &role_id, project, cleanup)
                .await
                .map_err(|err| RegistryError::Provision {
                    persona: persona.to_string(),
                    message: err.to_string(),
                })?;
            let actor = Actor {
                persona: Some(*persona),
                ..actor
            };
            registry.actors.insert(*persona, actor);
        }
        Ok(registry)
    }

    /// Returns the actor provisioned for a persona.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PersonaNotRegistered`] for undeclared personas.
    pub fn actor(&self, persona: Persona) -> Result<&Actor, RegistryError> {
        self.actors
            .get(&persona)
            .ok_or_else(|| RegistryError::PersonaNotRegistered(persona.to_string()))
    }

    /// Returns the project provisioned for a slot.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SlotNotProvisioned`] when no persona used the slot.
    pub fn project(&self, slot: ProjectSlot) -> Result<&ProjectId, RegistryError> {
        self.projects
            .get(&slot)
            .ok_or_else(|| RegistryError::SlotNotProvisioned(slot.as_str().to_string()))
    }

    /// Returns the bootstrap administrator credential.
    #[must_use]
    pub const fn bootstrap(&self) -> &Credential {
        &self.bootstrap
    }

    /// Returns every provisioned persona.
    pub fn personas(&self) -> impl Iterator<Item = Persona> + '_ {
        self.actors.keys().copied()
    }

    /// Mints an actor with the member role outside the declared personas.
    ///
    /// A fresh project is created when `project` is `None`. The user (and a
    /// fresh project) are registered for cleanup.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AdHoc`] when any identity call fails.
    pub async fn mint_member(
        &self,
        identity: &dyn IdentityBackend,
        project: Option<&ProjectId>,
        cleanup: &CleanupStack,
    ) -> Result<Actor, RegistryError> {
        let index = self.minted.fetch_add(1, Ordering::Relaxed);
        let label = format!("ad_hoc_member_{index}");
        let project = match project {
            Some(project) => project.clone(),
            None => self
                .create_project(identity, &label, cleanup)
                .await
                .map_err(|err| RegistryError::AdHoc(err.to_string()))?,
        };
        self.create_actor(identity, &label, RoleKind::Member, &self.member_role, Some(project), cleanup)
            .await
            .map_err(|err| RegistryError::AdHoc(err.to_string()))
    }

    /// Returns the slot's project, creating it on first use.
    async fn ensure_project(
        &mut self,
        identity: &dyn IdentityBackend,
        slot: ProjectSlot,
        cleanup: &CleanupStack,
    ) -> Result<ProjectId, RegistryError> {
        if let Some(project) = self.projects.get(&slot) {
            return Ok(project.clone());
        }
        let project = self
            .create_project(identity, slot.as_str(), cleanup)
            .await
            .map_err(|err| RegistryError::Provision {
                persona: format!("slot {}", slot.as_str()),
                message: err.to_string(),
            })?;
        self.projects.insert(slot, project.clone());
        Ok(project)
    }

    /// Creates a project and registers its deletion.
    async fn create_project(
        &self,
        identity: &dyn IdentityBackend,
        label: &str,
        cleanup: &CleanupStack,
    ) -> Result<ProjectId, IdentityError> {
        let name = identity_name(&self.prefix, label);
        let project = identity.create_project(&self.bootstrap, &name, &self.domain_id).await?;
        cleanup.push(CleanupAction::DeleteProject(project.clone()));
        Ok(project)
    }

    /// Creates a user, grants the role, and issues its scoped token.
    async fn create_actor(
        &self,
        identity: &dyn IdentityBackend,
        label: &str,
        role: RoleKind,
        role_id: &RoleId,
        project: Option<ProjectId>,
        cleanup: &CleanupStack,
    ) -> Result<Actor, IdentityError> {
        let auth = PasswordAuth {
            username: identity_name(&self.prefix, label),
            password: random_password(),
            domain_id: self.domain_id.clone(),
        };
        let user = identity.create_user(&self.bootstrap, &auth, project.as_ref()).await?;
        cleanup.push(CleanupAction::DeleteUser(user.clone()));
        let scope = match project {
            Some(project) => {
                identity.grant_project_role(&self.bootstrap, &project, &user, role_id).await?;
                TokenScope::Project(project)
            }
            None => {
                identity.grant_system_role(&self.bootstrap, &user, role_id).await?;
                TokenScope::System
            }
        };
        let credential = identity.issue_token(&auth, &scope).await?;
        Ok(Actor::new(label, None, role, credential))
    }
}

/// Resolves a role name to its identifier.
async fn find_role(
    identity: &dyn IdentityBackend,
    bootstrap: &Credential,
    name: &str,
) -> Result<RoleId, RegistryError> {
    identity
        .find_role(bootstrap, name)
        .await
        .map_err(|err| RegistryError::Bootstrap(format!("role {name}: {err}")))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Persona registry failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Bootstrap authentication or role lookup failed.
    #[error("bootstrap failed: {0}")]
    Bootstrap(String),
    /// Provisioning a persona failed.
    #[error("provisioning {persona} failed: {message}")]
    Provision {
        /// Persona or slot being provisioned.
        persona: String,
        /// Failure description.
        message: String,
    },
    /// The persona was not declared for the scenario.
    #[error("persona not registered: {0}")]
    PersonaNotRegistered(String),
    /// No declared persona uses the slot.
    #[error("project slot not provisioned: {0}")]
    SlotNotProvisioned(String),
    /// Minting an ad hoc actor failed.
    #[error("ad hoc actor failed: {0}")]
    AdHoc(String),
}
