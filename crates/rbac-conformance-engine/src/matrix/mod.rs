// crates/rbac-conformance-engine/src/matrix/mod.rs
// ============================================================================
// Module: Scenario Matrices
// Description: Persona x operation x fixture combinations per family.
// Purpose: Drive every trial of a family through the runner.
// Dependencies: rbac-conformance-clients, rbac-conformance-core
// ============================================================================

//! ## Overview
//! One matrix per resource family. Every operation gets fresh fixtures, so
//! a destructive trial never changes what a sibling trial sees. Trial
//! failures are collected into a [`MatrixReport`] and never abort the
//! matrix; fixture failures abort it with a
//! [`ScenarioError`](crate::harness::ScenarioError).

// ============================================================================
// SECTION: Imports
// ============================================================================

use rbac_conformance_core::Persona;
use rbac_conformance_core::ProjectId;
use rbac_conformance_core::ResourceFamily;
use rbac_conformance_core::RoleKind;

use crate::fixtures::NamespaceFixture;
use crate::harness::ScenarioContext;
use crate::harness::ScenarioError;
use crate::registry::Actor;
use crate::runner::TrialFailure;
use crate::runner::TrialResult;

mod children;
mod images;
mod members;
mod namespaces;
mod resource_types;
mod tags;

pub use children::ChildKind;
pub use children::children_matrix;
pub use images::images_matrix;
pub use members::members_matrix;
pub use namespaces::namespaces_matrix;
pub use resource_types::resource_types_matrix;
pub use tags::tags_matrix;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Collected trial results of one matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixReport {
    /// Scenario name.
    pub scenario: String,
    /// Trials run (a list trial counts once).
    pub trials: usize,
    /// Trials that matched.
    pub passed: usize,
    /// Every mismatch, in execution order.
    pub failures: Vec<TrialFailure>,
}

impl MatrixReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            ..Self::default()
        }
    }

    /// Records a single-outcome trial; returns the result on a match.
    pub fn record(&mut self, result: Result<TrialResult, TrialFailure>) -> Option<TrialResult> {
        self.trials += 1;
        match result {
            Ok(result) => {
                self.passed += 1;
                Some(result)
            }
            Err(failure) => {
                self.failures.push(failure);
                None
            }
        }
    }

    /// Records a list trial; returns the result when every item matched.
    pub fn record_listing(
        &mut self,
        result: Result<TrialResult, Vec<TrialFailure>>,
    ) -> Option<TrialResult> {
        self.trials += 1;
        match result {
            Ok(result) => {
                self.passed += 1;
                Some(result)
            }
            Err(failures) => {
                self.failures.extend(failures);
                None
            }
        }
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: Self) {
        self.trials += other.trials;
        self.passed += other.passed;
        self.failures.extend(other.failures);
    }

    /// Returns true when every trial matched.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Scenario name for a family and persona.
#[must_use]
pub fn scenario_name(family: ResourceFamily, persona: Persona) -> String {
    format!("{family}_{persona}")
}

/// Personas a family matrix needs provisioned, persona under test first.
#[must_use]
pub fn scenario_personas(family: ResourceFamily, persona: Persona) -> Vec<Persona> {
    let wanted = if family.is_metadef() {
        vec![persona, Persona::ProjectAdmin, persona.alt_counterpart(), Persona::ProjectAltAdmin]
    } else {
        vec![persona, Persona::ProjectAdmin]
    };
    let mut personas = Vec::with_capacity(wanted.len());
    for candidate in wanted {
        if !personas.contains(&candidate) {
            personas.push(candidate);
        }
    }
    personas
}

/// Runs the matrix for one family as one persona.
///
/// # Errors
///
/// Returns [`ScenarioError`] when fixtures or personas are unavailable.
pub async fn family_matrix(
    ctx: &ScenarioContext,
    family: ResourceFamily,
    persona: Persona,
) -> Result<MatrixReport, ScenarioError> {
    match family {
        ResourceFamily::Image => images_matrix(ctx, persona).await,
        ResourceFamily::ImageMember => members_matrix(ctx, persona).await,
        ResourceFamily::Namespace => namespaces_matrix(ctx, persona).await,
        ResourceFamily::NamespaceObject => children_matrix(ctx, persona, ChildKind::Object).await,
        ResourceFamily::NamespaceProperty => {
            children_matrix(ctx, persona, ChildKind::Property).await
        }
        ResourceFamily::NamespaceTag => tags_matrix(ctx, persona).await,
        ResourceFamily::ResourceTypeAssociation | ResourceFamily::ResourceType => {
            resource_types_matrix(ctx, persona).await
        }
    }
}

// ============================================================================
// SECTION: Metadef Fixtures
// ============================================================================

/// Namespace owners for a persona: its own project and its counterpart's.
///
/// Project-less personas fall back to the administrators' projects.
fn namespace_owners(ctx: &ScenarioContext, persona: Persona) -> Result<[ProjectId; 2], ScenarioError> {
    let own = match ctx.actor(persona)?.project() {
        Some(project) => project,
        None => owner_project(ctx.actor(Persona::ProjectAdmin)?)?,
    };
    let alt = match ctx.actor(persona.alt_counterpart())?.project() {
        Some(project) => project,
        None => owner_project(ctx.actor(Persona::ProjectAltAdmin)?)?,
    };
    Ok([own.clone(), alt.clone()])
}

/// Project of an administrator persona.
fn owner_project(actor: &Actor) -> Result<&ProjectId, ScenarioError> {
    actor.project().ok_or_else(|| {
        ScenarioError::Setup(format!("{} has no project to own namespaces", actor.label()))
    })
}

/// Administrator acting inside `owner`.
///
/// Namespaces are never created or removed across projects, so a missing
/// in-project administrator is a setup error.
fn admin_for<'a>(ctx: &'a ScenarioContext, owner: &ProjectId) -> Result<&'a Actor, ScenarioError> {
    for persona in ctx.registry().personas() {
        let actor = ctx.actor(persona)?;
        if actor.role() == RoleKind::Admin && actor.project() == Some(owner) {
            return Ok(actor);
        }
    }
    Err(ScenarioError::Setup(format!("no administrator provisioned in project {owner}")))
}

/// Administrator acting inside the namespace's owning project.
fn namespace_admin<'a>(
    ctx: &'a ScenarioContext,
    namespace: &NamespaceFixture,
) -> Result<&'a Actor, ScenarioError> {
    let owner = namespace.state.owner.as_ref().ok_or_else(|| {
        ScenarioError::Setup(format!("namespace {} has no owner", namespace.name))
    })?;
    admin_for(ctx, owner)
}

/// Public and private namespaces for both owners, each created by an
/// administrator of its owning project.
async fn namespace_batch(
    ctx: &ScenarioContext,
    persona: Persona,
) -> Result<Vec<NamespaceFixture>, ScenarioError> {
    let [own, alt] = namespace_owners(ctx, persona)?;
    let owners = [(admin_for(ctx, &own)?, &own), (admin_for(ctx, &alt)?, &alt)];
    Ok(ctx.fixtures().namespace_batch(&owners).await?)
}
