// crates/rbac-conformance-engine/src/matrix/resource_types.rs
// ============================================================================
// Module: Resource Type Matrix
// Description: Resource type associations and the global catalog.
// Purpose: Cover associate/list/dissociate and catalog listing.
// Dependencies: rbac-conformance-clients, rbac-conformance-core
// ============================================================================

use rbac_conformance_clients::ApiRequest;
use rbac_conformance_core::Persona;
use rbac_conformance_core::ResourceFamily;
use rbac_conformance_core::Subject;

use super::MatrixReport;
use super::namespace_admin;
use super::namespace_batch;
use super::scenario_name;
use crate::fixtures::ChildFixture;
use crate::harness::ScenarioContext;
use crate::harness::ScenarioError;
use crate::naming;

/// List key of association responses.
const ASSOCIATIONS_KEY: &str = "resource_type_associations";

/// Runs the resource type matrix as one persona.
///
/// # Errors
///
/// Returns [`ScenarioError`] when fixtures or personas are unavailable.
pub async fn resource_types_matrix(
    ctx: &ScenarioContext,
    persona: Persona,
) -> Result<MatrixReport, ScenarioError> {
    let actor = ctx.actor(persona)?;
    let runner = ctx.runner();
    let mut report = MatrixReport::new(scenario_name(ResourceFamily::ResourceTypeAssociation, persona));

    for namespace in namespace_batch(ctx, persona).await? {
        let request = ApiRequest::CreateResourceTypeAssociation {
            namespace: namespace.name.clone(),
            name: naming::resource_type_name(&namespace.name),
        };
        report.record(runner.run(actor, &request, Subject::Resource(&namespace.state)).await);
    }

    for association in associations(ctx, persona).await? {
        let request = ApiRequest::ListResourceTypeAssociations {
            namespace: association.namespace.name.clone(),
        };
        report.record(
            runner.run(actor, &request, Subject::Resource(&association.namespace.state)).await,
        );
    }

    for association in associations(ctx, persona).await? {
        let request = ApiRequest::DeleteResourceTypeAssociation {
            namespace: association.namespace.name.clone(),
            name: association.name.clone(),
        };
        let removed = report
            .record(
                runner.run(actor, &request, Subject::Resource(&association.namespace.state)).await,
            )
            .is_some_and(|result| result.expectation.outcome.is_success());
        if removed {
            let admin = namespace_admin(ctx, &association.namespace)?;
            let listing = ApiRequest::ListResourceTypeAssociations {
                namespace: association.namespace.name.clone(),
            };
            report.record_listing(runner.confirm_empty(admin, &listing, ASSOCIATIONS_KEY).await);
        }
    }

    report.record(runner.run(actor, &ApiRequest::ListResourceTypes, Subject::Collection).await);
    Ok(report)
}

/// Fresh namespaces, each associated with its own resource type.
async fn associations(
    ctx: &ScenarioContext,
    persona: Persona,
) -> Result<Vec<ChildFixture>, ScenarioError> {
    let mut created = Vec::new();
    for namespace in namespace_batch(ctx, persona).await? {
        let admin = namespace_admin(ctx, &namespace)?;
        created.push(ctx.fixtures().associate_resource_type(admin, &namespace).await?);
    }
    Ok(created)
}
