// crates/rbac-conformance-engine/src/matrix/namespaces.rs
// ============================================================================
// Module: Namespace Matrix
// Description: Create/get/list/update/delete of metadef namespaces.
// Purpose: Cover the namespace family over owner x visibility fixtures.
// Dependencies: rbac-conformance-clients, rbac-conformance-core
// ============================================================================

use rbac_conformance_clients::ApiRequest;
use rbac_conformance_core::ListedItem;
use rbac_conformance_core::Persona;
use rbac_conformance_core::ProjectId;
use rbac_conformance_core::ResourceFamily;
use rbac_conformance_core::Subject;
use rbac_conformance_core::Visibility;

use super::MatrixReport;
use super::namespace_batch;
use super::scenario_name;
use crate::cleanup::CleanupAction;
use crate::harness::ScenarioContext;
use crate::harness::ScenarioError;
use crate::naming;
use crate::runner::DELETED_RULE;
use crate::runner::ListingCandidate;

/// Runs the namespace matrix as one persona.
///
/// # Errors
///
/// Returns [`ScenarioError`] when fixtures or personas are unavailable.
pub async fn namespaces_matrix(
    ctx: &ScenarioContext,
    persona: Persona,
) -> Result<MatrixReport, ScenarioError> {
    let actor = ctx.actor(persona)?;
    let admin = ctx.actor(Persona::ProjectAdmin)?;
    let runner = ctx.runner();
    let mut report = MatrixReport::new(scenario_name(ResourceFamily::Namespace, persona));

    let name_owner = actor.project().cloned().unwrap_or_else(|| ProjectId::new("system"));
    for visibility in Visibility::NAMESPACE {
        let namespace = naming::namespace_name(&name_owner, visibility);
        let request = ApiRequest::CreateNamespace {
            namespace: namespace.clone(),
            visibility,
            owner: None,
        };
        let created = report
            .record(runner.run(actor, &request, Subject::Create(visibility)).await)
            .is_some_and(|result| result.expectation.outcome.is_success());
        if created {
            ctx.cleanup().push(CleanupAction::DeleteNamespace {
                namespace,
                credential: actor.credential().clone(),
            });
        }
    }

    for namespace in namespace_batch(ctx, persona).await? {
        let request = ApiRequest::GetNamespace {
            namespace: namespace.name.clone(),
        };
        report.record(runner.run(actor, &request, Subject::Resource(&namespace.state)).await);
    }

    let listed = namespace_batch(ctx, persona).await?;
    let candidates: Vec<ListingCandidate<'_>> = listed
        .iter()
        .map(|namespace| ListingCandidate {
            id: namespace.name.as_str(),
            item: ListedItem::Resource(&namespace.state),
        })
        .collect();
    report.record_listing(
        runner.run_listing(actor, &ApiRequest::ListNamespaces, Subject::Collection, &candidates).await,
    );

    for namespace in namespace_batch(ctx, persona).await? {
        let request = ApiRequest::UpdateNamespace {
            namespace: namespace.name.clone(),
            visibility: namespace.state.visibility,
            description: "updated by rbac conformance".to_string(),
        };
        report.record(runner.run(actor, &request, Subject::Resource(&namespace.state)).await);
    }

    for namespace in namespace_batch(ctx, persona).await? {
        let request = ApiRequest::DeleteNamespace {
            namespace: namespace.name.clone(),
        };
        let deleted = report
            .record(runner.run(actor, &request, Subject::Resource(&namespace.state)).await)
            .is_some_and(|result| result.expectation.outcome.is_success());
        if deleted {
            let lookup = ApiRequest::GetNamespace {
                namespace: namespace.name.clone(),
            };
            report.record(runner.confirm_absent(admin, &lookup, DELETED_RULE).await);
        }
    }
    Ok(report)
}
