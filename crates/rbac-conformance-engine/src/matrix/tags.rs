// crates/rbac-conformance-engine/src/matrix/tags.rs
// ============================================================================
// Module: Namespace Tag Matrix
// Description: Single-tag operations plus bulk create and delete-all.
// Purpose: Cover the tag family, including bulk calls.
// Dependencies: rbac-conformance-clients, rbac-conformance-core
// ============================================================================

//! ## Overview
//! Single tags reuse the child matrix. Bulk creation writes `tag1..tag3`;
//! a successful delete-all must leave the tag list empty.

use rbac_conformance_clients::ApiRequest;
use rbac_conformance_core::Persona;
use rbac_conformance_core::Subject;

use super::ChildKind;
use super::MatrixReport;
use super::namespace_admin;
use super::children_matrix;
use super::namespace_batch;
use crate::harness::ScenarioContext;
use crate::harness::ScenarioError;
use crate::naming;

/// Runs the tag matrix as one persona.
///
/// # Errors
///
/// Returns [`ScenarioError`] when fixtures or personas are unavailable.
pub async fn tags_matrix(
    ctx: &ScenarioContext,
    persona: Persona,
) -> Result<MatrixReport, ScenarioError> {
    let mut report = children_matrix(ctx, persona, ChildKind::Tag).await?;
    let actor = ctx.actor(persona)?;
    let runner = ctx.runner();

    for namespace in namespace_batch(ctx, persona).await? {
        let request = ApiRequest::CreateTags {
            namespace: namespace.name.clone(),
            names: naming::bulk_tag_names(),
        };
        report.record(runner.run(actor, &request, Subject::Resource(&namespace.state)).await);
    }

    for namespace in namespace_batch(ctx, persona).await? {
        let admin = namespace_admin(ctx, &namespace)?;
        ctx.fixtures().create_tags(admin, &namespace).await?;
        let request = ApiRequest::DeleteTags {
            namespace: namespace.name.clone(),
        };
        let emptied = report
            .record(runner.run(actor, &request, Subject::Resource(&namespace.state)).await)
            .is_some_and(|result| result.expectation.outcome.is_success());
        if emptied {
            let listing = ApiRequest::ListTags {
                namespace: namespace.name.clone(),
            };
            report.record_listing(runner.confirm_empty(admin, &listing, "tags").await);
        }
    }
    Ok(report)
}
