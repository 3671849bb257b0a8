// crates/rbac-conformance-engine/src/matrix/members.rs
// ============================================================================
// Module: Image Member Matrix
// Description: Share grant, lookup, listing, response and revocation.
// Purpose: Cover the image membership family from both sides of a share.
// Dependencies: rbac-conformance-clients, rbac-conformance-core
// ============================================================================

//! ## Overview
//! Each operation gets a fresh set: a shared image owned by the persona's
//! project and shared with an unrelated project, an unshared private image
//! of the same owner, and a foreign shared image shared with the persona's
//! project. Project-less personas skip the cases that address their own
//! membership.

use rbac_conformance_clients::ApiRequest;
use rbac_conformance_core::ListedItem;
use rbac_conformance_core::MemberStatus;
use rbac_conformance_core::Persona;
use rbac_conformance_core::ProjectId;
use rbac_conformance_core::ResourceFamily;
use rbac_conformance_core::Subject;
use rbac_conformance_core::Visibility;

use super::MatrixReport;
use super::scenario_name;
use crate::cleanup::CleanupAction;
use crate::fixtures::ImageFixture;
use crate::harness::ScenarioContext;
use crate::harness::ScenarioError;
use crate::registry::Actor;
use crate::runner::ListingCandidate;

/// Fresh fixture set for one operation, owned by a member of the persona's
/// project and by a member of an unrelated one.
struct MemberSet {
    /// Unrelated project `own` is shared with.
    other: ProjectId,
    /// Shared image of the persona's project.
    own: ImageFixture,
    /// Unshared private image of the persona's project.
    own_private: ImageFixture,
    /// Foreign shared image, shared with the persona's project when it has one.
    foreign: ImageFixture,
}

impl MemberSet {
    /// Creates the set; the shares are only established when `shared`.
    async fn create(
        ctx: &ScenarioContext,
        actor: &Actor,
        shared: bool,
    ) -> Result<Self, ScenarioError> {
        let fixtures = ctx.fixtures();
        let owner = ctx.mint_member(actor.project()).await?;
        let foreign_owner = ctx.mint_member(None).await?;
        let other = project_of(&ctx.mint_member(None).await?)?;
        let mut own = fixtures.create_image(&owner, Visibility::Shared).await?;
        let own_private = fixtures.create_image(&owner, Visibility::Private).await?;
        let mut foreign = fixtures.create_image(&foreign_owner, Visibility::Shared).await?;
        if shared {
            fixtures.share(&owner, &mut own, &other).await?;
            if let Some(project) = actor.project() {
                fixtures.share(&foreign_owner, &mut foreign, project).await?;
            }
        }
        Ok(Self {
            other,
            own,
            own_private,
            foreign,
        })
    }

    /// Existing memberships the persona can address: the unrelated share of
    /// `own` and, with a project, its own share of `foreign`.
    fn memberships<'a>(&'a self, actor: &'a Actor) -> Vec<(&'a ImageFixture, &'a ProjectId)> {
        let mut cases = vec![(&self.own, &self.other)];
        if let Some(project) = actor.project() {
            cases.push((&self.foreign, project));
        }
        cases
    }
}

/// Project of a minted actor.
fn project_of(actor: &Actor) -> Result<ProjectId, ScenarioError> {
    actor
        .project()
        .cloned()
        .ok_or_else(|| ScenarioError::Setup(format!("{} has no project", actor.label())))
}

/// Runs the image member matrix as one persona.
///
/// # Errors
///
/// Returns [`ScenarioError`] when fixtures or personas are unavailable.
pub async fn members_matrix(
    ctx: &ScenarioContext,
    persona: Persona,
) -> Result<MatrixReport, ScenarioError> {
    let actor = ctx.actor(persona)?;
    let runner = ctx.runner();
    let mut report = MatrixReport::new(scenario_name(ResourceFamily::ImageMember, persona));

    let set = MemberSet::create(ctx, actor, false).await?;
    let mut grants = vec![(&set.own, &set.other), (&set.own_private, &set.other)];
    if let Some(project) = actor.project() {
        grants.push((&set.foreign, project));
    }
    for (image, member) in grants {
        let request = ApiRequest::AddMember {
            image: image.id.clone(),
            member: member.clone(),
        };
        let subject = Subject::Membership {
            image: &image.state,
            member,
        };
        let granted = report
            .record(runner.run(actor, &request, subject).await)
            .is_some_and(|result| result.expectation.outcome.is_success());
        if granted {
            ctx.cleanup().push(CleanupAction::DeleteMember {
                image: image.id.clone(),
                member: member.clone(),
                credential: image.creator.clone(),
            });
        }
    }

    let set = MemberSet::create(ctx, actor, true).await?;
    for (image, member) in set.memberships(actor) {
        let request = ApiRequest::GetMember {
            image: image.id.clone(),
            member: member.clone(),
        };
        let subject = Subject::Membership {
            image: &image.state,
            member,
        };
        report.record(runner.run(actor, &request, subject).await);
    }

    let set = MemberSet::create(ctx, actor, true).await?;
    for image in [&set.own, &set.foreign] {
        let candidates: Vec<ListingCandidate<'_>> = image
            .state
            .memberships
            .keys()
            .map(|member| ListingCandidate {
                id: member.as_str(),
                item: ListedItem::Membership {
                    image: &image.state,
                    member,
                },
            })
            .collect();
        let request = ApiRequest::ListMembers {
            image: image.id.clone(),
        };
        report.record_listing(
            runner.run_listing(actor, &request, Subject::Resource(&image.state), &candidates).await,
        );
    }

    for status in [MemberStatus::Accepted, MemberStatus::Rejected] {
        let set = MemberSet::create(ctx, actor, true).await?;
        for (image, member) in set.memberships(actor) {
            let request = ApiRequest::UpdateMember {
                image: image.id.clone(),
                member: member.clone(),
                status,
            };
            let subject = Subject::Membership {
                image: &image.state,
                member,
            };
            report.record(runner.run(actor, &request, subject).await);
        }
    }

    let set = MemberSet::create(ctx, actor, true).await?;
    for (image, member) in set.memberships(actor) {
        let request = ApiRequest::DeleteMember {
            image: image.id.clone(),
            member: member.clone(),
        };
        let subject = Subject::Membership {
            image: &image.state,
            member,
        };
        report.record(runner.run(actor, &request, subject).await);
    }
    Ok(report)
}
