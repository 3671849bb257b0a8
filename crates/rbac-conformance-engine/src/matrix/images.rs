// crates/rbac-conformance-engine/src/matrix/images.rs
// ============================================================================
// Module: Image Matrix
// Description: Image lifecycle operations over ownership x visibility.
// Purpose: Cover create, read, list, mutate, delete and state transitions.
// Dependencies: rbac-conformance-clients, rbac-conformance-core
// ============================================================================

//! ## Overview
//! The fixture set per operation is: private, shared and community images
//! from a member of the persona's project, the same three from a member of
//! an unrelated project, and one public image from `project_admin`. The
//! foreign shared image carries a pending share with the persona's project,
//! so every targeted operation also runs against an unanswered share.
//! Deactivation needs uploaded data first; reactivation needs data and a
//! prior deactivation. Image listing is checked twice: before and after the
//! persona's project accepts that share.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rbac_conformance_clients::ApiRequest;
use rbac_conformance_core::ImageId;
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
use crate::fixtures::UPLOAD_BYTES;
use crate::harness::ScenarioContext;
use crate::harness::ScenarioError;
use crate::naming;
use crate::registry::Actor;
use crate::runner::DELETED_RULE;
use crate::runner::ListingCandidate;
use crate::runner::UNKNOWN_ID_RULE;

/// Visibilities members create fixtures with; public needs an administrator.
const MEMBER_VISIBILITIES: [Visibility; 3] =
    [Visibility::Private, Visibility::Shared, Visibility::Community];

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// An image together with the actor that created it.
struct OwnedImage {
    /// Creator.
    creator: Actor,
    /// Image handle.
    image: ImageFixture,
}

/// Fresh fixture set for one operation.
struct ImageSet {
    /// Member of the persona's project (or of a fresh one).
    own: Actor,
    /// Every image, own first.
    images: Vec<OwnedImage>,
}

impl ImageSet {
    /// Creates the set.
    async fn create(ctx: &ScenarioContext, actor: &Actor) -> Result<Self, ScenarioError> {
        let fixtures = ctx.fixtures();
        let own = ctx.mint_member(actor.project()).await?;
        let foreign = ctx.mint_member(None).await?;
        let mut images = Vec::new();
        for creator in [&own, &foreign] {
            for image in fixtures.image_batch(creator, &MEMBER_VISIBILITIES).await? {
                images.push(OwnedImage {
                    creator: creator.clone(),
                    image,
                });
            }
        }
        if let Some(project) = own.project() {
            let foreign_shared = images.iter_mut().find(|owned| {
                owned.creator.label() == foreign.label()
                    && owned.image.state.visibility == Visibility::Shared
            });
            if let Some(shared) = foreign_shared {
                fixtures.share(&foreign, &mut shared.image, project).await?;
            }
        }
        let admin = ctx.actor(Persona::ProjectAdmin)?;
        images.push(OwnedImage {
            creator: admin.clone(),
            image: fixtures.create_image(admin, Visibility::Public).await?,
        });
        Ok(Self {
            own,
            images,
        })
    }

    /// Listing candidates for every image.
    fn candidates(&self) -> Vec<ListingCandidate<'_>> {
        self.images
            .iter()
            .map(|owned| ListingCandidate {
                id: owned.image.id.as_str(),
                item: ListedItem::Resource(&owned.image.state),
            })
            .collect()
    }
}

/// Targeted image operations run against a fresh set each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Targeted {
    /// Show.
    Get,
    /// Download data.
    Download,
    /// Rename.
    Update,
    /// Upload data.
    Upload,
    /// Delete, then confirm it is gone.
    Delete,
    /// Deactivate an image with data.
    Deactivate,
    /// Reactivate a deactivated image.
    Reactivate,
}

impl Targeted {
    /// Every targeted operation in run order.
    const ALL: [Self; 7] = [
        Self::Get,
        Self::Download,
        Self::Update,
        Self::Upload,
        Self::Delete,
        Self::Deactivate,
        Self::Reactivate,
    ];

    /// Request aimed at `image`.
    fn request(self, image: &ImageId) -> ApiRequest {
        let image = image.clone();
        match self {
            Self::Get => ApiRequest::GetImage {
                image,
            },
            Self::Download => ApiRequest::DownloadImage {
                image,
            },
            Self::Update => ApiRequest::UpdateImage {
                image,
                name: format!("updated_image-{}", naming::random_suffix()),
            },
            Self::Upload => ApiRequest::UploadImage {
                image,
                data: naming::random_bytes(UPLOAD_BYTES),
            },
            Self::Delete => ApiRequest::DeleteImage {
                image,
            },
            Self::Deactivate => ApiRequest::DeactivateImage {
                image,
            },
            Self::Reactivate => ApiRequest::ReactivateImage {
                image,
            },
        }
    }

    /// Brings a fresh image into the state the operation needs.
    async fn prepare(self, ctx: &ScenarioContext, owned: &OwnedImage) -> Result<(), ScenarioError> {
        let fixtures = ctx.fixtures();
        if matches!(self, Self::Deactivate | Self::Reactivate) {
            fixtures.upload(&owned.creator, &owned.image).await?;
        }
        if self == Self::Reactivate {
            fixtures.deactivate(&owned.creator, &owned.image).await?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Matrix
// ============================================================================

/// Runs the image matrix as one persona.
///
/// # Errors
///
/// Returns [`ScenarioError`] when fixtures or personas are unavailable.
pub async fn images_matrix(
    ctx: &ScenarioContext,
    persona: Persona,
) -> Result<MatrixReport, ScenarioError> {
    let actor = ctx.actor(persona)?;
    let runner = ctx.runner();
    let mut report = MatrixReport::new(scenario_name(ResourceFamily::Image, persona));

    let scope = actor.project().map_or("system", ProjectId::as_str);
    for visibility in Visibility::IMAGE {
        let request = ApiRequest::CreateImage {
            name: format!("{scope}_image-{}", naming::random_suffix()),
            visibility,
        };
        let created = report
            .record(runner.run(actor, &request, Subject::Create(visibility)).await)
            .and_then(|result| result.response)
            .and_then(|response| response.str_field("id").map(ImageId::new));
        if let Some(image) = created {
            ctx.cleanup().push(CleanupAction::DeleteImage {
                image,
                credential: actor.credential().clone(),
            });
        }
    }

    for operation in Targeted::ALL {
        let set = ImageSet::create(ctx, actor).await?;
        for owned in &set.images {
            operation.prepare(ctx, owned).await?;
            let request = operation.request(&owned.image.id);
            let deleted = report
                .record(runner.run(actor, &request, Subject::Resource(&owned.image.state)).await)
                .is_some_and(|result| {
                    operation == Targeted::Delete && result.expectation.outcome.is_success()
                });
            if deleted {
                let lookup = Targeted::Get.request(&owned.image.id);
                report.record(runner.confirm_absent(&owned.creator, &lookup, DELETED_RULE).await);
            }
        }
    }

    let unknown = ApiRequest::GetImage {
        image: naming::random_image_id(),
    };
    report.record(runner.confirm_absent(actor, &unknown, UNKNOWN_ID_RULE).await);

    let mut set = ImageSet::create(ctx, actor).await?;
    report.record_listing(
        runner.run_listing(actor, &ApiRequest::ListImages, Subject::Collection, &set.candidates()).await,
    );
    let fixtures = ctx.fixtures();
    let own = set.own.clone();
    if let Some(shared) = set
        .images
        .iter_mut()
        .find(|owned| {
            owned.image.state.memberships.values().any(|status| *status == MemberStatus::Pending)
        })
        .map(|owned| &mut owned.image)
    {
        fixtures.respond(&own, shared, MemberStatus::Accepted).await?;
        report.record_listing(
            runner
                .run_listing(actor, &ApiRequest::ListImages, Subject::Collection, &set.candidates())
                .await,
        );
    }
    Ok(report)
}
