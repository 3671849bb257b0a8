// crates/rbac-conformance-engine/src/matrix/children.rs
// ============================================================================
// Module: Namespace Child Matrix
// Description: Create/get/list/update/delete of objects, properties, tags.
// Purpose: Share one matrix across the named children of a namespace.
// Dependencies: rbac-conformance-clients, rbac-conformance-core
// ============================================================================

//! ## Overview
//! Objects, properties and single tags have the same five operations and
//! inherit their namespace's owner and visibility, so one matrix covers all
//! three. Children are created by the administrator of the owning project.

use rbac_conformance_clients::ApiRequest;
use rbac_conformance_core::NamespaceName;
use rbac_conformance_core::Persona;
use rbac_conformance_core::ResourceFamily;
use rbac_conformance_core::ResourceName;
use rbac_conformance_core::Subject;

use super::MatrixReport;
use super::namespace_admin;
use super::namespace_batch;
use super::scenario_name;
use crate::fixtures::ChildFixture;
use crate::fixtures::NamespaceFixture;
use crate::harness::ScenarioContext;
use crate::harness::ScenarioError;
use crate::naming;
use crate::runner::DELETED_RULE;

/// Named namespace child kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    /// Namespace object.
    Object,
    /// Namespace property.
    Property,
    /// Single namespace tag.
    Tag,
}

/// Targeted steps run on fresh children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Show.
    Get,
    /// List the parent's children.
    List,
    /// Replace or rename.
    Update,
    /// Delete, then confirm it is gone.
    Delete,
}

impl ChildKind {
    /// Family of the child.
    #[must_use]
    pub const fn family(self) -> ResourceFamily {
        match self {
            Self::Object => ResourceFamily::NamespaceObject,
            Self::Property => ResourceFamily::NamespaceProperty,
            Self::Tag => ResourceFamily::NamespaceTag,
        }
    }

    /// Fixture name of the child within `namespace`.
    fn fixture_name(self, namespace: &NamespaceName) -> ResourceName {
        match self {
            Self::Object => naming::object_name(namespace),
            Self::Property => naming::property_name(namespace),
            Self::Tag => naming::tag_name(namespace),
        }
    }

    /// Create request.
    fn create(self, namespace: &NamespaceName, name: ResourceName) -> ApiRequest {
        let namespace = namespace.clone();
        match self {
            Self::Object => ApiRequest::CreateObject {
                namespace,
                name,
            },
            Self::Property => ApiRequest::CreateProperty {
                namespace,
                name,
            },
            Self::Tag => ApiRequest::CreateTag {
                namespace,
                name,
            },
        }
    }

    /// Request for a targeted step.
    fn request(self, step: Step, child: &ChildFixture) -> ApiRequest {
        let namespace = child.namespace.name.clone();
        let name = child.name.clone();
        match (self, step) {
            (Self::Object, Step::Get) => ApiRequest::GetObject {
                namespace,
                name,
            },
            (Self::Object, Step::List) => ApiRequest::ListObjects {
                namespace,
            },
            (Self::Object, Step::Update) => ApiRequest::UpdateObject {
                namespace,
                name,
                description: "updated by rbac conformance".to_string(),
            },
            (Self::Object, Step::Delete) => ApiRequest::DeleteObject {
                namespace,
                name,
            },
            (Self::Property, Step::Get) => ApiRequest::GetProperty {
                namespace,
                name,
            },
            (Self::Property, Step::List) => ApiRequest::ListProperties {
                namespace,
            },
            (Self::Property, Step::Update) => ApiRequest::UpdateProperty {
                namespace,
                name,
                title: "updated".to_string(),
            },
            (Self::Property, Step::Delete) => ApiRequest::DeleteProperty {
                namespace,
                name,
            },
            (Self::Tag, Step::Get) => ApiRequest::GetTag {
                namespace,
                name,
            },
            (Self::Tag, Step::List) => ApiRequest::ListTags {
                namespace,
            },
            (Self::Tag, Step::Update) => ApiRequest::UpdateTag {
                new_name: ResourceName::new(format!("{name}-renamed")),
                namespace,
                name,
            },
            (Self::Tag, Step::Delete) => ApiRequest::DeleteTag {
                namespace,
                name,
            },
        }
    }

    /// Creates the fixture child through the owner's administrator.
    async fn create_fixture(
        self,
        ctx: &ScenarioContext,
        namespace: &NamespaceFixture,
    ) -> Result<ChildFixture, ScenarioError> {
        let creator = namespace_admin(ctx, namespace)?;
        let fixtures = ctx.fixtures();
        let child = match self {
            Self::Object => fixtures.create_object(creator, namespace).await?,
            Self::Property => fixtures.create_property(creator, namespace).await?,
            Self::Tag => fixtures.create_tag(creator, namespace).await?,
        };
        Ok(child)
    }
}

/// Runs the child matrix for one kind as one persona.
///
/// # Errors
///
/// Returns [`ScenarioError`] when fixtures or personas are unavailable.
pub async fn children_matrix(
    ctx: &ScenarioContext,
    persona: Persona,
    kind: ChildKind,
) -> Result<MatrixReport, ScenarioError> {
    let actor = ctx.actor(persona)?;
    let runner = ctx.runner();
    let mut report = MatrixReport::new(scenario_name(kind.family(), persona));

    for namespace in namespace_batch(ctx, persona).await? {
        let request = kind.create(&namespace.name, kind.fixture_name(&namespace.name));
        report.record(runner.run(actor, &request, Subject::Resource(&namespace.state)).await);
    }

    for step in [Step::Get, Step::List, Step::Update, Step::Delete] {
        let mut children = Vec::new();
        for namespace in namespace_batch(ctx, persona).await? {
            children.push(kind.create_fixture(ctx, &namespace).await?);
        }
        for child in &children {
            let request = kind.request(step, child);
            let subject = Subject::Resource(&child.namespace.state);
            let deleted = report.record(runner.run(actor, &request, subject).await).is_some_and(
                |result| step == Step::Delete && result.expectation.outcome.is_success(),
            );
            if deleted {
                let lookup = kind.request(Step::Get, child);
                let admin = namespace_admin(ctx, &child.namespace)?;
                report.record(runner.confirm_absent(admin, &lookup, DELETED_RULE).await);
            }
        }
    }
    Ok(report)
}
