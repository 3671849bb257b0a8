// crates/rbac-conformance-engine/tests/common/mod.rs
// =============================================================================
// Module: Engine Test Helpers
// Description: In-memory identity backend, image service, and audit sink.
// Purpose: Drive the engine end to end without live services.
// =============================================================================

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test helpers are selectively used across suites."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use rbac_conformance_clients::ApiError;
use rbac_conformance_clients::ApiRequest;
use rbac_conformance_clients::ApiResponse;
use rbac_conformance_clients::Credential;
use rbac_conformance_clients::IdentityBackend;
use rbac_conformance_clients::IdentityError;
use rbac_conformance_clients::ImageApi;
use rbac_conformance_clients::PasswordAuth;
use rbac_conformance_clients::TokenScope;
use rbac_conformance_core::ActorView;
use rbac_conformance_core::Expectation;
use rbac_conformance_core::ImageId;
use rbac_conformance_core::ListedItem;
use rbac_conformance_core::MemberStatus;
use rbac_conformance_core::NamespaceName;
use rbac_conformance_core::Operation;
use rbac_conformance_core::Oracle;
use rbac_conformance_core::Outcome;
use rbac_conformance_core::ProjectId;
use rbac_conformance_core::ResourceName;
use rbac_conformance_core::ResourceState;
use rbac_conformance_core::RoleId;
use rbac_conformance_core::RoleKind;
use rbac_conformance_core::Subject;
use rbac_conformance_core::TrialQuery;
use rbac_conformance_core::UserId;
use rbac_conformance_engine::Harness;
use rbac_conformance_engine::HarnessParams;
use rbac_conformance_engine::RegistrySettings;
use rbac_conformance_engine::RoleNames;
use rbac_conformance_engine::ScenarioAuditEvent;
use rbac_conformance_engine::TrialAuditEvent;
use rbac_conformance_engine::TrialAuditSink;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Constants
// ============================================================================

pub const BOOTSTRAP_USER: &str = "admin";
pub const BOOTSTRAP_PASSWORD: &str = "secret";
pub const BOOTSTRAP_PROJECT: &str = "admin";
pub const DOMAIN: &str = "default";

const BOOTSTRAP_USER_ID: &str = "u-bootstrap";
const BOOTSTRAP_PROJECT_ID: &str = "p-bootstrap";
const ROLES: [(&str, &str); 3] = [("r-admin", "admin"), ("r-member", "member"), ("r-reader", "reader")];

/// Registry settings matching the fake identity backend.
pub fn settings() -> RegistrySettings {
    RegistrySettings {
        bootstrap: PasswordAuth {
            username: BOOTSTRAP_USER.to_string(),
            password: BOOTSTRAP_PASSWORD.to_string(),
            domain_id: DOMAIN.to_string(),
        },
        bootstrap_project: BOOTSTRAP_PROJECT.to_string(),
        roles: RoleNames {
            admin: "admin".to_string(),
            member: "member".to_string(),
            reader: "reader".to_string(),
        },
        scopes: BTreeMap::new(),
        prefix: "rbac".to_string(),
    }
}

// ============================================================================
// SECTION: Identity
// ============================================================================

struct FakeUser {
    name: String,
    password: String,
    project_roles: BTreeMap<ProjectId, RoleId>,
    system_role: Option<RoleId>,
}

#[derive(Default)]
struct IdentityState {
    next: usize,
    users: BTreeMap<UserId, FakeUser>,
    projects: BTreeMap<ProjectId, String>,
    tokens: BTreeMap<String, ActorView>,
    created_users: usize,
    fail_user_creation_at: Option<usize>,
}

impl IdentityState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{prefix}-{}", self.next)
    }

    fn require_token(&self, credential: &Credential) -> Result<(), IdentityError> {
        if self.tokens.contains_key(&credential.token) {
            Ok(())
        } else {
            Err(IdentityError::Denied("unknown token".to_string()))
        }
    }
}

/// In-memory identity backend with one bootstrap administrator.
pub struct FakeIdentity {
    state: Mutex<IdentityState>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        let mut state = IdentityState::default();
        let project = ProjectId::new(BOOTSTRAP_PROJECT_ID);
        state.projects.insert(project.clone(), BOOTSTRAP_PROJECT.to_string());
        state.users.insert(UserId::new(BOOTSTRAP_USER_ID), FakeUser {
            name: BOOTSTRAP_USER.to_string(),
            password: BOOTSTRAP_PASSWORD.to_string(),
            project_roles: BTreeMap::from([(project, RoleId::new("r-admin"))]),
            system_role: None,
        });
        Self {
            state: Mutex::new(state),
        }
    }

    /// Makes the nth created user (1-based) fail.
    pub fn fail_user_creation_at(&self, index: usize) {
        self.state.lock().unwrap().fail_user_creation_at = Some(index);
    }

    /// Oracle view of a token holder.
    pub fn view_of(&self, token: &str) -> Option<ActorView> {
        self.state.lock().unwrap().tokens.get(token).cloned()
    }

    /// Users other than the bootstrap administrator.
    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len() - 1
    }

    /// Projects other than the bootstrap project.
    pub fn project_count(&self) -> usize {
        self.state.lock().unwrap().projects.len() - 1
    }
}

impl Default for FakeIdentity {
    fn default() -> Self {
        Self::new()
    }
}

fn role_kind(role: &RoleId, system: bool) -> RoleKind {
    match (role.as_str(), system) {
        ("r-admin", true) => RoleKind::SystemAdmin,
        ("r-admin", false) => RoleKind::Admin,
        ("r-member", _) => RoleKind::Member,
        _ => RoleKind::Reader,
    }
}

#[async_trait]
impl IdentityBackend for FakeIdentity {
    async fn issue_token(
        &self,
        auth: &PasswordAuth,
        scope: &TokenScope,
    ) -> Result<Credential, IdentityError> {
        let mut state = self.state.lock().unwrap();
        let (user_id, user) = state
            .users
            .iter()
            .find(|(_, user)| user.name == auth.username && user.password == auth.password)
            .ok_or_else(|| IdentityError::Denied("bad credentials".to_string()))?;
        let user_id = user_id.clone();
        let (project, view) = match scope {
            TokenScope::System => {
                let role = user
                    .system_role
                    .as_ref()
                    .ok_or_else(|| IdentityError::Denied("no system role".to_string()))?;
                (None, ActorView::new(role_kind(role, true), None))
            }
            TokenScope::Project(project) => {
                let role = user
                    .project_roles
                    .get(project)
                    .ok_or_else(|| IdentityError::Denied("no project role".to_string()))?;
                (Some(project.clone()), ActorView::new(role_kind(role, false), Some(project.clone())))
            }
            TokenScope::ProjectName {
                name, ..
            } => {
                let project = state
                    .projects
                    .iter()
                    .find(|(_, project_name)| *project_name == name)
                    .map(|(id, _)| id.clone())
                    .ok_or_else(|| IdentityError::NotFound(name.clone()))?;
                let role = user
                    .project_roles
                    .get(&project)
                    .ok_or_else(|| IdentityError::Denied("no project role".to_string()))?;
                (Some(project.clone()), ActorView::new(role_kind(role, false), Some(project)))
            }
        };
        let token = state.next_id("tok");
        state.tokens.insert(token.clone(), view);
        Ok(Credential {
            token,
            user_id,
            project_id: project,
        })
    }

    async fn create_user(
        &self,
        admin: &Credential,
        auth: &PasswordAuth,
        _default_project: Option<&ProjectId>,
    ) -> Result<UserId, IdentityError> {
        let mut state = self.state.lock().unwrap();
        state.require_token(admin)?;
        state.created_users += 1;
        if state.fail_user_creation_at == Some(state.created_users) {
            return Err(IdentityError::Rejected("status 500: injected".to_string()));
        }
        let id = UserId::new(state.next_id("u"));
        state.users.insert(id.clone(), FakeUser {
            name: auth.username.clone(),
            password: auth.password.clone(),
            project_roles: BTreeMap::new(),
            system_role: None,
        });
        Ok(id)
    }

    async fn delete_user(&self, admin: &Credential, user: &UserId) -> Result<(), IdentityError> {
        let mut state = self.state.lock().unwrap();
        state.require_token(admin)?;
        state.users.remove(user).map(|_| ()).ok_or_else(|| IdentityError::NotFound(user.to_string()))
    }

    async fn create_project(
        &self,
        admin: &Credential,
        name: &str,
        _domain_id: &str,
    ) -> Result<ProjectId, IdentityError> {
        let mut state = self.state.lock().unwrap();
        state.require_token(admin)?;
        let id = ProjectId::new(state.next_id("p"));
        state.projects.insert(id.clone(), name.to_string());
        Ok(id)
    }

    async fn delete_project(
        &self,
        admin: &Credential,
        project: &ProjectId,
    ) -> Result<(), IdentityError> {
        let mut state = self.state.lock().unwrap();
        state.require_token(admin)?;
        state
            .projects
            .remove(project)
            .map(|_| ())
            .ok_or_else(|| IdentityError::NotFound(project.to_string()))
    }

    async fn find_role(&self, admin: &Credential, name: &str) -> Result<RoleId, IdentityError> {
        self.state.lock().unwrap().require_token(admin)?;
        ROLES
            .iter()
            .find(|(_, role_name)| *role_name == name)
            .map(|(id, _)| RoleId::new(*id))
            .ok_or_else(|| IdentityError::NotFound(name.to_string()))
    }

    async fn grant_project_role(
        &self,
        admin: &Credential,
        project: &ProjectId,
        user: &UserId,
        role: &RoleId,
    ) -> Result<(), IdentityError> {
        let mut state = self.state.lock().unwrap();
        state.require_token(admin)?;
        if !state.projects.contains_key(project) {
            return Err(IdentityError::NotFound(project.to_string()));
        }
        let user = state.users.get_mut(user).ok_or_else(|| IdentityError::NotFound(user.to_string()))?;
        user.project_roles.insert(project.clone(), role.clone());
        Ok(())
    }

    async fn grant_system_role(
        &self,
        admin: &Credential,
        user: &UserId,
        role: &RoleId,
    ) -> Result<(), IdentityError> {
        let mut state = self.state.lock().unwrap();
        state.require_token(admin)?;
        let user = state.users.get_mut(user).ok_or_else(|| IdentityError::NotFound(user.to_string()))?;
        user.system_role = Some(role.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Image Service
// ============================================================================

/// Deliberate deviations from the enforced policy.
#[derive(Debug, Clone, Default)]
pub struct Quirks {
    /// List calls return every item regardless of visibility.
    pub leak_listings: bool,
    /// Operations that always answer 403.
    pub forbidden: BTreeSet<Operation>,
    /// Image and namespace deletions answer 500.
    pub fail_deletes: bool,
    /// Deleted images still answer lookups.
    pub sticky_deletes: bool,
}

struct StoredImage {
    state: ResourceState,
    name: String,
    has_data: bool,
    active: bool,
    deleted: bool,
}

#[derive(Default)]
struct StoredChildren {
    objects: BTreeSet<ResourceName>,
    properties: BTreeSet<ResourceName>,
    tags: BTreeSet<ResourceName>,
    associations: BTreeSet<ResourceName>,
}

struct StoredNamespace {
    state: ResourceState,
    children: StoredChildren,
}

#[derive(Default)]
struct Catalog {
    next: usize,
    images: BTreeMap<ImageId, StoredImage>,
    namespaces: BTreeMap<NamespaceName, StoredNamespace>,
    quirks: Quirks,
}

/// In-memory image service that enforces an oracle's decisions.
pub struct FakeImageService {
    identity: Arc<FakeIdentity>,
    oracle: Oracle,
    catalog: Mutex<Catalog>,
}

impl FakeImageService {
    pub fn new(identity: Arc<FakeIdentity>, oracle: Oracle) -> Self {
        Self {
            identity,
            oracle,
            catalog: Mutex::new(Catalog::default()),
        }
    }

    pub fn set_quirks(&self, quirks: Quirks) {
        self.catalog.lock().unwrap().quirks = quirks;
    }

    /// Live images.
    pub fn image_count(&self) -> usize {
        self.catalog.lock().unwrap().images.values().filter(|image| !image.deleted).count()
    }

    /// Namespaces still present.
    pub fn namespace_count(&self) -> usize {
        self.catalog.lock().unwrap().namespaces.len()
    }

    /// Seeds an image directly, bypassing policy.
    pub fn seed_image(&self, state: ResourceState) -> ImageId {
        let mut catalog = self.catalog.lock().unwrap();
        catalog.next += 1;
        let id = ImageId::new(format!("img-{}", catalog.next));
        catalog.images.insert(id.clone(), stored_image(state, "seeded"));
        id
    }
}

fn stored_image(state: ResourceState, name: &str) -> StoredImage {
    StoredImage {
        state,
        name: name.to_string(),
        has_data: false,
        active: true,
        deleted: false,
    }
}

fn ok(status: u16, body: Value) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse {
        status,
        body,
        body_len: 0,
    })
}

fn conflict(what: &str) -> Result<ApiResponse, ApiError> {
    Err(ApiError::UnexpectedStatus {
        status: 409,
        body: format!("{what} exists"),
    })
}

fn named(names: &BTreeSet<ResourceName>) -> Value {
    Value::Array(names.iter().map(|name| json!({ "name": name.as_str() })).collect())
}

/// Namespace named by a metadef request.
fn metadef_namespace(request: &ApiRequest) -> Option<&NamespaceName> {
    match request {
        ApiRequest::GetNamespace { namespace }
        | ApiRequest::UpdateNamespace { namespace, .. }
        | ApiRequest::DeleteNamespace { namespace }
        | ApiRequest::CreateObject { namespace, .. }
        | ApiRequest::GetObject { namespace, .. }
        | ApiRequest::ListObjects { namespace }
        | ApiRequest::UpdateObject { namespace, .. }
        | ApiRequest::DeleteObject { namespace, .. }
        | ApiRequest::CreateProperty { namespace, .. }
        | ApiRequest::GetProperty { namespace, .. }
        | ApiRequest::ListProperties { namespace }
        | ApiRequest::UpdateProperty { namespace, .. }
        | ApiRequest::DeleteProperty { namespace, .. }
        | ApiRequest::CreateTag { namespace, .. }
        | ApiRequest::CreateTags { namespace, .. }
        | ApiRequest::GetTag { namespace, .. }
        | ApiRequest::ListTags { namespace }
        | ApiRequest::UpdateTag { namespace, .. }
        | ApiRequest::DeleteTag { namespace, .. }
        | ApiRequest::DeleteTags { namespace }
        | ApiRequest::CreateResourceTypeAssociation { namespace, .. }
        | ApiRequest::ListResourceTypeAssociations { namespace }
        | ApiRequest::DeleteResourceTypeAssociation { namespace, .. } => Some(namespace),
        _ => None,
    }
}

/// Image addressed by an image or member request.
fn targeted_image(request: &ApiRequest) -> Option<&ImageId> {
    match request {
        ApiRequest::GetImage { image }
        | ApiRequest::UpdateImage { image, .. }
        | ApiRequest::UploadImage { image, .. }
        | ApiRequest::DownloadImage { image }
        | ApiRequest::DeleteImage { image }
        | ApiRequest::DeactivateImage { image }
        | ApiRequest::ReactivateImage { image }
        | ApiRequest::AddMember { image, .. }
        | ApiRequest::GetMember { image, .. }
        | ApiRequest::ListMembers { image }
        | ApiRequest::UpdateMember { image, .. }
        | ApiRequest::DeleteMember { image, .. } => Some(image),
        _ => None,
    }
}

impl Catalog {
    fn image(&self, id: &ImageId) -> Option<&StoredImage> {
        self.images.get(id).filter(|image| !image.deleted || self.quirks.sticky_deletes)
    }

    fn subject<'a>(&'a self, request: &'a ApiRequest) -> Subject<'a> {
        match request {
            ApiRequest::CreateImage { visibility, .. }
            | ApiRequest::CreateNamespace { visibility, .. } => Subject::Create(*visibility),
            ApiRequest::ListImages | ApiRequest::ListNamespaces | ApiRequest::ListResourceTypes => {
                Subject::Collection
            }
            ApiRequest::AddMember { image, member }
            | ApiRequest::GetMember { image, member }
            | ApiRequest::UpdateMember { image, member, .. }
            | ApiRequest::DeleteMember { image, member } => match self.image(image) {
                Some(stored) => Subject::Membership {
                    image: &stored.state,
                    member,
                },
                None => Subject::Missing,
            },
            _ => {
                if let Some(image) = targeted_image(request) {
                    return self.image(image).map_or(Subject::Missing, |stored| Subject::Resource(&stored.state));
                }
                metadef_namespace(request)
                    .and_then(|namespace| self.namespaces.get(namespace))
                    .map_or(Subject::Missing, |stored| Subject::Resource(&stored.state))
            }
        }
    }

    fn listed(&self, oracle: &Oracle, expectation: &Expectation, view: &ActorView, item: ListedItem<'_>) -> bool {
        self.quirks.leak_listings || oracle.is_listed(expectation, view, item)
    }

    fn apply(
        &mut self,
        oracle: &Oracle,
        request: &ApiRequest,
        view: &ActorView,
        expectation: &Expectation,
        status: u16,
    ) -> Result<ApiResponse, ApiError> {
        match request {
            ApiRequest::CreateImage { name, visibility } => {
                self.next += 1;
                let id = ImageId::new(format!("img-{}", self.next));
                let state = ResourceState::new(view.project.clone(), *visibility);
                self.images.insert(id.clone(), stored_image(state, name));
                ok(status, json!({
                    "id": id.as_str(),
                    "name": name,
                    "visibility": visibility.as_str(),
                    "owner": view.project.as_ref().map(ProjectId::as_str),
                }))
            }
            ApiRequest::ListImages => {
                let images: Vec<Value> = self
                    .images
                    .iter()
                    .filter(|(_, image)| !image.deleted)
                    .filter(|(_, image)| {
                        self.listed(oracle, expectation, view, ListedItem::Resource(&image.state))
                    })
                    .map(|(id, _)| json!({ "id": id.as_str() }))
                    .collect();
                ok(status, json!({ "images": images }))
            }
            ApiRequest::ListMembers { image } => {
                let Some(stored) = self.image(image) else {
                    return Err(ApiError::NotFound);
                };
                let members: Vec<Value> = stored
                    .state
                    .memberships
                    .iter()
                    .filter(|(member, _)| {
                        self.listed(oracle, expectation, view, ListedItem::Membership {
                            image: &stored.state,
                            member,
                        })
                    })
                    .map(|(member, state)| json!({ "member_id": member.as_str(), "status": state.as_str() }))
                    .collect();
                ok(status, json!({ "members": members }))
            }
            ApiRequest::ListNamespaces => {
                let namespaces: Vec<Value> = self
                    .namespaces
                    .iter()
                    .filter(|(_, namespace)| {
                        self.listed(oracle, expectation, view, ListedItem::Resource(&namespace.state))
                    })
                    .map(|(name, _)| json!({ "namespace": name.as_str() }))
                    .collect();
                ok(status, json!({ "namespaces": namespaces }))
            }
            ApiRequest::ListResourceTypes => {
                ok(status, json!({ "resource_types": [{ "name": "OS::Glance::Image" }] }))
            }
            ApiRequest::CreateNamespace { namespace, visibility, owner } => {
                if self.namespaces.contains_key(namespace) {
                    return conflict(namespace.as_str());
                }
                let owner = owner.clone().or_else(|| view.project.clone());
                let body = json!({
                    "namespace": namespace.as_str(),
                    "visibility": visibility.as_str(),
                    "owner": owner.as_ref().map(ProjectId::as_str),
                });
                self.namespaces.insert(namespace.clone(), StoredNamespace {
                    state: ResourceState::new(owner, *visibility),
                    children: StoredChildren::default(),
                });
                ok(status, body)
            }
            _ => {
                if let Some(image) = targeted_image(request).cloned() {
                    return self.apply_image(request, &image, status);
                }
                let Some(namespace) = metadef_namespace(request).cloned() else {
                    return Err(ApiError::InvalidRequest("unsupported request".to_string()));
                };
                self.apply_metadef(request, &namespace, status)
            }
        }
    }

    fn apply_image(&mut self, request: &ApiRequest, id: &ImageId, status: u16) -> Result<ApiResponse, ApiError> {
        let fail_deletes = self.quirks.fail_deletes;
        let sticky = self.quirks.sticky_deletes;
        let image = self.images.get_mut(id).filter(|image| !image.deleted || sticky).ok_or(ApiError::NotFound)?;
        let summary = json!({ "id": id.as_str(), "name": image.name, "visibility": image.state.visibility.as_str() });
        match request {
            ApiRequest::GetImage { .. } => ok(status, summary),
            ApiRequest::UpdateImage { name, .. } => {
                image.name.clone_from(name);
                ok(status, summary)
            }
            ApiRequest::UploadImage { .. } => {
                image.has_data = true;
                ok(status, Value::Null)
            }
            ApiRequest::DownloadImage { .. } => ok(status, Value::Null),
            ApiRequest::DeleteImage { .. } => {
                if fail_deletes {
                    return Err(ApiError::UnexpectedStatus {
                        status: 500,
                        body: "injected".to_string(),
                    });
                }
                image.deleted = true;
                ok(status, Value::Null)
            }
            ApiRequest::DeactivateImage { .. } | ApiRequest::ReactivateImage { .. } => {
                if !image.has_data {
                    return Err(ApiError::UnexpectedStatus {
                        status: 400,
                        body: "image has no data".to_string(),
                    });
                }
                image.active = matches!(request, ApiRequest::ReactivateImage { .. });
                ok(status, Value::Null)
            }
            ApiRequest::AddMember { member, .. } => {
                if image.state.membership_of(member).is_some() {
                    return conflict(member.as_str());
                }
                image.state.set_membership(member.clone(), MemberStatus::Pending);
                ok(status, json!({ "member_id": member.as_str(), "status": "pending" }))
            }
            ApiRequest::GetMember { member, .. } => {
                let current = image.state.membership_of(member).ok_or(ApiError::NotFound)?;
                ok(status, json!({ "member_id": member.as_str(), "status": current.as_str() }))
            }
            ApiRequest::UpdateMember { member, status: answer, .. } => {
                image.state.membership_of(member).ok_or(ApiError::NotFound)?;
                image.state.set_membership(member.clone(), *answer);
                ok(status, json!({ "member_id": member.as_str(), "status": answer.as_str() }))
            }
            ApiRequest::DeleteMember { member, .. } => {
                image.state.membership_of(member).ok_or(ApiError::NotFound)?;
                image.state.remove_membership(member);
                ok(status, Value::Null)
            }
            _ => Err(ApiError::InvalidRequest("unsupported image request".to_string())),
        }
    }

    fn apply_metadef(
        &mut self,
        request: &ApiRequest,
        name: &NamespaceName,
        status: u16,
    ) -> Result<ApiResponse, ApiError> {
        if matches!(request, ApiRequest::DeleteNamespace { .. }) {
            if self.quirks.fail_deletes {
                return Err(ApiError::UnexpectedStatus {
                    status: 500,
                    body: "injected".to_string(),
                });
            }
            return self.namespaces.remove(name).map_or(Err(ApiError::NotFound), |_| ok(status, Value::Null));
        }
        let namespace = self.namespaces.get_mut(name).ok_or(ApiError::NotFound)?;
        let children = &mut namespace.children;
        match request {
            ApiRequest::GetNamespace { .. } => ok(status, json!({ "namespace": name.as_str() })),
            ApiRequest::UpdateNamespace { visibility, .. } => {
                namespace.state.visibility = *visibility;
                ok(status, json!({ "namespace": name.as_str() }))
            }
            ApiRequest::CreateObject { name: child, .. } => insert(&mut children.objects, child, status),
            ApiRequest::CreateProperty { name: child, .. } => insert(&mut children.properties, child, status),
            ApiRequest::CreateTag { name: child, .. } => insert(&mut children.tags, child, status),
            ApiRequest::CreateResourceTypeAssociation { name: child, .. } => {
                insert(&mut children.associations, child, status)
            }
            ApiRequest::CreateTags { names, .. } => {
                children.tags = names.iter().cloned().collect();
                ok(status, json!({ "tags": named(&children.tags) }))
            }
            ApiRequest::GetObject { name: child, .. } | ApiRequest::UpdateObject { name: child, .. } => {
                present(&children.objects, child, status)
            }
            ApiRequest::GetProperty { name: child, .. } | ApiRequest::UpdateProperty { name: child, .. } => {
                present(&children.properties, child, status)
            }
            ApiRequest::GetTag { name: child, .. } => present(&children.tags, child, status),
            ApiRequest::UpdateTag { name: child, new_name, .. } => {
                if !children.tags.remove(child) {
                    return Err(ApiError::NotFound);
                }
                children.tags.insert(new_name.clone());
                ok(status, json!({ "name": new_name.as_str() }))
            }
            ApiRequest::ListObjects { .. } => ok(status, json!({ "objects": named(&children.objects) })),
            ApiRequest::ListProperties { .. } => ok(status, json!({ "properties": named(&children.properties) })),
            ApiRequest::ListTags { .. } => ok(status, json!({ "tags": named(&children.tags) })),
            ApiRequest::ListResourceTypeAssociations { .. } => {
                ok(status, json!({ "resource_type_associations": named(&children.associations) }))
            }
            ApiRequest::DeleteObject { name: child, .. } => remove(&mut children.objects, child, status),
            ApiRequest::DeleteProperty { name: child, .. } => remove(&mut children.properties, child, status),
            ApiRequest::DeleteTag { name: child, .. } => remove(&mut children.tags, child, status),
            ApiRequest::DeleteResourceTypeAssociation { name: child, .. } => {
                remove(&mut children.associations, child, status)
            }
            ApiRequest::DeleteTags { .. } => {
                children.tags.clear();
                ok(status, Value::Null)
            }
            _ => Err(ApiError::InvalidRequest("unsupported metadef request".to_string())),
        }
    }
}

fn insert(set: &mut BTreeSet<ResourceName>, name: &ResourceName, status: u16) -> Result<ApiResponse, ApiError> {
    if !set.insert(name.clone()) {
        return conflict(name.as_str());
    }
    ok(status, json!({ "name": name.as_str() }))
}

fn present(set: &BTreeSet<ResourceName>, name: &ResourceName, status: u16) -> Result<ApiResponse, ApiError> {
    if set.contains(name) { ok(status, json!({ "name": name.as_str() })) } else { Err(ApiError::NotFound) }
}

fn remove(set: &mut BTreeSet<ResourceName>, name: &ResourceName, status: u16) -> Result<ApiResponse, ApiError> {
    if set.remove(name) { ok(status, Value::Null) } else { Err(ApiError::NotFound) }
}

#[async_trait]
impl ImageApi for FakeImageService {
    async fn invoke(
        &self,
        credential: &Credential,
        request: &ApiRequest,
    ) -> Result<ApiResponse, ApiError> {
        let view = self.identity.view_of(&credential.token).ok_or_else(|| ApiError::UnexpectedStatus {
            status: 401,
            body: "unknown token".to_string(),
        })?;
        let operation = request.operation();
        let mut catalog = self.catalog.lock().unwrap();
        if catalog.quirks.forbidden.contains(&operation) {
            return Err(ApiError::Forbidden);
        }
        let expectation = self.oracle.expect(&TrialQuery {
            operation,
            actor: &view,
            subject: catalog.subject(request),
        });
        match expectation.outcome {
            Outcome::Forbidden => Err(ApiError::Forbidden),
            Outcome::NotFound => Err(ApiError::NotFound),
            Outcome::Success(status) => catalog.apply(&self.oracle, request, &view, &expectation, status),
        }
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAudit {
    pub trials: Mutex<Vec<TrialAuditEvent>>,
    pub scenarios: Mutex<Vec<ScenarioAuditEvent>>,
}

impl TrialAuditSink for RecordingAudit {
    fn record(&self, event: &TrialAuditEvent) {
        self.trials.lock().unwrap().push(event.clone());
    }

    fn record_scenario(&self, event: &ScenarioAuditEvent) {
        self.scenarios.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Fake services plus a harness wired to them.
pub struct FakeCloud {
    pub identity: Arc<FakeIdentity>,
    pub images: Arc<FakeImageService>,
    pub audit: Arc<RecordingAudit>,
}

impl FakeCloud {
    /// Fake services enforcing the scoped policy.
    pub fn scoped() -> Self {
        Self::with_oracle(Oracle::scoped())
    }

    pub fn with_oracle(oracle: Oracle) -> Self {
        let identity = Arc::new(FakeIdentity::new());
        let images = Arc::new(FakeImageService::new(Arc::clone(&identity), oracle));
        Self {
            identity,
            images,
            audit: Arc::new(RecordingAudit::default()),
        }
    }

    /// Harness expecting the scoped policy, with its lock under `lock_dir`.
    pub fn harness(&self, lock_dir: &Path, enabled: bool) -> Harness {
        Harness::new(HarnessParams {
            identity: Arc::clone(&self.identity) as Arc<dyn IdentityBackend>,
            api: Arc::clone(&self.images) as Arc<dyn ImageApi>,
            oracle: Oracle::scoped(),
            audit: Arc::clone(&self.audit) as Arc<dyn TrialAuditSink>,
            settings: settings(),
            enabled,
            lock_dir: lock_dir.to_path_buf(),
        })
    }

    /// Enabled harness provisioning with `settings` instead of the defaults.
    pub fn harness_with_settings(&self, lock_dir: &Path, settings: RegistrySettings) -> Harness {
        Harness::new(HarnessParams {
            identity: Arc::clone(&self.identity) as Arc<dyn IdentityBackend>,
            api: Arc::clone(&self.images) as Arc<dyn ImageApi>,
            oracle: Oracle::scoped(),
            audit: Arc::clone(&self.audit) as Arc<dyn TrialAuditSink>,
            settings,
            enabled: true,
            lock_dir: lock_dir.to_path_buf(),
        })
    }
}
