// crates/rbac-conformance-clients/src/identity.rs
// ============================================================================
// Module: Identity Backend
// Description: Token issuance and user/project/role administration.
// Purpose: Provision personas against an identity v3 service.
// Dependencies: rbac-conformance-core, async-trait, reqwest, serde_json
// ============================================================================

//! ## Overview
//! [`IdentityBackend`] is the only contract the engine relies on for
//! credentials. [`KeystoneIdentity`] implements it over the identity v3 HTTP
//! API: tokens come back in the `X-Subject-Token` header and every
//! administrative call authenticates with an administrator [`Credential`].
//! Security posture: passwords are never logged or embedded in errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use rbac_conformance_core::ProjectId;
use rbac_conformance_core::RoleId;
use rbac_conformance_core::UserId;
use reqwest::Client;
use reqwest::Method;
use reqwest::Response;
use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::http::AUTH_TOKEN_HEADER;
use crate::http::HttpSettings;
use crate::http::endpoint_url;
use crate::http::truncate_body;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying a freshly issued token.
pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Authenticated token plus the identity it represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Opaque token value.
    pub token: String,
    /// Authenticated user.
    pub user_id: UserId,
    /// Project the token is scoped to; `None` for system scope.
    pub project_id: Option<ProjectId>,
}

/// Password login material.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordAuth {
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
    /// Domain of the user.
    pub domain_id: String,
}

impl std::fmt::Debug for PasswordAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domain_id", &self.domain_id)
            .finish()
    }
}

/// Scope requested for a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenScope {
    /// Project scope by identifier.
    Project(ProjectId),
    /// Project scope by name within a domain.
    ProjectName {
        /// Project name.
        name: String,
        /// Project domain.
        domain_id: String,
    },
    /// System-wide scope.
    System,
}

// ============================================================================
// SECTION: Backend Trait
// ============================================================================

/// Identity operations needed to provision personas.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Issues a token for the user with the requested scope.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when authentication fails.
    async fn issue_token(
        &self,
        auth: &PasswordAuth,
        scope: &TokenScope,
    ) -> Result<Credential, IdentityError>;

    /// Creates a user and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the user cannot be created.
    async fn create_user(
        &self,
        admin: &Credential,
        auth: &PasswordAuth,
        default_project: Option<&ProjectId>,
    ) -> Result<UserId, IdentityError>;

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the user cannot be deleted.
    async fn delete_user(&self, admin: &Credential, user: &UserId) -> Result<(), IdentityError>;

    /// Creates a project and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the project cannot be created.
    async fn create_project(
        &self,
        admin: &Credential,
        name: &str,
        domain_id: &str,
    ) -> Result<ProjectId, IdentityError>;

    /// Deletes a project.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the project cannot be deleted.
    async fn delete_project(
        &self,
        admin: &Credential,
        project: &ProjectId,
    ) -> Result<(), IdentityError>;

    /// Finds a role by name (first match).
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NotFound`] when no role has the name.
    async fn find_role(&self, admin: &Credential, name: &str) -> Result<RoleId, IdentityError>;

    /// Grants a role to a user on a project.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the grant fails.
    async fn grant_project_role(
        &self,
        admin: &Credential,
        project: &ProjectId,
        user: &UserId,
        role: &RoleId,
    ) -> Result<(), IdentityError>;

    /// Grants a system-scoped role to a user.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the grant fails.
    async fn grant_system_role(
        &self,
        admin: &Credential,
        user: &UserId,
        role: &RoleId,
    ) -> Result<(), IdentityError>;
}

// ============================================================================
// SECTION: Keystone Client
// ============================================================================

/// Identity v3 HTTP client.
pub struct KeystoneIdentity {
    /// Identity API base URL (ending in `/v3`).
    base_url: Url,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl KeystoneIdentity {
    /// Builds a new identity client.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the URL or HTTP client is invalid.
    pub fn new(endpoint: &str, settings: HttpSettings) -> Result<Self, IdentityError> {
        let base_url =
            Url::parse(endpoint).map_err(|err| IdentityError::Invalid(err.to_string()))?;
        let client = settings.build_client().map_err(IdentityError::Unavailable)?;
        Ok(Self {
            base_url,
            client,
        })
    }

    /// Sends a request and classifies non-success statuses.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Response, IdentityError> {
        let url = endpoint_url(&self.base_url, segments, query)
            .map_err(IdentityError::Invalid)?;
        let mut request = self.client.request(method, url);
        if let Some(token) = token {
            request = request.header(AUTH_TOKEN_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response =
            request.send().await.map_err(|err| IdentityError::Unavailable(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &truncate_body(&text)))
    }

    /// Sends a request and parses a JSON response body.
    async fn send_json(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Value, IdentityError> {
        let response = self.send(method, segments, query, token, body).await?;
        response.json::<Value>().await.map_err(|err| IdentityError::InvalidResponse(err.to_string()))
    }
}

#[async_trait]
impl IdentityBackend for KeystoneIdentity {
    async fn issue_token(
        &self,
        auth: &PasswordAuth,
        scope: &TokenScope,
    ) -> Result<Credential, IdentityError> {
        let scope_body = match scope {
            TokenScope::Project(project) => json!({"project": {"id": project.as_str()}}),
            TokenScope::ProjectName { name, domain_id } => {
                json!({"project": {"name": name, "domain": {"id": domain_id}}})
            }
            TokenScope::System => json!({"system": {"all": true}}),
        };
        let body = json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": auth.username,
                            "domain": {"id": auth.domain_id},
                            "password": auth.password,
                        }
                    }
                },
                "scope": scope_body,
            }
        });
        let response = self.send(Method::POST, &["auth", "tokens"], &[], None, Some(body)).await?;
        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
            .ok_or_else(|| IdentityError::InvalidResponse("missing subject token".to_string()))?;
        let payload: Value = response
            .json()
            .await
            .map_err(|err| IdentityError::InvalidResponse(err.to_string()))?;
        let user_id = json_str(&payload, &["token", "user", "id"])
            .ok_or_else(|| IdentityError::InvalidResponse("token.user.id missing".to_string()))?;
        let project_id = json_str(&payload, &["token", "project", "id"]).map(ProjectId::new);
        Ok(Credential {
            token,
            user_id: UserId::new(user_id),
            project_id,
        })
    }

    async fn create_user(
        &self,
        admin: &Credential,
        auth: &PasswordAuth,
        default_project: Option<&ProjectId>,
    ) -> Result<UserId, IdentityError> {
        let mut user = json!({
            "name": auth.username,
            "password": auth.password,
            "domain_id": auth.domain_id,
            "enabled": true,
        });
        if let (Some(project), Some(fields)) = (default_project, user.as_object_mut()) {
            fields.insert("default_project_id".to_string(), Value::String(project.to_string()));
        }
        let payload = self
            .send_json(
                Method::POST,
                &["users"],
                &[],
                Some(&admin.token),
                Some(json!({"user": user})),
            )
            .await?;
        json_str(&payload, &["user", "id"])
            .map(UserId::new)
            .ok_or_else(|| IdentityError::InvalidResponse("user.id missing".to_string()))
    }

    async fn delete_user(&self, admin: &Credential, user: &UserId) -> Result<(), IdentityError> {
        self.send(Method::DELETE, &["users", user.as_str()], &[], Some(&admin.token), None)
            .await
            .map(|_| ())
    }

    async fn create_project(
        &self,
        admin: &Credential,
        name: &str,
        domain_id: &str,
    ) -> Result<ProjectId, IdentityError> {
        let body = json!({"project": {"name": name, "domain_id": domain_id, "enabled": true}});
        let payload = self
            .send_json(Method::POST, &["projects"], &[], Some(&admin.token), Some(body))
            .await?;
        json_str(&payload, &["project", "id"])
            .map(ProjectId::new)
            .ok_or_else(|| IdentityError::InvalidResponse("project.id missing".to_string()))
    }

    async fn delete_project(
        &self,
        admin: &Credential,
        project: &ProjectId,
    ) -> Result<(), IdentityError> {
        self.send(Method::DELETE, &["projects", project.as_str()], &[], Some(&admin.token), None)
            .await
            .map(|_| ())
    }

    async fn find_role(&self, admin: &Credential, name: &str) -> Result<RoleId, IdentityError> {
        let payload = self
            .send_json(Method::GET, &["roles"], &[("name", name)], Some(&admin.token), None)
            .await?;
        payload
            .get("roles")
            .and_then(Value::as_array)
            .and_then(|roles| roles.first())
            .and_then(|role| role.get("id"))
            .and_then(Value::as_str)
            .map(RoleId::new)
            .ok_or_else(|| IdentityError::NotFound(format!("role {name}")))
    }

    async fn grant_project_role(
        &self,
        admin: &Credential,
        project: &ProjectId,
        user: &UserId,
        role: &RoleId,
    ) -> Result<(), IdentityError> {
        self.send(
            Method::PUT,
            &["projects", project.as_str(), "users", user.as_str(), "roles", role.as_str()],
            &[],
            Some(&admin.token),
            None,
        )
        .await
        .map(|_| ())
    }

    async fn grant_system_role(
        &self,
        admin: &Credential,
        user: &UserId,
        role: &RoleId,
    ) -> Result<(), IdentityError> {
        self.send(
            Method::PUT,
            &["system", "users", user.as_str(), "roles", role.as_str()],
            &[],
            Some(&admin.token),
            None,
        )
        .await
        .map(|_| ())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identity backend failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The addressed entity does not exist.
    #[error("identity entity not found: {0}")]
    NotFound(String),
    /// Authentication or authorization was refused.
    #[error("identity request denied: {0}")]
    Denied(String),
    /// Any other non-success response.
    #[error("identity request rejected: {0}")]
    Rejected(String),
    /// The response could not be interpreted.
    #[error("invalid identity response: {0}")]
    InvalidResponse(String),
    /// Client configuration is invalid.
    #[error("invalid identity request: {0}")]
    Invalid(String),
    /// The backend could not be reached.
    #[error("identity backend unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a non-success status to an identity error.
fn classify_failure(status: StatusCode, body: &str) -> IdentityError {
    match status {
        StatusCode::NOT_FOUND => IdentityError::NotFound(body.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            IdentityError::Denied(format!("status {status}: {body}"))
        }
        _ => IdentityError::Rejected(format!("status {status}: {body}")),
    }
}

/// Reads a nested string field.
fn json_str(value: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}
