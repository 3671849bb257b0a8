// crates/rbac-conformance-clients/src/request.rs
// ============================================================================
// Module: Image API Requests
// Description: One request variant per consumed image-service operation.
// Purpose: Describe calls as data so runners and fakes share one vocabulary.
// Dependencies: rbac-conformance-core, serde_json
// ============================================================================

//! ## Overview
//! [`ApiRequest`] names every image-service call the conformance engine
//! issues. Each variant maps to exactly one [`Operation`] and to one HTTP
//! shape ([`RequestShape`]): method, path segments under the service root,
//! query pairs, and body. Response bodies and failures are described by
//! [`ApiResponse`] and [`ApiError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use rbac_conformance_core::ImageId;
use rbac_conformance_core::MemberStatus;
use rbac_conformance_core::NamespaceName;
use rbac_conformance_core::ObservedOutcome;
use rbac_conformance_core::Operation;
use rbac_conformance_core::ProjectId;
use rbac_conformance_core::ResourceName;
use rbac_conformance_core::Visibility;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Disk format used for every created image.
pub const IMAGE_DISK_FORMAT: &str = "raw";
/// Container format used for every created image.
pub const IMAGE_CONTAINER_FORMAT: &str = "bare";
/// Media type of image update bodies.
pub const IMAGE_PATCH_CONTENT_TYPE: &str = "application/openstack-images-v2.1-json-patch";
/// Page size requested by list calls.
pub const LIST_PAGE_LIMIT: u32 = 1000;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Image-service call issued by a trial or a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    /// Creates an image record.
    CreateImage {
        /// Image name.
        name: String,
        /// Requested visibility.
        visibility: Visibility,
    },
    /// Shows one image.
    GetImage {
        /// Image identifier.
        image: ImageId,
    },
    /// Lists images of every visibility the caller can see.
    ListImages,
    /// Renames an image through a JSON patch.
    UpdateImage {
        /// Image identifier.
        image: ImageId,
        /// New image name.
        name: String,
    },
    /// Stores image data.
    UploadImage {
        /// Image identifier.
        image: ImageId,
        /// Raw image bytes.
        data: Vec<u8>,
    },
    /// Downloads image data.
    DownloadImage {
        /// Image identifier.
        image: ImageId,
    },
    /// Deletes an image.
    DeleteImage {
        /// Image identifier.
        image: ImageId,
    },
    /// Deactivates an image.
    DeactivateImage {
        /// Image identifier.
        image: ImageId,
    },
    /// Reactivates an image.
    ReactivateImage {
        /// Image identifier.
        image: ImageId,
    },
    /// Shares an image with a project.
    AddMember {
        /// Image identifier.
        image: ImageId,
        /// Member project.
        member: ProjectId,
    },
    /// Shows one image membership.
    GetMember {
        /// Image identifier.
        image: ImageId,
        /// Member project.
        member: ProjectId,
    },
    /// Lists image memberships.
    ListMembers {
        /// Image identifier.
        image: ImageId,
    },
    /// Answers a share.
    UpdateMember {
        /// Image identifier.
        image: ImageId,
        /// Member project.
        member: ProjectId,
        /// New status.
        status: MemberStatus,
    },
    /// Revokes a share.
    DeleteMember {
        /// Image identifier.
        image: ImageId,
        /// Member project.
        member: ProjectId,
    },
    /// Creates a metadef namespace.
    CreateNamespace {
        /// Namespace name.
        namespace: NamespaceName,
        /// Requested visibility.
        visibility: Visibility,
        /// Explicit owner project, when set by an administrator.
        owner: Option<ProjectId>,
    },
    /// Shows a namespace.
    GetNamespace {
        /// Namespace name.
        namespace: NamespaceName,
    },
    /// Lists namespaces.
    ListNamespaces,
    /// Replaces namespace attributes.
    UpdateNamespace {
        /// Namespace name.
        namespace: NamespaceName,
        /// Visibility to keep or set.
        visibility: Visibility,
        /// New description.
        description: String,
    },
    /// Deletes a namespace and its contents.
    DeleteNamespace {
        /// Namespace name.
        namespace: NamespaceName,
    },
    /// Creates a namespace object.
    CreateObject {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Object name.
        name: ResourceName,
    },
    /// Shows a namespace object.
    GetObject {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Object name.
        name: ResourceName,
    },
    /// Lists namespace objects.
    ListObjects {
        /// Parent namespace.
        namespace: NamespaceName,
    },
    /// Replaces a namespace object.
    UpdateObject {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Object name.
        name: ResourceName,
        /// New description.
        description: String,
    },
    /// Deletes a namespace object.
    DeleteObject {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Object name.
        name: ResourceName,
    },
    /// Creates a namespace property.
    CreateProperty {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Property name.
        name: ResourceName,
    },
    /// Shows a namespace property.
    GetProperty {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Property name.
        name: ResourceName,
    },
    /// Lists namespace properties.
    ListProperties {
        /// Parent namespace.
        namespace: NamespaceName,
    },
    /// Replaces a namespace property.
    UpdateProperty {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Property name.
        name: ResourceName,
        /// New title.
        title: String,
    },
    /// Deletes a namespace property.
    DeleteProperty {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Property name.
        name: ResourceName,
    },
    /// Creates one tag.
    CreateTag {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Tag name.
        name: ResourceName,
    },
    /// Creates several tags at once.
    CreateTags {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Tag names.
        names: Vec<ResourceName>,
    },
    /// Shows one tag.
    GetTag {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Tag name.
        name: ResourceName,
    },
    /// Lists tags.
    ListTags {
        /// Parent namespace.
        namespace: NamespaceName,
    },
    /// Renames a tag.
    UpdateTag {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Current tag name.
        name: ResourceName,
        /// New tag name.
        new_name: ResourceName,
    },
    /// Deletes one tag.
    DeleteTag {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Tag name.
        name: ResourceName,
    },
    /// Deletes every tag of a namespace.
    DeleteTags {
        /// Parent namespace.
        namespace: NamespaceName,
    },
    /// Associates a resource type with a namespace.
    CreateResourceTypeAssociation {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Resource type name.
        name: ResourceName,
    },
    /// Lists resource type associations of a namespace.
    ListResourceTypeAssociations {
        /// Parent namespace.
        namespace: NamespaceName,
    },
    /// Removes a resource type association.
    DeleteResourceTypeAssociation {
        /// Parent namespace.
        namespace: NamespaceName,
        /// Resource type name.
        name: ResourceName,
    },
    /// Lists the global resource type catalog.
    ListResourceTypes,
}

impl ApiRequest {
    /// Returns the operation this request performs.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::CreateImage { .. } => Operation::CreateImage,
            Self::GetImage { .. } => Operation::GetImage,
            Self::ListImages => Operation::ListImages,
            Self::UpdateImage { .. } => Operation::UpdateImage,
            Self::UploadImage { .. } => Operation::UploadImage,
            Self::DownloadImage { .. } => Operation::DownloadImage,
            Self::DeleteImage { .. } => Operation::DeleteImage,
            Self::DeactivateImage { .. } => Operation::DeactivateImage,
            Self::ReactivateImage { .. } => Operation::ReactivateImage,
            Self::AddMember { .. } => Operation::AddMember,
            Self::GetMember { .. } => Operation::GetMember,
            Self::ListMembers { .. } => Operation::ListMembers,
            Self::UpdateMember { .. } => Operation::UpdateMember,
            Self::DeleteMember { .. } => Operation::DeleteMember,
            Self::CreateNamespace { .. } => Operation::CreateNamespace,
            Self::GetNamespace { .. } => Operation::GetNamespace,
            Self::ListNamespaces => Operation::ListNamespaces,
            Self::UpdateNamespace { .. } => Operation::UpdateNamespace,
            Self::DeleteNamespace { .. } => Operation::DeleteNamespace,
            Self::CreateObject { .. } => Operation::CreateObject,
            Self::GetObject { .. } => Operation::GetObject,
            Self::ListObjects { .. } => Operation::ListObjects,
            Self::UpdateObject { .. } => Operation::UpdateObject,
            Self::DeleteObject { .. } => Operation::DeleteObject,
            Self::CreateProperty { .. } => Operation::CreateProperty,
            Self::GetProperty { .. } => Operation::GetProperty,
            Self::ListProperties { .. } => Operation::ListProperties,
            Self::UpdateProperty { .. } => Operation::UpdateProperty,
            Self::DeleteProperty { .. } => Operation::DeleteProperty,
            Self::CreateTag { .. } => Operation::CreateTag,
            Self::CreateTags { .. } => Operation::CreateTags,
            Self::GetTag { .. } => Operation::GetTag,
            Self::ListTags { .. } => Operation::ListTags,
            Self::UpdateTag { .. } => Operation::UpdateTag,
            Self::DeleteTag { .. } => Operation::DeleteTag,
            Self::DeleteTags { .. } => Operation::DeleteTags,
            Self::CreateResourceTypeAssociation { .. } => Operation::CreateResourceTypeAssociation,
            Self::ListResourceTypeAssociations { .. } => Operation::ListResourceTypeAssociations,
            Self::DeleteResourceTypeAssociation { .. } => Operation::DeleteResourceTypeAssociation,
            Self::ListResourceTypes => Operation::ListResourceTypes,
        }
    }

    /// Returns a short identifier of the addressed resource for reports.
    #[must_use]
    pub fn resource_label(&self) -> String {
        match self {
            Self::CreateImage { name, .. } => name.clone(),
            Self::ListImages | Self::ListNamespaces | Self::ListResourceTypes => String::new(),
            Self::GetImage { image }
            | Self::UpdateImage { image, .. }
            | Self::UploadImage { image, .. }
            | Self::DownloadImage { image }
            | Self::DeleteImage { image }
            | Self::DeactivateImage { image }
            | Self::ReactivateImage { image }
            | Self::ListMembers { image } => image.to_string(),
            Self::AddMember { image, member }
            | Self::GetMember { image, member }
            | Self::UpdateMember { image, member, .. }
            | Self::DeleteMember { image, member } => format!("{image}/{member}"),
            Self::CreateNamespace { namespace, .. }
            | Self::GetNamespace { namespace }
            | Self::UpdateNamespace { namespace, .. }
            | Self::DeleteNamespace { namespace }
            | Self::ListObjects { namespace }
            | Self::ListProperties { namespace }
            | Self::ListTags { namespace }
            | Self::CreateTags { namespace, .. }
            | Self::DeleteTags { namespace }
            | Self::ListResourceTypeAssociations { namespace } => namespace.to_string(),
            Self::CreateObject { namespace, name }
            | Self::GetObject { namespace, name }
            | Self::UpdateObject { namespace, name, .. }
            | Self::DeleteObject { namespace, name }
            | Self::CreateProperty { namespace, name }
            | Self::GetProperty { namespace, name }
            | Self::UpdateProperty { namespace, name, .. }
            | Self::DeleteProperty { namespace, name }
            | Self::CreateTag { namespace, name }
            | Self::GetTag { namespace, name }
            | Self::UpdateTag { namespace, name, .. }
            | Self::DeleteTag { namespace, name }
            | Self::CreateResourceTypeAssociation { namespace, name }
            | Self::DeleteResourceTypeAssociation { namespace, name } => {
                format!("{namespace}/{name}")
            }
        }
    }

    /// Returns the HTTP shape of the request.
    #[must_use]
    #[allow(clippy::too_many_lines, reason = "One arm per API call keeps the mapping auditable.")]
    pub fn shape(&self) -> RequestShape {
        match self {
            Self::CreateImage { name, visibility } => RequestShape::new(HttpMethod::Post, &["images"])
                .with_body(RequestBody::Json(json!({
                    "name": name,
                    "visibility": visibility.as_str(),
                    "disk_format": IMAGE_DISK_FORMAT,
                    "container_format": IMAGE_CONTAINER_FORMAT,
                }))),
            Self::GetImage { image } => {
                RequestShape::new(HttpMethod::Get, &["images", image.as_str()])
            }
            Self::ListImages => RequestShape::new(HttpMethod::Get, &["images"])
                .with_query("visibility", "all")
                .with_query("limit", &LIST_PAGE_LIMIT.to_string()),
            Self::UpdateImage { image, name } => {
                RequestShape::new(HttpMethod::Patch, &["images", image.as_str()]).with_body(
                    RequestBody::JsonPatch(json!([
                        {"op": "replace", "path": "/name", "value": name}
                    ])),
                )
            }
            Self::UploadImage { image, data } => {
                RequestShape::new(HttpMethod::Put, &["images", image.as_str(), "file"])
                    .with_body(RequestBody::Bytes(data.clone()))
            }
            Self::DownloadImage { image } => {
                RequestShape::new(HttpMethod::Get, &["images", image.as_str(), "file"])
                    .with_binary_response()
            }
            Self::DeleteImage { image } => {
                RequestShape::new(HttpMethod::Delete, &["images", image.as_str()])
            }
            Self::DeactivateImage { image } => RequestShape::new(
                HttpMethod::Post,
                &["images", image.as_str(), "actions", "deactivate"],
            ),
            Self::ReactivateImage { image } => RequestShape::new(
                HttpMethod::Post,
                &["images", image.as_str(), "actions", "reactivate"],
            ),
            Self::AddMember { image, member } => {
                RequestShape::new(HttpMethod::Post, &["images", image.as_str(), "members"])
                    .with_body(RequestBody::Json(json!({"member": member.as_str()})))
            }
            Self::GetMember { image, member } => RequestShape::new(
                HttpMethod::Get,
                &["images", image.as_str(), "members", member.as_str()],
            ),
            Self::ListMembers { image } => {
                RequestShape::new(HttpMethod::Get, &["images", image.as_str(), "members"])
            }
            Self::UpdateMember { image, member, status } => RequestShape::new(
                HttpMethod::Put,
                &["images", image.as_str(), "members", member.as_str()],
            )
            .with_body(RequestBody::Json(json!({"status": status.as_str()}))),
            Self::DeleteMember { image, member } => RequestShape::new(
                HttpMethod::Delete,
                &["images", image.as_str(), "members", member.as_str()],
            ),
            Self::CreateNamespace { namespace, visibility, owner } => {
                let mut body = json!({
                    "namespace": namespace.as_str(),
                    "visibility": visibility.as_str(),
                    "protected": false,
                });
                if let (Some(owner), Some(fields)) = (owner, body.as_object_mut()) {
                    fields.insert("owner".to_string(), Value::String(owner.to_string()));
                }
                RequestShape::new(HttpMethod::Post, &["metadefs", "namespaces"])
                    .with_body(RequestBody::Json(body))
            }
            Self::GetNamespace { namespace } => {
                RequestShape::new(HttpMethod::Get, &namespace_path(namespace, &[]))
            }
            Self::ListNamespaces => RequestShape::new(HttpMethod::Get, &["metadefs", "namespaces"])
                .with_query("limit", &LIST_PAGE_LIMIT.to_string()),
            Self::UpdateNamespace { namespace, visibility, description } => {
                RequestShape::new(HttpMethod::Put, &namespace_path(namespace, &[])).with_body(
                    RequestBody::Json(json!({
                        "namespace": namespace.as_str(),
                        "visibility": visibility.as_str(),
                        "description": description,
                    })),
                )
            }
            Self::DeleteNamespace { namespace } => {
                RequestShape::new(HttpMethod::Delete, &namespace_path(namespace, &[]))
            }
            Self::CreateObject { namespace, name } => {
                RequestShape::new(HttpMethod::Post, &namespace_path(namespace, &["objects"]))
                    .with_body(RequestBody::Json(json!({"name": name.as_str()})))
            }
            Self::GetObject { namespace, name } => RequestShape::new(
                HttpMethod::Get,
                &namespace_path(namespace, &["objects", name.as_str()]),
            ),
            Self::ListObjects { namespace } => {
                RequestShape::new(HttpMethod::Get, &namespace_path(namespace, &["objects"]))
            }
            Self::UpdateObject { namespace, name, description } => RequestShape::new(
                HttpMethod::Put,
                &namespace_path(namespace, &["objects", name.as_str()]),
            )
            .with_body(RequestBody::Json(json!({
                "name": name.as_str(),
                "description": description,
            }))),
            Self::DeleteObject { namespace, name } => RequestShape::new(
                HttpMethod::Delete,
                &namespace_path(namespace, &["objects", name.as_str()]),
            ),
            Self::CreateProperty { namespace, name } => {
                RequestShape::new(HttpMethod::Post, &namespace_path(namespace, &["properties"]))
                    .with_body(RequestBody::Json(json!({
                        "name": name.as_str(),
                        "title": name.as_str(),
                        "type": "string",
                    })))
            }
            Self::GetProperty { namespace, name } => RequestShape::new(
                HttpMethod::Get,
                &namespace_path(namespace, &["properties", name.as_str()]),
            ),
            Self::ListProperties { namespace } => {
                RequestShape::new(HttpMethod::Get, &namespace_path(namespace, &["properties"]))
            }
            Self::UpdateProperty { namespace, name, title } => RequestShape::new(
                HttpMethod::Put,
                &namespace_path(namespace, &["properties", name.as_str()]),
            )
            .with_body(RequestBody::Json(json!({
                "name": name.as_str(),
                "title": title,
                "type": "string",
            }))),
            Self::DeleteProperty { namespace, name } => RequestShape::new(
                HttpMethod::Delete,
                &namespace_path(namespace, &["properties", name.as_str()]),
            ),
            Self::CreateTag { namespace, name } => RequestShape::new(
                HttpMethod::Post,
                &namespace_path(namespace, &["tags", name.as_str()]),
            ),
            Self::CreateTags { namespace, names } => {
                let tags: Vec<Value> =
                    names.iter().map(|name| json!({"name": name.as_str()})).collect();
                RequestShape::new(HttpMethod::Post, &namespace_path(namespace, &["tags"]))
                    .with_body(RequestBody::Json(json!({"tags": tags})))
            }
            Self::GetTag { namespace, name } => RequestShape::new(
                HttpMethod::Get,
                &namespace_path(namespace, &["tags", name.as_str()]),
            ),
            Self::ListTags { namespace } => {
                RequestShape::new(HttpMethod::Get, &namespace_path(namespace, &["tags"]))
            }
            Self::UpdateTag { namespace, name, new_name } => RequestShape::new(
                HttpMethod::Put,
                &namespace_path(namespace, &["tags", name.as_str()]),
            )
            .with_body(RequestBody::Json(json!({"name": new_name.as_str()}))),
            Self::DeleteTag { namespace, name } => RequestShape::new(
                HttpMethod::Delete,
                &namespace_path(namespace, &["tags", name.as_str()]),
            ),
            Self::DeleteTags { namespace } => {
                RequestShape::new(HttpMethod::Delete, &namespace_path(namespace, &["tags"]))
            }
            Self::CreateResourceTypeAssociation { namespace, name } => RequestShape::new(
                HttpMethod::Post,
                &namespace_path(namespace, &["resource_types"]),
            )
            .with_body(RequestBody::Json(json!({"name": name.as_str()}))),
            Self::ListResourceTypeAssociations { namespace } => RequestShape::new(
                HttpMethod::Get,
                &namespace_path(namespace, &["resource_types"]),
            ),
            Self::DeleteResourceTypeAssociation { namespace, name } => RequestShape::new(
                HttpMethod::Delete,
                &namespace_path(namespace, &["resource_types", name.as_str()]),
            ),
            Self::ListResourceTypes => {
                RequestShape::new(HttpMethod::Get, &["metadefs", "resource_types"])
            }
        }
    }
}

/// Path segments of a namespace or one of its children.
fn namespace_path<'a>(namespace: &'a NamespaceName, rest: &[&'a str]) -> Vec<&'a str> {
    let mut segments = vec!["metadefs", "namespaces", namespace.as_str()];
    segments.extend_from_slice(rest);
    segments
}

// ============================================================================
// SECTION: HTTP Shapes
// ============================================================================

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// PATCH.
    Patch,
    /// DELETE.
    Delete,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// No body.
    None,
    /// `application/json` body.
    Json(Value),
    /// Image JSON-patch body.
    JsonPatch(Value),
    /// `application/octet-stream` body.
    Bytes(Vec<u8>),
}

/// Method, path, query, and body of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestShape {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path segments below `/v2`, unescaped.
    pub segments: Vec<String>,
    /// Query pairs.
    pub query: Vec<(String, String)>,
    /// Payload.
    pub body: RequestBody,
    /// Whether the response body is raw data rather than JSON.
    pub binary_response: bool,
}

impl RequestShape {
    /// Creates a body-less shape.
    fn new(method: HttpMethod, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(ToString::to_string).collect(),
            query: Vec::new(),
            body: RequestBody::None,
            binary_response: false,
        }
    }

    /// Adds a query pair.
    fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Sets the payload.
    fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Marks the response as raw data.
    const fn with_binary_response(mut self) -> Self {
        self.binary_response = true;
        self
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Successful (2xx) response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Status code.
    pub status: u16,
    /// Parsed JSON body (`null` when empty or binary).
    pub body: Value,
    /// Number of body bytes received.
    pub body_len: usize,
}

impl ApiResponse {
    /// Returns the observed outcome for this response.
    #[must_use]
    pub const fn observed(&self) -> ObservedOutcome {
        ObservedOutcome::Success {
            status: self.status,
        }
    }

    /// Returns a string field of the body.
    #[must_use]
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.body.get(field).and_then(Value::as_str)
    }

    /// Returns the items of a list body under `key`.
    #[must_use]
    pub fn items(&self, key: &str) -> &[Value] {
        self.body.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Image-service call failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 403 response.
    #[error("forbidden")]
    Forbidden,
    /// 404 response.
    #[error("not found")]
    NotFound,
    /// Any other non-2xx response.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// Status code.
        status: u16,
        /// Response body text (truncated).
        body: String,
    },
    /// No response was received.
    #[error("transport error: {0}")]
    Transport(String),
    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// A listing still had a `next` link after the page limit.
    #[error("listing truncated after {pages} pages")]
    Truncated {
        /// Pages fetched before giving up.
        pages: usize,
    },
}

impl ApiError {
    /// Returns the observed outcome for this failure.
    #[must_use]
    pub fn observed(&self) -> ObservedOutcome {
        match self {
            Self::Forbidden => ObservedOutcome::Forbidden,
            Self::NotFound => ObservedOutcome::NotFound,
            Self::UnexpectedStatus { status, .. } => ObservedOutcome::UnexpectedStatus {
                status: *status,
            },
            Self::Transport(message) | Self::InvalidRequest(message) => {
                ObservedOutcome::Transport {
                    message: message.clone(),
                }
            }
            Self::Truncated { .. } => ObservedOutcome::Transport {
                message: self.to_string(),
            },
        }
    }
}
