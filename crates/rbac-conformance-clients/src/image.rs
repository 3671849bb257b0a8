// crates/rbac-conformance-clients/src/image.rs
// ============================================================================
// Module: Image Service Client
// Description: Executes image API requests and classifies responses.
// Purpose: Turn one credential plus one request into one observed outcome.
// Dependencies: async-trait, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! [`ImageApi`] is the seam between trial runners and the image service.
//! [`GlanceImageApi`] sends requests under the `/v2` root with the caller's
//! token and maps statuses: 403 to [`ApiError::Forbidden`], 404 to
//! [`ApiError::NotFound`], other non-2xx to [`ApiError::UnexpectedStatus`].
//! List calls follow `next` links and merge pages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use crate::http::AUTH_TOKEN_HEADER;
use crate::http::HttpSettings;
use crate::http::endpoint_url;
use crate::http::truncate_body;
use crate::identity::Credential;
use crate::request::ApiError;
use crate::request::ApiRequest;
use crate::request::ApiResponse;
use crate::request::HttpMethod;
use crate::request::IMAGE_PATCH_CONTENT_TYPE;
use crate::request::RequestBody;
use crate::request::RequestShape;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// API version root below the endpoint.
pub const API_ROOT: &str = "v2";
/// Maximum pages followed by one list call; more fails the call.
pub const MAX_LIST_PAGES: usize = 100;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Image-service calls issued on behalf of a credential.
#[async_trait]
pub trait ImageApi: Send + Sync {
    /// Executes one request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for non-2xx responses and transport failures.
    async fn invoke(
        &self,
        credential: &Credential,
        request: &ApiRequest,
    ) -> Result<ApiResponse, ApiError>;
}

// ============================================================================
// SECTION: HTTP Client
// ============================================================================

/// Image service v2 client.
pub struct GlanceImageApi {
    /// Service endpoint (without the version root).
    base_url: Url,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl GlanceImageApi {
    /// Builds a new image client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when the endpoint or client is invalid.
    pub fn new(endpoint: &str, settings: HttpSettings) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(endpoint).map_err(|err| ApiError::InvalidRequest(err.to_string()))?;
        let client = settings.build_client().map_err(ApiError::InvalidRequest)?;
        Ok(Self {
            base_url,
            client,
        })
    }

    /// Sends one page of a request to an absolute URL.
    async fn send(
        &self,
        credential: &Credential,
        shape: &RequestShape,
        url: Url,
    ) -> Result<ApiResponse, ApiError> {
        let method = match shape.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        };
        let mut request =
            self.client.request(method, url).header(AUTH_TOKEN_HEADER, credential.token.as_str());
        request = match &shape.body {
            RequestBody::None => request,
            RequestBody::Json(body) => request.json(body),
            RequestBody::JsonPatch(body) => request
                .header(CONTENT_TYPE, IMAGE_PATCH_CONTENT_TYPE)
                .body(body.to_string()),
            RequestBody::Bytes(data) => {
                request.header(CONTENT_TYPE, "application/octet-stream").body(data.clone())
            }
        };
        let response = request.send().await.map_err(|err| ApiError::Transport(err.to_string()))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| ApiError::Transport(err.to_string()))?;
        match status {
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            status if status.is_success() => {
                let body = if shape.binary_response || bytes.is_empty() {
                    Value::Null
                } else {
                    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
                };
                Ok(ApiResponse {
                    status: status.as_u16(),
                    body,
                    body_len: bytes.len(),
                })
            }
            status => Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate_body(&String::from_utf8_lossy(&bytes)),
            }),
        }
    }

    /// Resolves a `next` link; absolute paths hang off the endpoint.
    fn next_url(&self, next: &str) -> Result<Url, ApiError> {
        let resolved = if next.starts_with('/') {
            Url::parse(&format!("{}{next}", self.base_url.as_str().trim_end_matches('/')))
        } else {
            self.base_url.join(next)
        };
        resolved.map_err(|err| ApiError::InvalidRequest(err.to_string()))
    }
}

#[async_trait]
impl ImageApi for GlanceImageApi {
    async fn invoke(
        &self,
        credential: &Credential,
        request: &ApiRequest,
    ) -> Result<ApiResponse, ApiError> {
        let shape = request.shape();
        let mut segments = Vec::with_capacity(shape.segments.len() + 1);
        segments.push(API_ROOT.to_string());
        segments.extend(shape.segments.iter().cloned());
        let url = endpoint_url(&self.base_url, segments.as_slice(), shape.query.as_slice())
            .map_err(ApiError::InvalidRequest)?;
        let mut response = self.send(credential, &shape, url).await?;
        let Some(key) = paginated_key(request) else {
            return Ok(response);
        };
        let mut pages = 1;
        while let Some(next) = response.str_field("next").map(ToString::to_string) {
            if pages >= MAX_LIST_PAGES {
                return Err(ApiError::Truncated { pages });
            }
            let page = self.send(credential, &shape, self.next_url(&next)?).await?;
            merge_page(&mut response, page, key);
            pages += 1;
        }
        Ok(response)
    }
}

// ============================================================================
// SECTION: Pagination
// ============================================================================

/// Returns the list key of paginated collection requests.
const fn paginated_key(request: &ApiRequest) -> Option<&'static str> {
    match request {
        ApiRequest::ListImages => Some("images"),
        ApiRequest::ListNamespaces => Some("namespaces"),
        _ => None,
    }
}

/// Appends a page's items and carries its `next` link forward.
fn merge_page(into: &mut ApiResponse, page: ApiResponse, key: &str) {
    let ApiResponse {
        body: page_body,
        body_len,
        ..
    } = page;
    into.body_len += body_len;
    let Value::Object(mut page_fields) = page_body else {
        return;
    };
    let items = page_fields.remove(key);
    let next = page_fields.remove("next");
    let Some(fields) = into.body.as_object_mut() else {
        return;
    };
    if let Some(Value::Array(items)) = items
        && let Some(Value::Array(existing)) = fields.get_mut(key)
    {
        existing.extend(items);
    }
    match next {
        Some(next) => {
            fields.insert("next".to_string(), next);
        }
        None => {
            fields.remove("next");
        }
    }
}
