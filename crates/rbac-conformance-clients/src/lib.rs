// crates/rbac-conformance-clients/src/lib.rs
// ============================================================================
// Module: RBAC Conformance Clients
// Description: HTTP clients for the identity backend and image service.
// Purpose: Provide the service seams used by the conformance engine.
// Dependencies: rbac-conformance-core, reqwest, url
// ============================================================================

//! ## Overview
//! Service clients consumed by the conformance engine. The
//! [`IdentityBackend`] trait issues tokens and administers users, projects,
//! and role grants; the [`ImageApi`] trait executes [`ApiRequest`] values and
//! classifies the response. Both have HTTP implementations here and in-memory
//! fakes in the engine's tests.

pub mod http;
pub mod identity;
pub mod image;
pub mod request;

pub use http::HttpSettings;
pub use identity::Credential;
pub use identity::IdentityBackend;
pub use identity::IdentityError;
pub use identity::KeystoneIdentity;
pub use identity::PasswordAuth;
pub use identity::TokenScope;
pub use image::GlanceImageApi;
pub use image::ImageApi;
pub use request::ApiError;
pub use request::ApiRequest;
pub use request::ApiResponse;
pub use request::HttpMethod;
pub use request::RequestBody;
pub use request::RequestShape;
