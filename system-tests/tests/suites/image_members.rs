// system-tests/tests/suites/image_members.rs
// ============================================================================
// Module: Image Member Suite
// Description: Sharing matrix: add, show, list, accept and remove members.
// Purpose: Check the deployment's policy decisions for every persona.
// Dependencies: system-tests helpers
// ============================================================================

use rbac_conformance_core::Persona;
use rbac_conformance_core::ResourceFamily;

use crate::helpers::scenarios::run_family;

#[tokio::test(flavor = "multi_thread")]
async fn image_members_as_project_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ImageMember, Persona::ProjectAdmin).await
}

#[tokio::test(flavor = "multi_thread")]
async fn image_members_as_project_member() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ImageMember, Persona::ProjectMember).await
}

#[tokio::test(flavor = "multi_thread")]
async fn image_members_as_project_reader() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ImageMember, Persona::ProjectReader).await
}

#[tokio::test(flavor = "multi_thread")]
async fn image_members_as_project_alt_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ImageMember, Persona::ProjectAltAdmin).await
}

#[tokio::test(flavor = "multi_thread")]
async fn image_members_as_project_alt_member() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ImageMember, Persona::ProjectAltMember).await
}

#[tokio::test(flavor = "multi_thread")]
async fn image_members_as_project_alt_reader() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ImageMember, Persona::ProjectAltReader).await
}

#[tokio::test(flavor = "multi_thread")]
async fn image_members_as_system_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ImageMember, Persona::SystemAdmin).await
}
