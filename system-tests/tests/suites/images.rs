// system-tests/tests/suites/images.rs
// ============================================================================
// Module: Image Suite
// Description: Image lifecycle matrix over ownership and visibility.
// Purpose: Check the deployment's policy decisions for every persona.
// Dependencies: system-tests helpers
// ============================================================================

use rbac_conformance_core::Persona;
use rbac_conformance_core::ResourceFamily;

use crate::helpers::scenarios::run_family;

#[tokio::test(flavor = "multi_thread")]
async fn images_as_project_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Image, Persona::ProjectAdmin).await
}

#[tokio::test(flavor = "multi_thread")]
async fn images_as_project_member() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Image, Persona::ProjectMember).await
}

#[tokio::test(flavor = "multi_thread")]
async fn images_as_project_reader() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Image, Persona::ProjectReader).await
}

#[tokio::test(flavor = "multi_thread")]
async fn images_as_project_alt_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Image, Persona::ProjectAltAdmin).await
}

#[tokio::test(flavor = "multi_thread")]
async fn images_as_project_alt_member() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Image, Persona::ProjectAltMember).await
}

#[tokio::test(flavor = "multi_thread")]
async fn images_as_project_alt_reader() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Image, Persona::ProjectAltReader).await
}

#[tokio::test(flavor = "multi_thread")]
async fn images_as_system_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Image, Persona::SystemAdmin).await
}
