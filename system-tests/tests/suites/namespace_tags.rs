// system-tests/tests/suites/namespace_tags.rs
// ============================================================================
// Module: Metadef Tag Suite
// Description: Tag matrix including bulk create and bulk delete.
// Purpose: Check the deployment's policy decisions for every persona.
// Dependencies: system-tests helpers
// ============================================================================

use rbac_conformance_core::Persona;
use rbac_conformance_core::ResourceFamily;

use crate::helpers::scenarios::run_family;

#[tokio::test(flavor = "multi_thread")]
async fn namespace_tags_as_project_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceTag, Persona::ProjectAdmin).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_tags_as_project_member() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceTag, Persona::ProjectMember).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_tags_as_project_reader() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceTag, Persona::ProjectReader).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_tags_as_project_alt_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceTag, Persona::ProjectAltAdmin).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_tags_as_project_alt_member() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceTag, Persona::ProjectAltMember).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_tags_as_project_alt_reader() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceTag, Persona::ProjectAltReader).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_tags_as_system_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceTag, Persona::SystemAdmin).await
}
