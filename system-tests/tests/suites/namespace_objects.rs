// system-tests/tests/suites/namespace_objects.rs
// ============================================================================
// Module: Metadef Object Suite
// Description: Object matrix inside public and private namespaces.
// Purpose: Check the deployment's policy decisions for every persona.
// Dependencies: system-tests helpers
// ============================================================================

use rbac_conformance_core::Persona;
use rbac_conformance_core::ResourceFamily;

use crate::helpers::scenarios::run_family;

#[tokio::test(flavor = "multi_thread")]
async fn namespace_objects_as_project_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceObject, Persona::ProjectAdmin).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_objects_as_project_member() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceObject, Persona::ProjectMember).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_objects_as_project_reader() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceObject, Persona::ProjectReader).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_objects_as_project_alt_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceObject, Persona::ProjectAltAdmin).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_objects_as_project_alt_member() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceObject, Persona::ProjectAltMember).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_objects_as_project_alt_reader() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceObject, Persona::ProjectAltReader).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_objects_as_system_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::NamespaceObject, Persona::SystemAdmin).await
}
