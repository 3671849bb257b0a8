// system-tests/tests/suites/namespaces.rs
// ============================================================================
// Module: Metadef Namespace Suite
// Description: Namespace create, show, list, update and delete matrix.
// Purpose: Check the deployment's policy decisions for every persona.
// Dependencies: system-tests helpers
// ============================================================================

use rbac_conformance_core::Persona;
use rbac_conformance_core::ResourceFamily;

use crate::helpers::scenarios::run_family;

#[tokio::test(flavor = "multi_thread")]
async fn namespaces_as_project_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Namespace, Persona::ProjectAdmin).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespaces_as_project_member() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Namespace, Persona::ProjectMember).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespaces_as_project_reader() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Namespace, Persona::ProjectReader).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespaces_as_project_alt_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Namespace, Persona::ProjectAltAdmin).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespaces_as_project_alt_member() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Namespace, Persona::ProjectAltMember).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespaces_as_project_alt_reader() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Namespace, Persona::ProjectAltReader).await
}

#[tokio::test(flavor = "multi_thread")]
async fn namespaces_as_system_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::Namespace, Persona::SystemAdmin).await
}
