// system-tests/tests/suites/resource_types.rs
// ============================================================================
// Module: Resource Type Suite
// Description: Resource type listing and association matrix.
// Purpose: Check the deployment's policy decisions for every persona.
// Dependencies: system-tests helpers
// ============================================================================

use rbac_conformance_core::Persona;
use rbac_conformance_core::ResourceFamily;

use crate::helpers::scenarios::run_family;

#[tokio::test(flavor = "multi_thread")]
async fn resource_types_as_project_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ResourceTypeAssociation, Persona::ProjectAdmin).await
}

#[tokio::test(flavor = "multi_thread")]
async fn resource_types_as_project_member() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ResourceTypeAssociation, Persona::ProjectMember).await
}

#[tokio::test(flavor = "multi_thread")]
async fn resource_types_as_project_reader() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ResourceTypeAssociation, Persona::ProjectReader).await
}

#[tokio::test(flavor = "multi_thread")]
async fn resource_types_as_project_alt_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ResourceTypeAssociation, Persona::ProjectAltAdmin).await
}

#[tokio::test(flavor = "multi_thread")]
async fn resource_types_as_project_alt_member() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ResourceTypeAssociation, Persona::ProjectAltMember).await
}

#[tokio::test(flavor = "multi_thread")]
async fn resource_types_as_project_alt_reader() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ResourceTypeAssociation, Persona::ProjectAltReader).await
}

#[tokio::test(flavor = "multi_thread")]
async fn resource_types_as_system_admin() -> Result<(), Box<dyn std::error::Error>> {
    run_family(ResourceFamily::ResourceTypeAssociation, Persona::SystemAdmin).await
}
