// crates/rbac-conformance-engine/src/naming.rs
// ============================================================================
// Module: Fixture Naming
// Description: Random suffixes, passwords, and derived resource names.
// Purpose: Keep generated names collision-free across concurrent scenarios.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! Names embed their owning context (project id, namespace) plus a random
//! suffix. Metadata-definition names share one global namespace on the
//! service, so the owning project id always leads the name.

use rand::Rng;
use rand::distributions::Alphanumeric;
use rbac_conformance_core::ImageId;
use rbac_conformance_core::NamespaceName;
use rbac_conformance_core::ProjectId;
use rbac_conformance_core::ResourceName;
use rbac_conformance_core::Visibility;

/// Length of random name suffixes.
const SUFFIX_LEN: usize = 8;
/// Length of generated passwords.
const PASSWORD_LEN: usize = 24;

/// Random lowercase alphanumeric suffix.
#[must_use]
pub fn random_suffix() -> String {
    random_alphanumeric(SUFFIX_LEN).to_ascii_lowercase()
}

/// Random password for provisioned users.
#[must_use]
pub fn random_password() -> String {
    random_alphanumeric(PASSWORD_LEN)
}

/// Random payload for image uploads.
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0 .. len).map(|_| rng.r#gen::<u8>()).collect()
}

/// Random version-4 UUID text, used as an identifier nothing owns.
#[must_use]
pub fn random_image_id() -> ImageId {
    let mut bytes: [u8; 16] = rand::thread_rng().r#gen();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex: String = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
    ImageId::new(format!(
        "{}-{}-{}-{}-{}",
        &hex[0 .. 8],
        &hex[8 .. 12],
        &hex[12 .. 16],
        &hex[16 .. 20],
        &hex[20 ..]
    ))
}

/// Random alphanumeric string of the given length.
fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

/// `{prefix}-{label}-{suffix}` name for identity entities.
#[must_use]
pub fn identity_name(prefix: &str, label: &str) -> String {
    format!("{prefix}-{label}-{}", random_suffix())
}

/// `{owner}_{visibility}_{suffix}` namespace name.
#[must_use]
pub fn namespace_name(owner: &ProjectId, visibility: Visibility) -> NamespaceName {
    NamespaceName::new(format!("{owner}_{visibility}_namespace-{}", random_suffix()))
}

/// Object name derived from its namespace.
#[must_use]
pub fn object_name(namespace: &NamespaceName) -> ResourceName {
    ResourceName::new(format!("object_of_{namespace}"))
}

/// Property name derived from its namespace.
#[must_use]
pub fn property_name(namespace: &NamespaceName) -> ResourceName {
    ResourceName::new(format!("prop_of_{namespace}"))
}

/// Tag name derived from its namespace.
#[must_use]
pub fn tag_name(namespace: &NamespaceName) -> ResourceName {
    ResourceName::new(format!("tag_of_{namespace}"))
}

/// Resource type association name derived from its namespace.
#[must_use]
pub fn resource_type_name(namespace: &NamespaceName) -> ResourceName {
    ResourceName::new(format!("rs_type_of_{namespace}"))
}

/// Names of the bulk tag set.
#[must_use]
pub fn bulk_tag_names() -> Vec<ResourceName> {
    (1 ..= 3).map(|index| ResourceName::new(format!("tag{index}"))).collect()
}
