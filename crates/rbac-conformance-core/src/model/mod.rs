// crates/rbac-conformance-core/src/model/mod.rs
// ============================================================================
// Module: Conformance Model
// Description: Personas, resources, operations, and outcomes.
// Purpose: Provide stable, serializable types shared by every crate.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The model describes trials without performing them: who acts
//! ([`Persona`], [`RoleKind`]), on what ([`ResourceFamily`],
//! [`ResourceState`]), doing what ([`Operation`]), and with which result
//! ([`Outcome`], [`ObservedOutcome`]).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod identifiers;
pub mod operation;
pub mod outcome;
pub mod persona;
pub mod resource;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::ImageId;
pub use identifiers::NamespaceName;
pub use identifiers::ProjectId;
pub use identifiers::ResourceName;
pub use identifiers::RoleId;
pub use identifiers::UserId;
pub use operation::AccessClass;
pub use operation::ListingKind;
pub use operation::Operation;
pub use operation::OperationDescriptor;
pub use outcome::Expectation;
pub use outcome::ListingScope;
pub use outcome::ObservedOutcome;
pub use outcome::Outcome;
pub use persona::Persona;
pub use persona::PersonaScope;
pub use persona::ProjectSlot;
pub use persona::RoleKind;
pub use persona::UnknownPersona;
pub use resource::FamilyDescriptor;
pub use resource::MemberStatus;
pub use resource::Relation;
pub use resource::RelationshipModel;
pub use resource::ResourceFamily;
pub use resource::ResourceState;
pub use resource::RoleCeiling;
pub use resource::Visibility;
pub use resource::VisibilityModel;
