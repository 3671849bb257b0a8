// crates/rbac-conformance-core/src/oracle/rules.rs
// ============================================================================
// Module: Built-in Decision Table
// Description: Priority-ordered rules of the scoped policy model.
// Purpose: Keep the NotFound-versus-Forbidden tie-breaks in one table.
// Dependencies: crate::model
// ============================================================================

//! ## Overview
//! Rules are evaluated top to bottom over precomputed [`TrialFacts`]; the
//! first rule whose predicate holds decides the verdict. When nothing
//! matches, the verdict is Forbidden ([`DEFAULT_RULE`]).
//!
//! Order matters:
//! 1. A blanket role deny beats NotFound only for operations configured to
//!    check policy before looking the target up.
//! 2. An undiscoverable target is NotFound.
//! 3. A role that can never perform the access class is Forbidden.
//! 4. Ownership and visibility decide success for the remaining cases.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::model::AccessClass;
use crate::model::Operation;
use crate::model::Relation;
use crate::model::ResourceFamily;
use crate::model::RoleKind;
use crate::model::Visibility;

// ============================================================================
// SECTION: Facts
// ============================================================================

/// Everything the decision table looks at, derived once per trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialFacts {
    /// Operation under trial.
    pub operation: Operation,
    /// Operation family.
    pub family: ResourceFamily,
    /// Access class of the operation.
    pub access: AccessClass,
    /// Actor role.
    pub role: RoleKind,
    /// Actor relation to the target, when there is a target.
    pub relation: Option<Relation>,
    /// Target visibility, or the requested visibility for creates.
    pub visibility: Option<Visibility>,
    /// Whether the operation addresses an existing (or missing) target.
    pub targeted: bool,
    /// Whether the actor can locate the target.
    pub discoverable: bool,
    /// Whether the role may ever perform the access class.
    pub capable: bool,
    /// Whether the addressed membership belongs to the actor's project.
    pub addresses_self: bool,
    /// Whether the operation checks its blanket policy before the lookup.
    pub blanket_policy_first: bool,
}

impl TrialFacts {
    /// Returns true when the role acts with system-wide authority over the
    /// family.
    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.role.is_system_scoped() && self.family.admits_system_scope()
    }

    /// Returns true when the actor's project owns the target.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.relation == Some(Relation::Owner)
    }
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Verdict produced by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Success with the operation's status code.
    Succeed,
    /// Forbidden.
    Forbid,
    /// NotFound.
    Hide,
}

/// One entry of the built-in table.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinRule {
    /// Stable rule name reported with every verdict.
    pub name: &'static str,
    /// Predicate over the trial facts.
    pub applies: fn(&TrialFacts) -> bool,
    /// Verdict when the predicate holds.
    pub verdict: Verdict,
}

/// Name reported when no rule matches.
pub const DEFAULT_RULE: &str = "default_forbidden";

/// Built-in decision table in priority order.
pub const BUILTIN_RULES: &[BuiltinRule] = &[
    BuiltinRule {
        name: "blanket_policy_first",
        applies: blanket_policy_first,
        verdict: Verdict::Forbid,
    },
    BuiltinRule {
        name: "undiscoverable",
        applies: undiscoverable,
        verdict: Verdict::Hide,
    },
    BuiltinRule {
        name: "role_ceiling",
        applies: role_ceiling,
        verdict: Verdict::Forbid,
    },
    BuiltinRule {
        name: "create_allowed",
        applies: create_allowed,
        verdict: Verdict::Succeed,
    },
    BuiltinRule {
        name: "collection_allowed",
        applies: collection_allowed,
        verdict: Verdict::Succeed,
    },
    BuiltinRule {
        name: "read_discoverable",
        applies: read_discoverable,
        verdict: Verdict::Succeed,
    },
    BuiltinRule {
        name: "owner_mutation",
        applies: owner_mutation,
        verdict: Verdict::Succeed,
    },
    BuiltinRule {
        name: "owner_share_grant",
        applies: owner_share_grant,
        verdict: Verdict::Succeed,
    },
    BuiltinRule {
        name: "member_share_response",
        applies: member_share_response,
        verdict: Verdict::Succeed,
    },
];

/// Evaluates the built-in table, returning the verdict and rule name.
#[must_use]
pub fn evaluate(facts: &TrialFacts) -> (Verdict, &'static str) {
    BUILTIN_RULES
        .iter()
        .find(|rule| (rule.applies)(facts))
        .map_or((Verdict::Forbid, DEFAULT_RULE), |rule| (rule.verdict, rule.name))
}

// ============================================================================
// SECTION: Predicates
// ============================================================================

/// Undiscoverable target, role that can never act, policy checked first.
const fn blanket_policy_first(facts: &TrialFacts) -> bool {
    facts.targeted && !facts.discoverable && !facts.capable && facts.blanket_policy_first
}

/// Target the actor cannot locate.
const fn undiscoverable(facts: &TrialFacts) -> bool {
    facts.targeted && !facts.discoverable
}

/// Role never holds this access class.
const fn role_ceiling(facts: &TrialFacts) -> bool {
    !facts.capable
}

/// Capable role creating a top-level resource.
const fn create_allowed(facts: &TrialFacts) -> bool {
    matches!(facts.access, AccessClass::Create)
}

/// Capable role listing a top-level collection.
const fn collection_allowed(facts: &TrialFacts) -> bool {
    matches!(facts.access, AccessClass::ListCollection)
}

/// Discoverable target read or downloaded by a capable role.
const fn read_discoverable(facts: &TrialFacts) -> bool {
    matches!(facts.access, AccessClass::Read | AccessClass::Download)
}

/// Owner (or system authority) mutating or deleting.
fn owner_mutation(facts: &TrialFacts) -> bool {
    matches!(facts.access, AccessClass::Write | AccessClass::Delete)
        && (facts.is_owner() || facts.is_global())
}

/// Owner granting or revoking a share on a shared resource.
fn owner_share_grant(facts: &TrialFacts) -> bool {
    facts.access == AccessClass::ShareGrant
        && (facts.is_owner() || facts.is_global())
        && facts.visibility == Some(Visibility::Shared)
}

/// Member project answering its own share.
const fn member_share_response(facts: &TrialFacts) -> bool {
    matches!(facts.access, AccessClass::ShareRespond) && (facts.addresses_self || facts.is_global())
}
