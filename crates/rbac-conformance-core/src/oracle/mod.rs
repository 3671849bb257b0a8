// crates/rbac-conformance-core/src/oracle/mod.rs
// ============================================================================
// Module: Expectation Oracle
// Description: Pure mapping from (operation, actor, resource) to an outcome.
// Purpose: Provide one auditable decision table for every resource family.
// Dependencies: crate::model
// ============================================================================

//! ## Overview
//! [`Oracle::expect`] derives [`TrialFacts`] for a query, evaluates the
//! configured override entries first (first match wins), and falls back to
//! the built-in scoped table in [`rules`]. Every [`Expectation`] names the
//! entry that produced it so a failing trial points at one table row.
//!
//! Invariants:
//! - Evaluation is pure: the same query always yields the same expectation.
//! - The oracle never returns anything but success(code), Forbidden, NotFound.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod discovery;
pub mod overrides;
pub mod rules;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::model::Expectation;
use crate::model::ListingScope;
use crate::model::Operation;
use crate::model::Outcome;
use crate::model::ProjectId;
use crate::model::ResourceState;
use crate::model::Visibility;

pub use discovery::ActorView;
pub use discovery::ListedItem;
pub use overrides::OverrideOutcome;
pub use overrides::OverrideRule;
pub use overrides::legacy_overrides;
pub use rules::BUILTIN_RULES;
pub use rules::BuiltinRule;
pub use rules::TrialFacts;
pub use rules::Verdict;

// ============================================================================
// SECTION: Queries
// ============================================================================

/// What the operation is aimed at.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// A top-level collection (create without visibility, list).
    Collection,
    /// A create call requesting the given visibility.
    Create(Visibility),
    /// An existing resource.
    Resource(&'a ResourceState),
    /// One membership of an existing image.
    Membership {
        /// The shared image.
        image: &'a ResourceState,
        /// The member project addressed by the call.
        member: &'a ProjectId,
    },
    /// An identifier that does not exist on the service.
    Missing,
}

/// One oracle question.
#[derive(Debug, Clone, Copy)]
pub struct TrialQuery<'a> {
    /// Operation under trial.
    pub operation: Operation,
    /// Acting side.
    pub actor: &'a ActorView,
    /// Target of the operation.
    pub subject: Subject<'a>,
}

// ============================================================================
// SECTION: Oracle
// ============================================================================

/// Expectation oracle.
///
/// # Invariants
/// - Behavior is fully determined by the stored override entries and
///   blanket-policy operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Oracle {
    /// Entries evaluated before the built-in table.
    overrides: Vec<OverrideRule>,
    /// Operations whose blanket role policy runs before the target lookup.
    blanket_policy_first: BTreeSet<Operation>,
}

impl Oracle {
    /// Builds an oracle from override entries and blanket-policy operations.
    #[must_use]
    pub const fn new(
        overrides: Vec<OverrideRule>,
        blanket_policy_first: BTreeSet<Operation>,
    ) -> Self {
        Self {
            overrides,
            blanket_policy_first,
        }
    }

    /// Oracle for the scoped policy model with no overrides.
    #[must_use]
    pub fn scoped() -> Self {
        Self::default()
    }

    /// Oracle for the current legacy service posture.
    #[must_use]
    pub fn legacy() -> Self {
        Self::new(legacy_overrides(), BTreeSet::new())
    }

    /// Returns the configured override entries.
    #[must_use]
    pub fn overrides(&self) -> &[OverrideRule] {
        &self.overrides
    }

    /// Derives the facts the decision table evaluates.
    #[must_use]
    pub fn facts(&self, query: &TrialQuery<'_>) -> TrialFacts {
        let descriptor = query.operation.descriptor();
        let actor = query.actor;
        let (state, requested, addressed, missing) = match query.subject {
            Subject::Collection => (None, None, None, false),
            Subject::Create(visibility) => (None, Some(visibility), None, false),
            Subject::Resource(state) => (Some(state), None, None, false),
            Subject::Membership {
                image,
                member,
            } => (Some(image), None, Some(member), false),
            Subject::Missing => (None, None, None, true),
        };
        let discoverable = if missing {
            false
        } else {
            state.is_none_or(|state| {
                discovery::discoverable(
                    descriptor.family,
                    descriptor.access,
                    actor,
                    state,
                )
            })
        };
        TrialFacts {
            operation: query.operation,
            family: descriptor.family,
            access: descriptor.access,
            role: actor.role,
            relation: state.map(|state| state.relation_to(actor.project.as_ref())),
            visibility: state.map(|state| state.visibility).or(requested),
            targeted: descriptor.access.is_targeted() && (state.is_some() || missing),
            discoverable,
            capable: descriptor.family.descriptor().role_ceiling.permits(
                actor.role,
                descriptor.access,
                requested,
            ),
            addresses_self: addressed
                .is_some_and(|member| actor.project.as_ref() == Some(member)),
            blanket_policy_first: self.blanket_policy_first.contains(&query.operation),
        }
    }

    /// Computes the expected outcome for a trial.
    #[must_use]
    pub fn expect(&self, query: &TrialQuery<'_>) -> Expectation {
        let facts = self.facts(query);
        let success = Outcome::Success(query.operation.descriptor().success_status);
        let lists = query.operation.descriptor().listing.is_some();
        if let Some(entry) = self.overrides.iter().find(|entry| entry.matches(&facts)) {
            let outcome = match entry.outcome {
                OverrideOutcome::Success => success,
                OverrideOutcome::Forbidden => Outcome::Forbidden,
                OverrideOutcome::NotFound => Outcome::NotFound,
            };
            return Expectation {
                operation: query.operation,
                outcome,
                rule: entry.name.clone(),
                listing: (lists && outcome.is_success())
                    .then(|| entry.listing.unwrap_or(ListingScope::Filtered)),
            };
        }
        let (verdict, rule) = rules::evaluate(&facts);
        let outcome = match verdict {
            Verdict::Succeed => success,
            Verdict::Forbid => Outcome::Forbidden,
            Verdict::Hide => Outcome::NotFound,
        };
        Expectation {
            operation: query.operation,
            outcome,
            rule: rule.to_string(),
            listing: (lists && outcome.is_success()).then_some(ListingScope::Filtered),
        }
    }

    /// Returns true when a list response covered by the expectation must
    /// contain the item.
    #[must_use]
    pub fn is_listed(
        &self,
        expectation: &Expectation,
        actor: &ActorView,
        item: ListedItem<'_>,
    ) -> bool {
        let Some(kind) = expectation.operation.descriptor().listing else {
            return false;
        };
        match expectation.listing {
            None => false,
            Some(ListingScope::Everything) => true,
            Some(ListingScope::Filtered) => discovery::listable(kind, actor, item),
        }
    }
}
