// crates/rbac-conformance-engine/src/runner.rs
// ============================================================================
// Module: Trial Runner
// Description: Executes one operation as one actor and judges the outcome.
// Purpose: Compare observed outcomes with oracle expectations, with context.
// Dependencies: rbac-conformance-clients, rbac-conformance-core
// ============================================================================

//! ## Overview
//! A trial is exactly one `invoke` call: no retries. The observed outcome
//! either satisfies the [`Expectation`] or becomes a [`TrialFailure`]
//! carrying the actor, role, operation, resource, expected and actual
//! outcome, and the decision table entry. List trials additionally check
//! every fixture item against the listing predicate and collect every
//! mismatch instead of stopping at the first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use rbac_conformance_clients::ApiRequest;
use rbac_conformance_clients::ApiResponse;
use rbac_conformance_clients::ImageApi;
use rbac_conformance_core::Expectation;
use rbac_conformance_core::ListedItem;
use rbac_conformance_core::ListingKind;
use rbac_conformance_core::ObservedOutcome;
use rbac_conformance_core::Operation;
use rbac_conformance_core::Oracle;
use rbac_conformance_core::Outcome;
use rbac_conformance_core::RoleKind;
use rbac_conformance_core::Subject;
use rbac_conformance_core::TrialQuery;
use serde_json::Value;
use thiserror::Error;

use crate::audit::TrialAuditEvent;
use crate::audit::TrialAuditEventParams;
use crate::audit::TrialAuditSink;
use crate::audit::TrialVerdict;
use crate::registry::Actor;

/// Rule reported when a deleted resource is looked up again.
pub const DELETED_RULE: &str = "deleted_resource";
/// Rule reported when an identifier that never existed is looked up.
pub const UNKNOWN_ID_RULE: &str = "unknown_identifier";
/// Rule reported when a collection must be empty after a bulk delete.
pub const EMPTIED_RULE: &str = "emptied_collection";

// ============================================================================
// SECTION: Results
// ============================================================================

/// A trial whose outcome matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResult {
    /// Expectation the trial was judged against.
    pub expectation: Expectation,
    /// Response body on expected success.
    pub response: Option<ApiResponse>,
}

/// What went wrong in a failed trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The call produced the wrong outcome.
    Outcome(ObservedOutcome),
    /// A list response omitted an item the actor should see.
    MissingFromListing(String),
    /// A list response included an item the actor should not see.
    UnexpectedInListing(String),
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outcome(observed) => write!(f, "got {observed}"),
            Self::MissingFromListing(item) => write!(f, "listing lacks {item}"),
            Self::UnexpectedInListing(item) => write!(f, "listing shows {item}"),
        }
    }
}

/// A trial that did not match its expectation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{actor} ({role}) {operation} on {resource}: expected {expected}, {mismatch} [rule {rule}]")]
pub struct TrialFailure {
    /// Persona name or ad hoc label.
    pub actor: String,
    /// Actor role.
    pub role: RoleKind,
    /// Operation under trial.
    pub operation: Operation,
    /// Resource identifier label.
    pub resource: String,
    /// Expected outcome.
    pub expected: Outcome,
    /// Observed deviation.
    pub mismatch: Mismatch,
    /// Decision table entry behind the expectation.
    pub rule: String,
}

/// One fixture item a list call is checked for.
#[derive(Debug, Clone, Copy)]
pub struct ListingCandidate<'a> {
    /// Identifier as it appears in the list response.
    pub id: &'a str,
    /// Oracle view of the item.
    pub item: ListedItem<'a>,
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes trials against the image service.
#[derive(Clone, Copy)]
pub struct TrialRunner<'a> {
    /// Image service.
    api: &'a dyn ImageApi,
    /// Expectation oracle.
    oracle: &'a Oracle,
    /// Audit sink.
    audit: &'a dyn TrialAuditSink,
}

impl<'a> TrialRunner<'a> {
    /// Creates a runner.
    #[must_use]
    pub const fn new(
        api: &'a dyn ImageApi,
        oracle: &'a Oracle,
        audit: &'a dyn TrialAuditSink,
    ) -> Self {
        Self {
            api,
            oracle,
            audit,
        }
    }

    /// Returns the oracle the runner judges with.
    #[must_use]
    pub const fn oracle(&self) -> &'a Oracle {
        self.oracle
    }

    /// Asks the oracle and runs the trial.
    ///
    /// # Errors
    ///
    /// Returns [`TrialFailure`] when the observed outcome does not match.
    pub async fn run(
        &self,
        actor: &Actor,
        request: &ApiRequest,
        subject: Subject<'_>,
    ) -> Result<TrialResult, TrialFailure> {
        let view = actor.view();
        let expectation = self.oracle.expect(&TrialQuery {
            operation: request.operation(),
            actor: &view,
            subject,
        });
        self.run_expecting(actor, request, expectation).await
    }

    /// Runs the trial against an explicit expectation.
    ///
    /// # Errors
    ///
    /// Returns [`TrialFailure`] when the observed outcome does not match.
    pub async fn run_expecting(
        &self,
        actor: &Actor,
        request: &ApiRequest,
        expectation: Expectation,
    ) -> Result<TrialResult, TrialFailure> {
        let result = self.api.invoke(actor.credential(), request).await;
        let observed = match &result {
            Ok(response) => response.observed(),
            Err(err) => err.observed(),
        };
        let resource = request.resource_label();
        let passed = observed.satisfies(expectation.outcome);
        self.audit.record(&TrialAuditEvent::new(TrialAuditEventParams {
            persona: actor.label().to_string(),
            role: actor.role(),
            operation: expectation.operation,
            resource: resource.clone(),
            expected: expectation.outcome.to_string(),
            actual: observed.to_string(),
            verdict: if passed { TrialVerdict::Pass } else { TrialVerdict::Fail },
            rule: expectation.rule.clone(),
        }));
        if !passed {
            return Err(TrialFailure {
                actor: actor.label().to_string(),
                role: actor.role(),
                operation: expectation.operation,
                resource,
                expected: expectation.outcome,
                mismatch: Mismatch::Outcome(observed),
                rule: expectation.rule,
            });
        }
        Ok(TrialResult {
            expectation,
            response: result.ok(),
        })
    }

    /// Runs a lookup that must come back NotFound whatever the actor's role.
    ///
    /// # Errors
    ///
    /// Returns [`TrialFailure`] when the resource is still found.
    pub async fn confirm_absent(
        &self,
        actor: &Actor,
        request: &ApiRequest,
        rule: &str,
    ) -> Result<TrialResult, TrialFailure> {
        let expectation = Expectation {
            operation: request.operation(),
            outcome: Outcome::NotFound,
            rule: rule.to_string(),
            listing: None,
        };
        self.run_expecting(actor, request, expectation).await
    }

    /// Runs a list call that must succeed with no items under `key`.
    ///
    /// # Errors
    ///
    /// Returns the outcome mismatch, or one failure per leftover item.
    pub async fn confirm_empty(
        &self,
        actor: &Actor,
        request: &ApiRequest,
        key: &str,
    ) -> Result<TrialResult, Vec<TrialFailure>> {
        let operation = request.operation();
        let expectation = Expectation {
            operation,
            outcome: Outcome::Success(operation.descriptor().success_status),
            rule: EMPTIED_RULE.to_string(),
            listing: None,
        };
        let result =
            self.run_expecting(actor, request, expectation).await.map_err(|failure| vec![failure])?;
        let leftovers: Vec<TrialFailure> = result
            .response
            .as_ref()
            .map(|response| response.items(key))
            .unwrap_or_default()
            .iter()
            .map(|item| TrialFailure {
                actor: actor.label().to_string(),
                role: actor.role(),
                operation,
                resource: request.resource_label(),
                expected: result.expectation.outcome,
                mismatch: Mismatch::UnexpectedInListing(item_label(item)),
                rule: EMPTIED_RULE.to_string(),
            })
            .collect();
        if leftovers.is_empty() { Ok(result) } else { Err(leftovers) }
    }

    /// Runs a list trial and checks every candidate against the listing rule.
    ///
    /// # Errors
    ///
    /// Returns every [`TrialFailure`] found: the outcome mismatch alone, or
    /// one failure per misplaced item.
    pub async fn run_listing(
        &self,
        actor: &Actor,
        request: &ApiRequest,
        subject: Subject<'_>,
        candidates: &[ListingCandidate<'_>],
    ) -> Result<TrialResult, Vec<TrialFailure>> {
        let result = self.run(actor, request, subject).await.map_err(|failure| vec![failure])?;
        let (Some(kind), Some(response)) =
            (request.operation().descriptor().listing, result.response.as_ref())
        else {
            return Ok(result);
        };
        if result.expectation.listing.is_none() {
            return Ok(result);
        }
        let listed = listed_ids(kind, response);
        let view = actor.view();
        let mut failures = Vec::new();
        for candidate in candidates {
            let expected = self.oracle.is_listed(&result.expectation, &view, candidate.item);
            let actual = listed.contains(candidate.id);
            self.audit.record(&TrialAuditEvent::new(TrialAuditEventParams {
                persona: actor.label().to_string(),
                role: actor.role(),
                operation: result.expectation.operation,
                resource: candidate.id.to_string(),
                expected: listing_label(expected).to_string(),
                actual: listing_label(actual).to_string(),
                verdict: if expected == actual { TrialVerdict::Pass } else { TrialVerdict::Fail },
                rule: result.expectation.rule.clone(),
            }));
            if expected == actual {
                continue;
            }
            let mismatch = if expected {
                Mismatch::MissingFromListing(candidate.id.to_string())
            } else {
                Mismatch::UnexpectedInListing(candidate.id.to_string())
            };
            failures.push(TrialFailure {
                actor: actor.label().to_string(),
                role: actor.role(),
                operation: result.expectation.operation,
                resource: request.resource_label(),
                expected: result.expectation.outcome,
                mismatch,
                rule: result.expectation.rule.clone(),
            });
        }
        if failures.is_empty() { Ok(result) } else { Err(failures) }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// List key and identifier field for each listing kind.
const fn listing_fields(kind: ListingKind) -> (&'static str, &'static str) {
    match kind {
        ListingKind::Images => ("images", "id"),
        ListingKind::Namespaces => ("namespaces", "namespace"),
        ListingKind::Members => ("members", "member_id"),
    }
}

/// Identifiers present in a list response.
fn listed_ids(kind: ListingKind, response: &ApiResponse) -> BTreeSet<&str> {
    let (key, field) = listing_fields(kind);
    response.items(key).iter().filter_map(|item| item.get(field).and_then(Value::as_str)).collect()
}

/// Name of a list item, or its JSON text.
fn item_label(item: &Value) -> String {
    item.get("name").and_then(Value::as_str).map_or_else(|| item.to_string(), ToString::to_string)
}

/// Audit label for listing presence.
const fn listing_label(listed: bool) -> &'static str {
    if listed { "listed" } else { "unlisted" }
}
