//! Authorization decisions for role possession and role delegation.

use std::collections::HashSet;
use std::sync::Arc;

use identity::{normalize_role_name, RoleBearer, RoleJoin};
use tracing::debug;

use crate::error::{Result, RoleError};
use crate::graph::{builtin, RoleGraph};
use crate::store::RoleStore;

/// Result of reconciling a principal's role set against a desired set.
///
/// `removed` carries the dropped role-joins so the caller can track them for
/// deletion when it commits; `added` lists the normalized names of the newly
/// assigned roles. Unchanged roles are untouched and keep their join id.
#[derive(Debug, Default)]
pub struct RoleReconciliation {
    pub removed: Vec<RoleJoin>,
    pub added: Vec<String>,
}

/// Validates role possession and delegation, and mutates principal role
/// sets in memory. Persistence is the caller's job: every mutation here
/// happens on the principal object after all store lookups complete, so a
/// cancelled call leaves no partial side effects.
pub struct RoleAuthorizer {
    graph: RoleGraph,
    store: Arc<dyn RoleStore>,
}

impl RoleAuthorizer {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self {
            graph: RoleGraph::new(),
            store,
        }
    }

    pub fn graph(&self) -> &RoleGraph {
        &self.graph
    }

    /// Check that `claimed` (a principal's role claims) covers every role in
    /// `required`. Fails with the first missing role in `required` order.
    pub fn require_roles(&self, required: &[&str], claimed: &[String]) -> Result<()> {
        let held: HashSet<String> = claimed.iter().map(|r| normalize_role_name(r)).collect();
        for role in required {
            if !held.contains(&normalize_role_name(role)) {
                return Err(RoleError::RoleRequired((*role).to_string()));
            }
        }
        Ok(())
    }

    /// Check that a principal holding `held` roles may delegate each role in
    /// `to_delegate` to another principal.
    ///
    /// A role may be delegated when the acting principal holds it, holds the
    /// role the graph names as its grantor (single hop), or holds
    /// `Administrator`. Fails with the first role that cannot be delegated.
    /// This is the privilege-escalation guard: nobody grants a role they
    /// neither possess nor control.
    pub fn authorize_delegations(&self, to_delegate: &[&str], held: &[String]) -> Result<()> {
        let held: HashSet<String> = held.iter().map(|r| normalize_role_name(r)).collect();
        if held.contains(&normalize_role_name(builtin::ADMINISTRATOR)) {
            return Ok(());
        }
        for role in to_delegate {
            let wanted = normalize_role_name(role);
            if held.contains(&wanted) {
                continue;
            }
            let grantor_held = self
                .graph
                .delegates(&wanted)
                .map(|grantor| held.contains(grantor))
                .unwrap_or(false);
            if !grantor_held {
                return Err(RoleError::DelegationDenied((*role).to_string()));
            }
        }
        Ok(())
    }

    /// Append a role to the principal's role collection.
    ///
    /// Fails with `RoleNotFound` when no role by that name exists and with
    /// `AlreadyAssigned` on a case-insensitive duplicate. The caller commits
    /// the mutation transactionally; concurrent duplicate assignments
    /// surface as the conflict error rather than being retried here.
    pub async fn assign_role<B: RoleBearer + ?Sized>(
        &self,
        bearer: &mut B,
        role_name: &str,
    ) -> Result<()> {
        let role = self
            .store
            .find_by_name(role_name)
            .await?
            .ok_or_else(|| RoleError::RoleNotFound(role_name.to_string()))?;

        if bearer.has_role(&role.name) {
            return Err(RoleError::AlreadyAssigned {
                principal: bearer.name().to_string(),
                role: role_name.to_string(),
            });
        }

        debug!(principal = bearer.name(), role = %role.name, "assigning role");
        bearer.roles_mut().push(RoleJoin::new(role));
        Ok(())
    }

    /// Reconcile the principal's role set to exactly `desired`.
    ///
    /// A set-diff, not delete-then-recreate: joins for roles that stay keep
    /// their identity, joins absent from `desired` are removed and returned
    /// for the caller to mark deleted, and missing roles are added through
    /// [`Self::assign_role`].
    pub async fn reconcile_roles<B: RoleBearer + ?Sized>(
        &self,
        bearer: &mut B,
        desired: &[&str],
    ) -> Result<RoleReconciliation> {
        let mut wanted: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for role in desired {
            let normalized = normalize_role_name(role);
            if seen.insert(normalized.clone()) {
                wanted.push(normalized);
            }
        }

        let mut outcome = RoleReconciliation::default();

        let current = bearer.roles_mut();
        let mut kept = Vec::with_capacity(current.len());
        for join in current.drain(..) {
            if wanted.iter().any(|name| name == join.role_name()) {
                kept.push(join);
            } else {
                outcome.removed.push(join);
            }
        }
        *current = kept;

        for name in &wanted {
            if !bearer.has_role(name) {
                self.assign_role(bearer, name).await?;
                outcome.added.push(name.clone());
            }
        }

        debug!(
            principal = bearer.name(),
            added = outcome.added.len(),
            removed = outcome.removed.len(),
            "reconciled role set"
        );
        Ok(outcome)
    }
}
