//! Static definition of built-in roles and their delegation relations.

use std::collections::HashMap;

use identity::{normalize_role_name, Role};

/// Built-in role names, in display casing.
pub mod builtin {
    pub const BASIC: &str = "Basic";
    pub const APPLICATION_MANAGER: &str = "ApplicationManager";
    pub const ROLE_MANAGER: &str = "RoleManager";
    pub const IMPERSONATOR: &str = "Impersonator";
    pub const ADMINISTRATOR: &str = "Administrator";
}

/// The enumerated delegation table: `(role, grantor)` where holders of the
/// grantor role may assign the role to other principals. Built-ins delegate
/// to exactly `Administrator` or to nothing.
const BUILT_IN_ROLES: &[(&str, Option<&str>)] = &[
    (builtin::BASIC, None),
    (builtin::APPLICATION_MANAGER, Some(builtin::ADMINISTRATOR)),
    (builtin::ROLE_MANAGER, Some(builtin::ADMINISTRATOR)),
    (builtin::IMPERSONATOR, Some(builtin::ADMINISTRATOR)),
    (builtin::ADMINISTRATOR, None),
];

/// Static role/delegation configuration, read once at startup.
///
/// The delegation relation is a fixed acyclic single-hop mapping; unknown
/// role names simply yield no delegation. There are no mutation operations.
#[derive(Debug, Clone)]
pub struct RoleGraph {
    delegations: HashMap<String, Option<String>>,
}

impl RoleGraph {
    /// Build the graph from the built-in table.
    pub fn new() -> Self {
        let delegations = BUILT_IN_ROLES
            .iter()
            .map(|(role, grantor)| {
                (
                    normalize_role_name(role),
                    grantor.map(normalize_role_name),
                )
            })
            .collect();
        Self { delegations }
    }

    /// The role whose holders may delegate `role`, if any. Single hop only:
    /// no transitive closure over custom role chains.
    pub fn delegates(&self, role: &str) -> Option<&str> {
        self.delegations
            .get(&normalize_role_name(role))
            .and_then(|grantor| grantor.as_deref())
    }

    pub fn is_builtin(&self, role: &str) -> bool {
        self.delegations.contains_key(&normalize_role_name(role))
    }

    /// Materialize the built-in roles, e.g. to seed a role store.
    pub fn built_in_roles() -> Vec<Role> {
        BUILT_IN_ROLES
            .iter()
            .map(|(name, grantor)| {
                let role = Role::new(*name, None);
                match grantor {
                    Some(grantor) => role.delegated_by(grantor),
                    None => role,
                }
            })
            .collect()
    }
}

impl Default for RoleGraph {
    fn default() -> Self {
        Self::new()
    }
}
