//! Role lookup collaborator.

use std::collections::HashMap;

use async_trait::async_trait;
use identity::{normalize_role_name, Role};

use crate::error::Result;
use crate::graph::RoleGraph;

/// Read access to the role catalog. Lookups are case-insensitive; a missing
/// role is `Ok(None)`, never an error.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>>;
}

/// In-memory role store for tests and embedded use.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleStore {
    roles: HashMap<String, Role>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with the built-in roles.
    pub fn with_built_ins() -> Self {
        let mut store = Self::new();
        for role in RoleGraph::built_in_roles() {
            store.insert(role);
        }
        store
    }

    pub fn insert(&mut self, role: Role) {
        self.roles.insert(role.name.clone(), role);
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        Ok(self.roles.get(&normalize_role_name(name)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let store = MemoryRoleStore::with_built_ins();

        let role = store.find_by_name("administrator").await.unwrap();
        assert_eq!(role.unwrap().name, "ADMINISTRATOR");
    }

    #[tokio::test]
    async fn test_missing_role_is_none_not_error() {
        let store = MemoryRoleStore::with_built_ins();
        assert!(store.find_by_name("Editor").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_custom_roles_can_be_added() {
        let mut store = MemoryRoleStore::with_built_ins();
        store.insert(Role::new("Editor", Some("Can edit content".into())));

        let role = store.find_by_name("EDITOR").await.unwrap().unwrap();
        assert_eq!(role.display_name, "Editor");
    }
}
