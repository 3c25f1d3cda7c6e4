//! Principal kinds and the role-bearing capability trait.

use serde::{Deserialize, Serialize};

use crate::role::{normalize_role_name, RoleJoin};

/// Capability trait for anything that carries a name and a role set.
///
/// Implemented by both principal kinds so role assignment and role-set
/// reconciliation operate on a single abstraction instead of being
/// duplicated per principal type.
pub trait RoleBearer: Send + Sync {
    /// Unique name of the principal (client id for applications, username
    /// for user accounts).
    fn name(&self) -> &str;

    fn roles(&self) -> &[RoleJoin];

    fn roles_mut(&mut self) -> &mut Vec<RoleJoin>;

    /// Case-insensitive role possession check.
    fn has_role(&self, role_name: &str) -> bool {
        let wanted = normalize_role_name(role_name);
        self.roles().iter().any(|join| join.role_name() == wanted)
    }

    /// Normalized names of all held roles, in assignment order.
    fn role_names(&self) -> Vec<String> {
        self.roles()
            .iter()
            .map(|join| join.role_name().to_string())
            .collect()
    }
}

/// A machine client registered with the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub client_id: String,
    pub display_name: String,
    /// Hex SHA-256 of the client secret; `None` for public clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,
    roles: Vec<RoleJoin>,
}

impl Application {
    pub fn new(client_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            display_name: display_name.into(),
            secret_hash: None,
            roles: Vec::new(),
        }
    }

    pub fn with_secret_hash(mut self, secret_hash: impl Into<String>) -> Self {
        self.secret_hash = Some(secret_hash.into());
        self
    }
}

impl RoleBearer for Application {
    fn name(&self) -> &str {
        &self.client_id
    }

    fn roles(&self) -> &[RoleJoin] {
        &self.roles
    }

    fn roles_mut(&mut self) -> &mut Vec<RoleJoin> {
        &mut self.roles
    }
}

/// A user account, the target of the impersonate grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    roles: Vec<RoleJoin>,
}

impl UserAccount {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
            roles: Vec::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl RoleBearer for UserAccount {
    fn name(&self) -> &str {
        &self.username
    }

    fn roles(&self) -> &[RoleJoin] {
        &self.roles
    }

    fn roles_mut(&mut self) -> &mut Vec<RoleJoin> {
        &mut self.roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    #[test]
    fn test_has_role_is_case_insensitive() {
        let mut app = Application::new("svc-reports", "Reporting Service");
        app.roles_mut().push(RoleJoin::new(Role::new("Basic", None)));

        assert!(app.has_role("basic"));
        assert!(app.has_role("BASIC"));
        assert!(!app.has_role("Administrator"));
    }

    #[test]
    fn test_role_names_are_normalized() {
        let mut user = UserAccount::new("alice");
        user.roles_mut()
            .push(RoleJoin::new(Role::new("Impersonator", None)));
        user.roles_mut()
            .push(RoleJoin::new(Role::new("Basic", None)));

        assert_eq!(user.role_names(), vec!["IMPERSONATOR", "BASIC"]);
    }

    #[test]
    fn test_principal_names() {
        let app = Application::new("svc-reports", "Reporting Service");
        let user = UserAccount::new("alice").with_email("alice@example.com");

        assert_eq!(app.name(), "svc-reports");
        assert_eq!(user.name(), "alice");
    }
}
