//! Application and user lookup collaborators.

use std::collections::HashMap;

use async_trait::async_trait;
use identity::{Application, UserAccount};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Hash a client secret for storage/comparison.
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Lookup of registered machine clients by client id.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn find_client(&self, client_id: &str) -> Result<Option<Application>>;
}

/// Lookup of user accounts targeted by the impersonate grant.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, username: &str) -> Result<Option<UserAccount>>;
}

/// In-memory client directory for tests and embedded use.
#[derive(Debug, Clone, Default)]
pub struct MemoryClientDirectory {
    clients: HashMap<String, Application>,
}

impl MemoryClientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client. A duplicate client id is a conflict, mirroring
    /// the duplicate-key error a persistent directory would raise.
    pub fn register(&mut self, application: Application) -> identity::Result<()> {
        if self.clients.contains_key(&application.client_id) {
            return Err(identity::IdentityError::EntityAlreadyExists(
                application.client_id,
            ));
        }
        self.clients
            .insert(application.client_id.clone(), application);
        Ok(())
    }
}

#[async_trait]
impl ClientDirectory for MemoryClientDirectory {
    async fn find_client(&self, client_id: &str) -> Result<Option<Application>> {
        Ok(self.clients.get(client_id).cloned())
    }
}

/// In-memory user directory for tests and embedded use.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    users: HashMap<String, UserAccount>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, user: UserAccount) -> identity::Result<()> {
        if self.users.contains_key(&user.username) {
            return Err(identity::IdentityError::EntityAlreadyExists(user.username));
        }
        self.users.insert(user.username.clone(), user);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_user(&self, username: &str) -> Result<Option<UserAccount>> {
        Ok(self.users.get(username).cloned())
    }
}
