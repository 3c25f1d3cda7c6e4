//! Shared identity data model: principals, roles, and role-joins.
//!
//! This crate defines the entities the authorization and token crates
//! operate on. Principal kinds (machine clients and user accounts) expose
//! their role set through the [`RoleBearer`] trait so role assignment and
//! reconciliation logic can be written once for both.

pub mod error;
pub mod principal;
pub mod role;

pub use error::{IdentityError, Result};
pub use principal::{Application, RoleBearer, UserAccount};
pub use role::{normalize_role_name, Role, RoleJoin};
