//! Role-based authorization: the built-in role graph, possession and
//! delegation checks, and role-set mutation.
//!
//! The delegation model is deliberately single-hop: a role names at most
//! one grantor role whose holders may assign it, with `Administrator` as a
//! universal override. Checks are synchronous and side-effect-free; role
//! assignment mutates the in-memory principal and leaves persistence to
//! the caller.

pub mod authorizer;
pub mod error;
pub mod graph;
pub mod store;

pub use authorizer::{RoleAuthorizer, RoleReconciliation};
pub use error::{Result, RoleError};
pub use graph::{builtin, RoleGraph};
pub use store::{MemoryRoleStore, RoleStore};
