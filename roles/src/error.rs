use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoleError {
    /// A required role is missing from the principal's role claims. Carries
    /// the first missing role in the caller's requested order.
    #[error("Role required: {0}")]
    RoleRequired(String),

    /// The acting principal may not delegate the named role.
    #[error("Role delegation denied: {0}")]
    DelegationDenied(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Principal '{principal}' already has role '{role}'")]
    AlreadyAssigned { principal: String, role: String },

    /// Role store lookup failure (the store itself, not a missing row).
    #[error("Role store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, RoleError>;
