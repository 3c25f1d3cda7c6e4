use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Entity already exists: {0}")]
    EntityAlreadyExists(String),
}

pub type Result<T> = std::result::Result<T, IdentityError>;
