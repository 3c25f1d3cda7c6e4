use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Signing key error: {0}")]
    Key(String),

    #[error("Key provider error: {0}")]
    KeyProvider(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, TokenError>;
