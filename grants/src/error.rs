use thiserror::Error;

/// Infrastructure failures during an exchange. Authorization and validation
/// outcomes are never errors: they surface as structured rejections.
#[derive(Error, Debug)]
pub enum GrantError {
    #[error("Token error: {0}")]
    Token(#[from] token::TokenError),

    #[error("Directory lookup error: {0}")]
    Directory(String),
}

pub type Result<T> = std::result::Result<T, GrantError>;
