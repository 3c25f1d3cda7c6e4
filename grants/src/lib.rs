//! Token-exchange grants: request validation and end-to-end issuance.
//!
//! A request flows through the ordered [`GrantHandlerChain`]; the first
//! rejection is terminal and surfaces as a structured OAuth error body.
//! Authorized requests resolve a principal (the application itself for
//! client-credentials, the target user for impersonate) and receive a
//! signed bearer token.

pub mod directory;
pub mod error;
pub mod exchange;
pub mod handlers;
pub mod rejection;
pub mod request;

pub use directory::{
    hash_secret, ClientDirectory, MemoryClientDirectory, MemoryUserDirectory, UserDirectory,
};
pub use error::{GrantError, Result};
pub use exchange::{ClientExchangeService, ExchangeOutcome, IssuedToken};
pub use handlers::{
    ChainOutcome, ExchangeOptions, GrantContext, GrantHandler, GrantHandlerChain, HandlerDecision,
    ValidateAccessToken, ValidateClientId,
};
pub use rejection::{error_codes, TokenRejection};
pub use request::{grant_types, params, GrantRequest, GrantType};
