//! Signed bearer tokens for authentication tickets.
//!
//! Tokens are EdDSA-signed JWTs. Signing-key rotation keeps an
//! {active, inactive} pair: issuance uses the active key, validation
//! accepts either, so a rotation never invalidates tokens still inside
//! their lifetime. Validation failures are absent tickets, not errors.

pub mod claims;
pub mod codec;
pub mod config;
pub mod error;
pub mod keys;
pub mod ticket;

pub use claims::{claim_types, AccessClaims, SCHEME_ID_TOKEN};
pub use codec::TokenCodec;
pub use config::TokenConfig;
pub use error::{Result, TokenError};
pub use keys::{KeyProvider, SigningKey, SigningKeySet, StaticKeyProvider};
pub use ticket::{AuthenticationTicket, TicketPrincipal};
