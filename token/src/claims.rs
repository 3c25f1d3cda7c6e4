//! JWT claim model for issued access tokens.

use serde::{Deserialize, Serialize};

/// Authentication scheme tag carried by reconstructed tickets.
pub const SCHEME_ID_TOKEN: &str = "id_token";

/// Claim type identifiers used in principal claim sets.
pub mod claim_types {
    pub const SUBJECT: &str = "sub";
    pub const NAME: &str = "name";
    pub const ROLE: &str = "role";
}

/// Claims carried by an issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}
