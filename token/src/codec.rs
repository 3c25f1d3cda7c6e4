//! Signed bearer token encoding and decoding.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation};
use tracing::{debug, warn};

use crate::claims::{AccessClaims, SCHEME_ID_TOKEN};
use crate::config::TokenConfig;
use crate::error::Result;
use crate::keys::KeyProvider;
use crate::ticket::{AuthenticationTicket, TicketPrincipal};

/// Produces and consumes signed bearer tokens for authentication tickets.
///
/// Issuance signs with the active key; validation accepts the active or
/// inactive key so key rotation never invalidates in-flight tokens. A token
/// that fails validation is not an error: expired and malformed tokens are
/// routine client behavior and both yield an absent ticket, distinguished
/// only in the logs.
pub struct TokenCodec {
    provider: Arc<dyn KeyProvider>,
    config: TokenConfig,
}

impl TokenCodec {
    pub fn new(provider: Arc<dyn KeyProvider>, config: TokenConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Sign the ticket into a compact JWT. The header `kid` carries the
    /// active key's fingerprint so validators can pick the right key.
    pub async fn issue(&self, ticket: &AuthenticationTicket) -> Result<String> {
        let keys = self.provider.signing_keys().await?;
        keys.validate()?;

        let claims = AccessClaims {
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            sub: ticket.principal.name.clone(),
            name: ticket.principal.name.clone(),
            roles: ticket.principal.roles.clone(),
            iat: ticket.issued_at.timestamp(),
            exp: ticket.expires_at.timestamp(),
        };

        let mut header = Header::new(Algorithm::EdDSA);
        header.kid = Some(keys.active.fingerprint().to_string());

        let token = jsonwebtoken::encode(&header, &claims, &keys.active.encoding_key()?)?;
        debug!(principal = %ticket.principal.name, "issued bearer token");
        Ok(token)
    }

    /// Verify a bearer token and reconstruct its ticket.
    ///
    /// Returns `Ok(None)` for expired tokens and for structurally invalid
    /// ones (bad signature, garbage input); the caller treats both as an
    /// anonymous/failed authentication. `Err` is reserved for faults of the
    /// key provider itself.
    pub async fn validate(&self, token: &str) -> Result<Option<AuthenticationTicket>> {
        let keys = self.provider.signing_keys().await?;
        keys.validate()?;

        let header = match jsonwebtoken::decode_header(token) {
            Ok(header) => header,
            Err(err) => {
                warn!(error = %err, "rejecting malformed bearer token");
                return Ok(None);
            }
        };

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.leeway = self.config.leeway_seconds;

        let mut last_err = None;
        for key in keys.keys_for(header.kid.as_deref()) {
            match jsonwebtoken::decode::<AccessClaims>(token, &key.decoding_key()?, &validation) {
                Ok(data) => return Ok(Some(ticket_from_claims(data.claims))),
                Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => {
                    // Signature checked out; the token is simply past its
                    // window. Logged apart from malformed tokens for audit.
                    debug!("rejecting expired bearer token");
                    return Ok(None);
                }
                Err(err) => last_err = Some(err),
            }
        }

        match last_err {
            Some(err) => warn!(error = %err, "rejecting bearer token with invalid signature or claims"),
            None => warn!("rejecting bearer token: no signing keys available"),
        }
        Ok(None)
    }
}

fn ticket_from_claims(claims: AccessClaims) -> AuthenticationTicket {
    let issued_at = timestamp_or_now(claims.iat);
    let expires_at = timestamp_or_now(claims.exp);
    let principal = TicketPrincipal::new(claims.name, claims.roles);
    AuthenticationTicket::new(principal, SCHEME_ID_TOKEN, issued_at, expires_at)
}

fn timestamp_or_now(epoch_seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(epoch_seconds, 0).unwrap_or_else(Utc::now)
}
