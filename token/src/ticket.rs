//! Authentication tickets: the issued proof of authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use identity::normalize_role_name;

use crate::claims::claim_types;

/// The principal view embedded in a ticket: a name, the normalized role
/// set, and the full claim pairs attached at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPrincipal {
    pub name: String,
    pub roles: Vec<String>,
    pub claims: Vec<(String, String)>,
}

impl TicketPrincipal {
    /// Build the principal with its claim set. The claim set always
    /// includes the identity claims and one role claim per held role.
    pub fn new(name: impl Into<String>, roles: Vec<String>) -> Self {
        let name = name.into();
        let roles: Vec<String> = roles.iter().map(|r| normalize_role_name(r)).collect();

        let mut claims = vec![
            (claim_types::SUBJECT.to_string(), name.clone()),
            (claim_types::NAME.to_string(), name.clone()),
        ];
        for role in &roles {
            claims.push((claim_types::ROLE.to_string(), role.clone()));
        }

        Self {
            name,
            roles,
            claims,
        }
    }

    /// Case-insensitive role claim check.
    pub fn has_role(&self, role_name: &str) -> bool {
        let wanted = normalize_role_name(role_name);
        self.roles.iter().any(|role| *role == wanted)
    }
}

/// The result of a successful exchange: a principal bound to an
/// authentication scheme and an issuance/expiry window. Never mutated
/// after creation; it expires by timestamp comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationTicket {
    pub principal: TicketPrincipal,
    pub scheme: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthenticationTicket {
    pub fn new(
        principal: TicketPrincipal,
        scheme: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            principal,
            scheme: scheme.into(),
            issued_at,
            expires_at,
        }
    }

    /// Stamp a ticket issued now, expiring after `ttl`.
    pub fn issue_now(principal: TicketPrincipal, scheme: impl Into<String>, ttl: Duration) -> Self {
        let issued_at = Utc::now();
        Self::new(principal, scheme, issued_at, issued_at + ttl)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
