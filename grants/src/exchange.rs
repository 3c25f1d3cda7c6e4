//! End-to-end orchestration of one token exchange.

use std::sync::Arc;

use identity::RoleBearer;
use roles::RoleAuthorizer;
use serde::{Deserialize, Serialize};
use token::{AuthenticationTicket, TicketPrincipal, TokenCodec, SCHEME_ID_TOKEN};
use tracing::{info, warn};

use crate::directory::{hash_secret, ClientDirectory, UserDirectory};
use crate::error::Result;
use crate::handlers::{
    ChainOutcome, ExchangeOptions, GrantHandlerChain, ValidateAccessToken, ValidateClientId,
};
use crate::rejection::{error_codes, TokenRejection};
use crate::request::{params, GrantRequest, GrantType};

/// The token endpoint's success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Terminal state of an exchange: a signed token or a structured rejection.
#[derive(Debug, Clone)]
pub enum ExchangeOutcome {
    Issued(IssuedToken),
    Rejected(TokenRejection),
}

impl ExchangeOutcome {
    fn rejected(error: &str, description: impl Into<String>) -> Self {
        Self::Rejected(TokenRejection::new(error, description))
    }
}

enum Resolved {
    Principal(TicketPrincipal),
    Rejected(TokenRejection),
}

/// Orchestrates one exchange: request received, validated by the handler
/// chain, then either rejected (terminal, structured error) or authorized,
/// in which case the resolved principal is wrapped into a ticket, signed,
/// and handed back for sign-in.
///
/// Only the client-credentials and impersonate grants are supported; any
/// other grant type is rejected before the chain runs.
pub struct ClientExchangeService {
    chain: GrantHandlerChain,
    codec: Arc<TokenCodec>,
    clients: Arc<dyn ClientDirectory>,
    users: Arc<dyn UserDirectory>,
}

impl ClientExchangeService {
    pub fn new(
        codec: Arc<TokenCodec>,
        authorizer: Arc<RoleAuthorizer>,
        clients: Arc<dyn ClientDirectory>,
        users: Arc<dyn UserDirectory>,
        options: ExchangeOptions,
    ) -> Self {
        let chain = GrantHandlerChain::new(vec![
            Box::new(ValidateClientId::new(options)),
            Box::new(ValidateAccessToken::new(codec.clone(), authorizer)),
        ]);
        Self {
            chain,
            codec,
            clients,
            users,
        }
    }

    pub async fn exchange(&self, request: &GrantRequest) -> Result<ExchangeOutcome> {
        let Some(grant_type) = request.grant_type() else {
            info!(
                grant_type = request.raw_grant_type(),
                "rejecting unsupported grant type"
            );
            return Ok(ExchangeOutcome::rejected(
                error_codes::UNSUPPORTED_GRANT_TYPE,
                format!(
                    "The '{}' grant type is not supported.",
                    request.raw_grant_type()
                ),
            ));
        };

        let bearer = match self.chain.run(request).await? {
            ChainOutcome::Rejected(rejection) => {
                return Ok(ExchangeOutcome::Rejected(rejection))
            }
            ChainOutcome::Authorized { bearer } => bearer,
        };

        let resolved = match grant_type {
            GrantType::ClientCredentials => self.resolve_client(request).await?,
            GrantType::Impersonate => self.resolve_impersonation(request, bearer.as_ref()).await?,
        };
        let principal = match resolved {
            Resolved::Principal(principal) => principal,
            Resolved::Rejected(rejection) => return Ok(ExchangeOutcome::Rejected(rejection)),
        };

        let ttl = self.codec.config().ttl();
        let ticket = AuthenticationTicket::issue_now(principal, SCHEME_ID_TOKEN, ttl);
        let access_token = self.codec.issue(&ticket).await?;

        info!(
            principal = %ticket.principal.name,
            grant_type = grant_type.as_str(),
            "token issued"
        );
        Ok(ExchangeOutcome::Issued(IssuedToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.codec.config().ttl_seconds,
        }))
    }

    /// Authenticate the application for a client-credentials grant.
    async fn resolve_client(&self, request: &GrantRequest) -> Result<Resolved> {
        let Some(client_id) = request.client_id.as_deref().filter(|id| !id.is_empty()) else {
            // Anonymous clients may pass the chain when accepted, but a
            // client-credentials ticket still needs an authenticated client.
            return Ok(Resolved::Rejected(TokenRejection::new(
                error_codes::INVALID_CLIENT,
                "The mandatory 'client_id' parameter is missing.",
            )));
        };

        let Some(application) = self.clients.find_client(client_id).await? else {
            warn!(client_id, "token request for unknown client");
            return Ok(Resolved::Rejected(TokenRejection::new(
                error_codes::INVALID_CLIENT,
                "The specified 'client_id' is invalid.",
            )));
        };

        if let Some(expected) = application.secret_hash.as_deref() {
            let presented = request.client_secret.as_deref().map(hash_secret);
            if presented.as_deref() != Some(expected) {
                warn!(client_id, "client credential verification failed");
                return Ok(Resolved::Rejected(TokenRejection::new(
                    error_codes::INVALID_CLIENT,
                    "The specified client credentials are invalid.",
                )));
            }
        }

        Ok(Resolved::Principal(TicketPrincipal::new(
            application.client_id.clone(),
            application.role_names(),
        )))
    }

    /// Resolve the user account an authorized impersonate grant targets.
    async fn resolve_impersonation(
        &self,
        request: &GrantRequest,
        bearer: Option<&AuthenticationTicket>,
    ) -> Result<Resolved> {
        let Some(username) = request.parameter(params::USERNAME).filter(|u| !u.is_empty())
        else {
            return Ok(Resolved::Rejected(TokenRejection::new(
                error_codes::INVALID_REQUEST,
                "The mandatory 'username' parameter is missing.",
            )));
        };

        let Some(user) = self.users.find_user(username).await? else {
            warn!(username, "impersonation target not found");
            return Ok(Resolved::Rejected(TokenRejection::new(
                error_codes::INVALID_GRANT,
                "The specified user account does not exist.",
            )));
        };

        let impersonator = bearer
            .map(|ticket| ticket.principal.name.as_str())
            .unwrap_or("Unknown");
        info!(impersonator, username, "impersonation authorized");

        Ok(Resolved::Principal(TicketPrincipal::new(
            user.username.clone(),
            user.role_names(),
        )))
    }
}
