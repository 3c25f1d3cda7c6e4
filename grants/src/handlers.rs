//! The ordered grant-validation handler chain.
//!
//! Each handler carries a fixed order; the chain runs them ascending and
//! the first rejection is terminal for the request. Orders are spaced 1000
//! apart so a new step can be inserted between existing ones without
//! renumbering.

use std::sync::Arc;

use async_trait::async_trait;
use roles::{builtin, RoleAuthorizer};
use token::{AuthenticationTicket, TokenCodec};
use tracing::debug;

use crate::error::Result;
use crate::rejection::{error_codes, TokenRejection};
use crate::request::GrantRequest;

/// Mutable per-request state threaded through the chain. Handlers that
/// authenticate the caller record the resolved bearer ticket here for the
/// exchange service to consume.
pub struct GrantContext<'a> {
    pub request: &'a GrantRequest,
    pub bearer: Option<AuthenticationTicket>,
}

pub enum HandlerDecision {
    Pass,
    Reject(TokenRejection),
}

#[async_trait]
pub trait GrantHandler: Send + Sync {
    /// Position in the chain; smaller runs first.
    fn order(&self) -> u32;

    fn name(&self) -> &'static str;

    async fn handle(&self, ctx: &mut GrantContext<'_>) -> Result<HandlerDecision>;
}

/// Whether clients may omit `client_id` on non-impersonate grants.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeOptions {
    pub accept_anonymous_clients: bool,
}

impl Default for ExchangeOptions {
    fn default() -> Self {
        Self {
            accept_anonymous_clients: false,
        }
    }
}

/// Requires a `client_id` unless the grant authenticates some other way.
///
/// Impersonate requests pass: they authenticate via the bearer access
/// token, not client credentials. Anything else without a `client_id` is
/// rejected when anonymous clients are disallowed or the request is an
/// authorization-code grant.
pub struct ValidateClientId {
    options: ExchangeOptions,
}

impl ValidateClientId {
    pub const ORDER: u32 = 1000;

    pub fn new(options: ExchangeOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl GrantHandler for ValidateClientId {
    fn order(&self) -> u32 {
        Self::ORDER
    }

    fn name(&self) -> &'static str {
        "validate_client_id"
    }

    async fn handle(&self, ctx: &mut GrantContext<'_>) -> Result<HandlerDecision> {
        if ctx.request.has_client_id() {
            return Ok(HandlerDecision::Pass);
        }
        if ctx.request.is_impersonate() {
            return Ok(HandlerDecision::Pass);
        }
        if !self.options.accept_anonymous_clients || ctx.request.is_authorization_code() {
            return Ok(HandlerDecision::Reject(TokenRejection::new(
                error_codes::INVALID_CLIENT,
                "The mandatory 'client_id' parameter is missing.",
            )));
        }
        Ok(HandlerDecision::Pass)
    }
}

/// Authenticates impersonate requests from their `access_token` parameter
/// and requires the bearer to hold the `Impersonator` role. A no-op for
/// every other grant type.
pub struct ValidateAccessToken {
    codec: Arc<TokenCodec>,
    authorizer: Arc<RoleAuthorizer>,
}

impl ValidateAccessToken {
    pub const ORDER: u32 = 2000;

    pub fn new(codec: Arc<TokenCodec>, authorizer: Arc<RoleAuthorizer>) -> Self {
        Self { codec, authorizer }
    }
}

#[async_trait]
impl GrantHandler for ValidateAccessToken {
    fn order(&self) -> u32 {
        Self::ORDER
    }

    fn name(&self) -> &'static str {
        "validate_access_token"
    }

    async fn handle(&self, ctx: &mut GrantContext<'_>) -> Result<HandlerDecision> {
        if !ctx.request.is_impersonate() {
            return Ok(HandlerDecision::Pass);
        }

        let Some(raw_token) = ctx.request.access_token.as_deref().filter(|t| !t.is_empty())
        else {
            return Ok(HandlerDecision::Reject(TokenRejection::new(
                error_codes::INVALID_REQUEST,
                "The mandatory 'access_token' parameter is missing.",
            )));
        };

        let Some(ticket) = self.codec.validate(raw_token).await? else {
            return Ok(HandlerDecision::Reject(TokenRejection::new(
                error_codes::INVALID_REQUEST,
                "The 'access_token' parameter is not a valid token.",
            )));
        };

        if let Err(err) = self
            .authorizer
            .require_roles(&[builtin::IMPERSONATOR], &ticket.principal.roles)
        {
            debug!(error = %err, "bearer principal may not impersonate");
            let name = match ticket.principal.name.trim() {
                "" => "Unknown",
                name => name,
            };
            return Ok(HandlerDecision::Reject(TokenRejection::new(
                error_codes::UNAUTHORIZED_CLIENT,
                format!("Client '{name}' is not allowed to use the impersonate grant type."),
            )));
        }

        ctx.bearer = Some(ticket);
        Ok(HandlerDecision::Pass)
    }
}

/// Outcome of running the chain over one request.
pub enum ChainOutcome {
    /// Every handler passed; carries the bearer ticket when one was
    /// resolved along the way.
    Authorized { bearer: Option<AuthenticationTicket> },
    Rejected(TokenRejection),
}

/// The ordered pipeline of validation handlers.
pub struct GrantHandlerChain {
    handlers: Vec<Box<dyn GrantHandler>>,
}

impl GrantHandlerChain {
    pub fn new(mut handlers: Vec<Box<dyn GrantHandler>>) -> Self {
        handlers.sort_by_key(|handler| handler.order());
        Self { handlers }
    }

    /// Run the handlers in order. The first rejection is terminal: no
    /// later handler runs and no ticket is issued for the request.
    pub async fn run(&self, request: &GrantRequest) -> Result<ChainOutcome> {
        let mut ctx = GrantContext {
            request,
            bearer: None,
        };
        for handler in &self.handlers {
            match handler.handle(&mut ctx).await? {
                HandlerDecision::Pass => {}
                HandlerDecision::Reject(rejection) => {
                    debug!(
                        handler = handler.name(),
                        error = %rejection.error,
                        "grant request rejected"
                    );
                    return Ok(ChainOutcome::Rejected(rejection));
                }
            }
        }
        Ok(ChainOutcome::Authorized { bearer: ctx.bearer })
    }
}
