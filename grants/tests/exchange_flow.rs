//! End-to-end exchange flows through the full service stack.

use std::sync::Arc;

use chrono::{Duration, Utc};
use grants::{
    error_codes, ClientExchangeService, ExchangeOptions, ExchangeOutcome, GrantRequest,
    MemoryClientDirectory, MemoryUserDirectory,
};
use identity::Application;
use roles::{MemoryRoleStore, RoleAuthorizer};
use token::{
    AuthenticationTicket, SigningKey, SigningKeySet, StaticKeyProvider, TicketPrincipal,
    TokenCodec, TokenConfig, SCHEME_ID_TOKEN,
};

struct Harness {
    service: ClientExchangeService,
    codec: Arc<TokenCodec>,
}

async fn harness_with_keys(keys: SigningKeySet) -> Harness {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let codec = Arc::new(TokenCodec::new(
        Arc::new(StaticKeyProvider::new(keys)),
        TokenConfig::default(),
    ));
    let authorizer = Arc::new(RoleAuthorizer::new(Arc::new(
        MemoryRoleStore::with_built_ins(),
    )));

    let mut clients = MemoryClientDirectory::new();

    let mut reports = Application::new("svc-reports", "Reporting Service")
        .with_secret_hash(grants::hash_secret("s3cret"));
    authorizer.assign_role(&mut reports, "Basic").await.unwrap();
    clients.register(reports).unwrap();

    let mut admin = Application::new("svc-admin", "Admin Console")
        .with_secret_hash(grants::hash_secret("admin-pw"));
    authorizer.assign_role(&mut admin, "Basic").await.unwrap();
    authorizer
        .assign_role(&mut admin, "Impersonator")
        .await
        .unwrap();
    clients.register(admin).unwrap();

    let mut users = MemoryUserDirectory::new();
    let mut alice = identity::UserAccount::new("alice");
    authorizer.assign_role(&mut alice, "Basic").await.unwrap();
    authorizer
        .assign_role(&mut alice, "RoleManager")
        .await
        .unwrap();
    users.register(alice).unwrap();

    let service = ClientExchangeService::new(
        codec.clone(),
        authorizer,
        Arc::new(clients),
        Arc::new(users),
        ExchangeOptions::default(),
    );
    Harness { service, codec }
}

async fn harness() -> Harness {
    harness_with_keys(SigningKeySet::new(SigningKey::from_seed([11u8; 32]))).await
}

fn issued(outcome: ExchangeOutcome) -> grants::IssuedToken {
    match outcome {
        ExchangeOutcome::Issued(token) => token,
        ExchangeOutcome::Rejected(rejection) => {
            panic!("expected issued token, got rejection: {rejection:?}")
        }
    }
}

fn rejected(outcome: ExchangeOutcome) -> grants::TokenRejection {
    match outcome {
        ExchangeOutcome::Rejected(rejection) => rejection,
        ExchangeOutcome::Issued(_) => panic!("expected rejection, got issued token"),
    }
}

#[tokio::test]
async fn test_client_credentials_exchange_roundtrip() {
    let harness = harness().await;

    let request = GrantRequest::client_credentials("svc-reports", "s3cret");
    let token = issued(harness.service.exchange(&request).await.unwrap());

    assert_eq!(token.token_type, "Bearer");
    assert!(token.expires_in > 0);

    let ticket = harness
        .codec
        .validate(&token.access_token)
        .await
        .unwrap()
        .expect("freshly issued token must validate");
    assert_eq!(ticket.principal.name, "svc-reports");
    assert_eq!(ticket.principal.roles, vec!["BASIC"]);
    assert_eq!(ticket.scheme, SCHEME_ID_TOKEN);
}

#[tokio::test]
async fn test_client_credentials_without_client_id_is_invalid_client() {
    let harness = harness().await;

    let request = GrantRequest::new(grants::grant_types::CLIENT_CREDENTIALS);
    let rejection = rejected(harness.service.exchange(&request).await.unwrap());
    assert_eq!(rejection.error, error_codes::INVALID_CLIENT);
    assert!(rejection.error_description.contains("client_id"));
}

#[tokio::test]
async fn test_unknown_client_is_invalid_client() {
    let harness = harness().await;

    let request = GrantRequest::client_credentials("svc-nope", "whatever");
    let rejection = rejected(harness.service.exchange(&request).await.unwrap());
    assert_eq!(rejection.error, error_codes::INVALID_CLIENT);
}

#[tokio::test]
async fn test_wrong_client_secret_is_invalid_client() {
    let harness = harness().await;

    let request = GrantRequest::client_credentials("svc-reports", "wrong");
    let rejection = rejected(harness.service.exchange(&request).await.unwrap());
    assert_eq!(rejection.error, error_codes::INVALID_CLIENT);
    assert!(rejection.error_description.contains("credentials"));
}

#[tokio::test]
async fn test_impersonate_happy_path() {
    let harness = harness().await;

    // Authenticate the admin client first; its token authorizes the
    // impersonate grant.
    let admin_token = issued(
        harness
            .service
            .exchange(&GrantRequest::client_credentials("svc-admin", "admin-pw"))
            .await
            .unwrap(),
    );

    let request = GrantRequest::impersonate(admin_token.access_token, "alice");
    let token = issued(harness.service.exchange(&request).await.unwrap());

    let ticket = harness
        .codec
        .validate(&token.access_token)
        .await
        .unwrap()
        .expect("impersonation token must validate");
    assert_eq!(ticket.principal.name, "alice");
    let mut roles = ticket.principal.roles.clone();
    roles.sort();
    assert_eq!(roles, vec!["BASIC", "ROLEMANAGER"]);
}

#[tokio::test]
async fn test_impersonate_without_access_token_cites_parameter() {
    let harness = harness().await;

    let request = GrantRequest::new(grants::grant_types::IMPERSONATE)
        .with_parameter(grants::params::USERNAME, "alice");
    let rejection = rejected(harness.service.exchange(&request).await.unwrap());
    assert_eq!(rejection.error, error_codes::INVALID_REQUEST);
    assert!(rejection.error_description.contains("access_token"));
}

#[tokio::test]
async fn test_impersonate_without_impersonator_role_names_principal() {
    let harness = harness().await;

    let reports_token = issued(
        harness
            .service
            .exchange(&GrantRequest::client_credentials("svc-reports", "s3cret"))
            .await
            .unwrap(),
    );

    let request = GrantRequest::impersonate(reports_token.access_token, "alice");
    let rejection = rejected(harness.service.exchange(&request).await.unwrap());
    assert_eq!(rejection.error, error_codes::UNAUTHORIZED_CLIENT);
    assert!(rejection.error_description.contains("svc-reports"));
    assert!(rejection
        .error_description
        .contains("not allowed to use the impersonate grant type"));
}

#[tokio::test]
async fn test_impersonate_with_expired_bearer_is_rejected() {
    let harness = harness().await;

    // Hand-roll a bearer that expired two hours ago.
    let issued_at = Utc::now() - Duration::hours(3);
    let stale = AuthenticationTicket::new(
        TicketPrincipal::new("svc-admin", vec!["Impersonator".into()]),
        SCHEME_ID_TOKEN,
        issued_at,
        issued_at + Duration::hours(1),
    );
    let stale_token = harness.codec.issue(&stale).await.unwrap();

    let request = GrantRequest::impersonate(stale_token, "alice");
    let rejection = rejected(harness.service.exchange(&request).await.unwrap());
    assert_eq!(rejection.error, error_codes::INVALID_REQUEST);
    assert!(rejection.error_description.contains("not a valid token"));
}

#[tokio::test]
async fn test_impersonate_unknown_user_is_invalid_grant() {
    let harness = harness().await;

    let admin_token = issued(
        harness
            .service
            .exchange(&GrantRequest::client_credentials("svc-admin", "admin-pw"))
            .await
            .unwrap(),
    );

    let request = GrantRequest::impersonate(admin_token.access_token, "nobody");
    let rejection = rejected(harness.service.exchange(&request).await.unwrap());
    assert_eq!(rejection.error, error_codes::INVALID_GRANT);
}

#[tokio::test]
async fn test_unsupported_grant_type_fails_fast() {
    let harness = harness().await;

    let request = GrantRequest::new("password");
    let rejection = rejected(harness.service.exchange(&request).await.unwrap());
    assert_eq!(rejection.error, error_codes::UNSUPPORTED_GRANT_TYPE);
    assert!(rejection.error_description.contains("password"));
}

#[tokio::test]
async fn test_key_rotation_keeps_inflight_bearers_usable() {
    let old_key = SigningKey::from_seed([21u8; 32]);
    let new_key = SigningKey::from_seed([22u8; 32]);

    // Bearer issued while the old key was active.
    let before = harness_with_keys(SigningKeySet::new(old_key.clone())).await;
    let admin_token = issued(
        before
            .service
            .exchange(&GrantRequest::client_credentials("svc-admin", "admin-pw"))
            .await
            .unwrap(),
    );

    // After rotation the old key is inactive but still verifies.
    let after = harness_with_keys(SigningKeySet::new(old_key).rotated(new_key)).await;
    let request = GrantRequest::impersonate(admin_token.access_token, "alice");
    let token = issued(after.service.exchange(&request).await.unwrap());

    let ticket = after.codec.validate(&token.access_token).await.unwrap();
    assert_eq!(ticket.unwrap().principal.name, "alice");
}
