//! Token-exchange request model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Grant type identifiers as they appear on the wire.
pub mod grant_types {
    pub const CLIENT_CREDENTIALS: &str = "client_credentials";
    pub const IMPERSONATE: &str = "impersonate";
    pub const AUTHORIZATION_CODE: &str = "authorization_code";
}

/// Names of grant-specific request parameters.
pub mod params {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const USERNAME: &str = "username";
}

/// The grant types this provider issues tokens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantType {
    ClientCredentials,
    Impersonate,
}

impl GrantType {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            grant_types::CLIENT_CREDENTIALS => Some(Self::ClientCredentials),
            grant_types::IMPERSONATE => Some(Self::Impersonate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientCredentials => grant_types::CLIENT_CREDENTIALS,
            Self::Impersonate => grant_types::IMPERSONATE,
        }
    }
}

/// One incoming token-exchange request; exists only for the duration of
/// the exchange. The raw grant type is preserved so validation handlers
/// can recognize out-of-scope grants they must reject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantRequest {
    grant_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl GrantRequest {
    pub fn new(grant_type: impl Into<String>) -> Self {
        Self {
            grant_type: grant_type.into(),
            client_id: None,
            client_secret: None,
            access_token: None,
            parameters: HashMap::new(),
        }
    }

    /// A client-credentials request authenticating with id and secret.
    pub fn client_credentials(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        let mut request = Self::new(grant_types::CLIENT_CREDENTIALS);
        request.client_id = Some(client_id.into());
        request.client_secret = Some(client_secret.into());
        request
    }

    /// An impersonate request authenticating with a bearer access token.
    pub fn impersonate(access_token: impl Into<String>, username: impl Into<String>) -> Self {
        let mut request = Self::new(grant_types::IMPERSONATE);
        request.access_token = Some(access_token.into());
        request
            .parameters
            .insert(params::USERNAME.to_string(), username.into());
        request
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// The parsed grant type, or `None` when the wire value names a grant
    /// this provider does not support.
    pub fn grant_type(&self) -> Option<GrantType> {
        GrantType::from_wire(&self.grant_type)
    }

    pub fn raw_grant_type(&self) -> &str {
        &self.grant_type
    }

    pub fn is_impersonate(&self) -> bool {
        self.grant_type == grant_types::IMPERSONATE
    }

    pub fn is_authorization_code(&self) -> bool {
        self.grant_type == grant_types::AUTHORIZATION_CODE
    }

    pub fn has_client_id(&self) -> bool {
        self.client_id.as_deref().map_or(false, |id| !id.is_empty())
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("client_credentials", Some(GrantType::ClientCredentials))]
    #[case("impersonate", Some(GrantType::Impersonate))]
    #[case("password", None)]
    #[case("authorization_code", None)]
    #[case("", None)]
    fn test_grant_type_parsing(#[case] wire: &str, #[case] expected: Option<GrantType>) {
        assert_eq!(GrantType::from_wire(wire), expected);
    }

    #[test]
    fn test_impersonate_request_carries_username_parameter() {
        let request = GrantRequest::impersonate("some-token", "alice");
        assert!(request.is_impersonate());
        assert_eq!(request.parameter(params::USERNAME), Some("alice"));
        assert_eq!(request.access_token.as_deref(), Some("some-token"));
    }

    #[test]
    fn test_empty_client_id_counts_as_absent() {
        let mut request = GrantRequest::new(grant_types::CLIENT_CREDENTIALS);
        assert!(!request.has_client_id());
        request.client_id = Some(String::new());
        assert!(!request.has_client_id());
        request.client_id = Some("svc".into());
        assert!(request.has_client_id());
    }

    #[test]
    fn test_raw_grant_type_preserved_for_unsupported_grants() {
        let request = GrantRequest::new("password");
        assert_eq!(request.grant_type(), None);
        assert_eq!(request.raw_grant_type(), "password");
    }
}
