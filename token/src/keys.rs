//! Ed25519 signing key material and the key-provider collaborator.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::pkcs8::EncodePrivateKey;
use ed25519_dalek::SigningKey as Ed25519SigningKey;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{Result, TokenError};

const ED25519_SEED_LEN: usize = 32;

/// One Ed25519 signing key, identified by the hex SHA-256 of its public key.
///
/// The private half is a raw 32-byte seed; it must never be logged or
/// serialized outside key storage.
#[derive(Debug, Clone)]
pub struct SigningKey {
    fingerprint: String,
    seed: [u8; ED25519_SEED_LEN],
    public: [u8; ED25519_SEED_LEN],
}

impl SigningKey {
    /// Generate a fresh key from OS randomness.
    pub fn generate() -> Self {
        let mut seed = [0u8; ED25519_SEED_LEN];
        rand::thread_rng().fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    /// Rebuild a key from a stored seed; the public key and fingerprint are
    /// derived so they can never disagree with the seed.
    pub fn from_seed(seed: [u8; ED25519_SEED_LEN]) -> Self {
        let public = Ed25519SigningKey::from_bytes(&seed)
            .verifying_key()
            .to_bytes();
        Self {
            fingerprint: hex::encode(Sha256::digest(public)),
            seed,
            public,
        }
    }

    /// Content hash identifying this key; used as the JWT `kid`.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Confirm the public key still matches the private seed.
    pub fn validate(&self) -> Result<()> {
        let expected = Ed25519SigningKey::from_bytes(&self.seed)
            .verifying_key()
            .to_bytes();
        if expected != self.public {
            return Err(TokenError::Key(
                "Ed25519 public key does not match private seed".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn encoding_key(&self) -> Result<EncodingKey> {
        let der = Ed25519SigningKey::from_bytes(&self.seed)
            .to_pkcs8_der()
            .map_err(|err| TokenError::Key(format!("encode Ed25519 key: {err}")))?;
        Ok(EncodingKey::from_ed_der(der.as_bytes()))
    }

    pub(crate) fn decoding_key(&self) -> Result<DecodingKey> {
        let x = URL_SAFE_NO_PAD.encode(self.public);
        DecodingKey::from_ed_components(&x).map_err(TokenError::Jwt)
    }
}

/// The {active, inactive} key pair consumed for issue/validate.
///
/// Issuance always signs with `active`. Validation accepts either key with
/// no coordination, so tokens signed before a rotation stay valid until
/// they expire and rotation never causes an outage.
#[derive(Debug, Clone)]
pub struct SigningKeySet {
    pub active: SigningKey,
    pub inactive: Option<SigningKey>,
}

impl SigningKeySet {
    pub fn new(active: SigningKey) -> Self {
        Self {
            active,
            inactive: None,
        }
    }

    /// The key set after a rotation: the new key signs, the old one is
    /// demoted but still verifies.
    pub fn rotated(self, new_active: SigningKey) -> Self {
        Self {
            active: new_active,
            inactive: Some(self.active),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.active.validate()?;
        if let Some(inactive) = &self.inactive {
            inactive.validate()?;
        }
        Ok(())
    }

    /// Keys in verification order. When the token header carries a `kid`
    /// matching one of the fingerprints, that key is tried first.
    pub fn keys_for(&self, kid: Option<&str>) -> Vec<&SigningKey> {
        let mut keys: Vec<&SigningKey> = std::iter::once(&self.active)
            .chain(self.inactive.iter())
            .collect();
        if let Some(kid) = kid {
            if let Some(pos) = keys.iter().position(|key| key.fingerprint() == kid) {
                keys.rotate_left(pos);
            }
        }
        keys
    }
}

/// Read-only view of the current signing keys. Rotation is owned by an
/// external key-management process; this core only ever reads.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    async fn signing_keys(&self) -> Result<SigningKeySet>;
}

/// Key provider over a fixed key set, for tests and single-process use.
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    keys: SigningKeySet,
}

impl StaticKeyProvider {
    pub fn new(keys: SigningKeySet) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    async fn signing_keys(&self) -> Result<SigningKeySet> {
        Ok(self.keys.clone())
    }
}
