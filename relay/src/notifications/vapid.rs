//! VAPID credentials for Web Push (RFC 8292).
//!
//! [`VapidCredentials`] is the unvalidated credential set resolved from
//! configuration for a single delivery. [`VapidKeys`] is the validated P-256
//! keypair in the encoding the `web-push` crate expects, and can also
//! generate fresh keys for operators.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine};
use p256::ecdsa::SigningKey;
use p256::elliptic_curve::rand_core::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// VAPID key pair plus contact subject, as configured by the operator.
///
/// Nothing here has been decoded yet; [`VapidCredentials::keys`] does that.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct VapidCredentials {
    public_key: String,
    private_key: String,
    subject: String,
}

impl std::fmt::Debug for VapidCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidCredentials")
            .field("public_key", &self.public_key)
            .field("private_key", &"***")
            .field("subject", &self.subject)
            .finish()
    }
}

impl VapidCredentials {
    /// Bundle a credential set.
    pub fn new(public_key: &str, private_key: &str, subject: &str) -> Self {
        Self {
            public_key: public_key.to_string(),
            private_key: private_key.to_string(),
            subject: subject.to_string(),
        }
    }

    /// Base64url public key as configured.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Base64url private key as configured.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// Contact subject placed in the JWT `sub` claim.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Decode and validate the key pair.
    pub fn keys(&self) -> Result<VapidKeys> {
        VapidKeys::from_base64url(&self.public_key, &self.private_key)
    }
}

/// Validated VAPID keypair.
///
/// The private key is the raw 32-byte P-256 scalar (base64url) and the public
/// key is the uncompressed SEC1 point (65 bytes). The raw scalar is what
/// `VapidSignatureBuilder::from_base64()` accepts.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct VapidKeys {
    /// Raw 32-byte P-256 private key scalar (base64url).
    private_key_b64: String,
    /// Uncompressed public key bytes (base64url, 65 bytes decoded).
    public_key_b64: String,
}

impl std::fmt::Debug for VapidKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidKeys")
            .field("public_key_b64", &self.public_key_b64)
            .field("private_key_b64", &"***")
            .finish()
    }
}

impl VapidKeys {
    /// Generate a fresh VAPID keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = signing_key.verifying_key();

        // SEC1 uncompressed public key (65 bytes: 0x04 || x || y)
        let public_bytes = verifying_key.to_encoded_point(false);

        Self {
            private_key_b64: BASE64URL.encode(signing_key.to_bytes().as_slice()),
            public_key_b64: BASE64URL.encode(public_bytes.as_bytes()),
        }
    }

    /// Base64url-encoded uncompressed public key (65 bytes decoded).
    ///
    /// Browsers pass this as `applicationServerKey` when subscribing.
    pub fn public_key_base64url(&self) -> &str {
        &self.public_key_b64
    }

    /// Base64url-encoded raw 32-byte private key scalar.
    pub fn private_key_base64url(&self) -> &str {
        &self.private_key_b64
    }

    /// Reconstruct from base64url-encoded strings.
    ///
    /// Rejects malformed encodings, wrong lengths, scalars outside the curve
    /// order, and a public key that does not belong to the private key.
    pub fn from_base64url(public_key_b64: &str, private_key_b64: &str) -> Result<Self> {
        let pub_bytes = BASE64URL
            .decode(public_key_b64.trim_end_matches('='))
            .context("Invalid base64url for VAPID public key")?;
        anyhow::ensure!(
            pub_bytes.len() == 65 && pub_bytes[0] == 0x04,
            "VAPID public key must be 65-byte uncompressed P-256 point"
        );

        let priv_bytes = BASE64URL
            .decode(private_key_b64.trim_end_matches('='))
            .context("Invalid base64url for VAPID private key")?;
        anyhow::ensure!(
            priv_bytes.len() == 32,
            "VAPID private key must be 32-byte P-256 scalar, got {} bytes",
            priv_bytes.len()
        );
        let signing_key = SigningKey::from_bytes(priv_bytes.as_slice().into())
            .context("VAPID private key is not a valid P-256 scalar")?;

        let derived = signing_key.verifying_key().to_encoded_point(false);
        anyhow::ensure!(
            derived.as_bytes() == pub_bytes.as_slice(),
            "VAPID public key does not match the private key"
        );

        Ok(Self {
            private_key_b64: BASE64URL.encode(&priv_bytes),
            public_key_b64: BASE64URL.encode(&pub_bytes),
        })
    }
}
