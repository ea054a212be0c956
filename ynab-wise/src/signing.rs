//! Step-up challenge signing: RSA PKCS#1 v1.5 over SHA-256, base64 encoded.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::Sha256;
use std::path::Path;

pub struct ChallengeSigner {
    key: SigningKey<Sha256>,
}

impl ChallengeSigner {
    /// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) or PKCS#1 (`BEGIN RSA PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let key = match RsaPrivateKey::from_pkcs8_pem(pem) {
            Ok(key) => key,
            Err(_) => RsaPrivateKey::from_pkcs1_pem(pem)
                .context("parse private key (expected PKCS#8 or PKCS#1 PEM)")?,
        };
        Ok(Self {
            key: SigningKey::<Sha256>::new(key),
        })
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let pem = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        Self::from_pem(&pem).with_context(|| format!("load key {}", path.display()))
    }

    pub fn sign(&self, challenge: &str) -> Result<String> {
        let signature = self
            .key
            .try_sign(challenge.as_bytes())
            .context("sign challenge")?;
        Ok(BASE64.encode(signature.to_bytes()))
    }
}
