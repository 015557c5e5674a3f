use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

#[derive(Debug, Error, PartialEq)]
pub enum SignatureError {
    #[error("public key is not 32 hex-encoded bytes")]
    InvalidPublicKey,
    #[error("signature header is not 64 hex-encoded bytes")]
    MalformedSignature,
    #[error("request signature does not match")]
    Mismatch,
}

/// Checks that an interaction request was signed by the platform.
/// The signed message is the timestamp header followed by the raw body.
#[derive(Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    pub fn from_hex(public_key: &str) -> Result<Self, SignatureError> {
        let bytes: [u8; 32] = hex::decode(public_key.trim())
            .ok()
            .and_then(|raw| raw.try_into().ok())
            .ok_or(SignatureError::InvalidPublicKey)?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|_| SignatureError::InvalidPublicKey)?;
        Ok(Self { key })
    }

    pub fn verify(&self, signature: &str, timestamp: &str, body: &[u8]) -> Result<(), SignatureError> {
        let bytes: [u8; 64] = hex::decode(signature.trim())
            .ok()
            .and_then(|raw| raw.try_into().ok())
            .ok_or(SignatureError::MalformedSignature)?;
        let signature = Signature::from_bytes(&bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(|_| SignatureError::Mismatch)
    }
}
