use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::InteractionError;

type HmacSha256 = Hmac<Sha256>;

/// The destructive action a confirmation prompt stands for. Travels inside
/// the prompt message itself, so the server keeps no session state.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PendingAction {
    DeleteGallery {
        gallery: String,
    },
    RemoveImage {
        gallery: String,
        index: i64,
        seq: u64,
    },
}

impl PendingAction {
    pub fn gallery(&self) -> &str {
        match self {
            PendingAction::DeleteGallery { gallery } => gallery,
            PendingAction::RemoveImage { gallery, .. } => gallery,
        }
    }
}

/// Signs and verifies the reference carried in a prompt's embed footer:
/// `base64url(json) "." base64url(hmac-sha256(json))`.
#[derive(Clone)]
pub struct PromptSigner {
    key: Vec<u8>,
}

impl PromptSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, InteractionError> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|_| InteractionError::MalformedPrompt("signing key rejected"))
    }

    pub fn sign(&self, action: &PendingAction) -> Result<String, InteractionError> {
        let payload = serde_json::to_vec(action)
            .map_err(|_| InteractionError::MalformedPrompt("payload not serializable"))?;
        let mut mac = self.mac()?;
        mac.update(&payload);
        let tag = mac.finalize().into_bytes();
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(tag)
        ))
    }

    pub fn verify(&self, reference: &str) -> Result<PendingAction, InteractionError> {
        let (payload, tag) = reference
            .trim()
            .split_once('.')
            .ok_or(InteractionError::MalformedPrompt("reference has no signature"))?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| InteractionError::MalformedPrompt("payload is not base64"))?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| InteractionError::MalformedPrompt("signature is not base64"))?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        mac.verify_slice(&tag)
            .map_err(|_| InteractionError::MalformedPrompt("signature mismatch"))?;

        serde_json::from_slice(&payload)
            .map_err(|_| InteractionError::MalformedPrompt("payload is not a pending action"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removal() -> PendingAction {
        PendingAction::RemoveImage {
            gallery: "cats".to_string(),
            index: 2,
            seq: 7,
        }
    }

    #[test]
    fn signed_reference_verifies_back_to_the_action() {
        let signer = PromptSigner::new("secret");
        let reference = signer.sign(&removal()).expect("sign");
        assert_eq!(signer.verify(&reference), Ok(removal()));
        assert_eq!(signer.verify(&reference).expect("verify").gallery(), "cats");
    }

    #[test]
    fn edited_payload_is_rejected() {
        let signer = PromptSigner::new("secret");
        let reference = signer.sign(&removal()).expect("sign");
        let (_, tag) = reference.split_once('.').expect("dot");

        let forged = PendingAction::RemoveImage {
            gallery: "cats".to_string(),
            index: 0,
            seq: 7,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).expect("json"));
        assert_eq!(
            signer.verify(&format!("{forged_payload}.{tag}")),
            Err(InteractionError::MalformedPrompt("signature mismatch"))
        );
    }

    #[test]
    fn other_keys_and_plain_text_are_rejected() {
        let reference = PromptSigner::new("secret").sign(&removal()).expect("sign");
        assert!(PromptSigner::new("other").verify(&reference).is_err());
        assert!(PromptSigner::new("secret").verify("Gallery: cats").is_err());
        assert!(PromptSigner::new("secret").verify("!!.??").is_err());
    }
}
