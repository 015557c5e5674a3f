use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoClient;
use gallery_atoms::galleries::{DynamoDocuments, GalleryStore};
use gallery_block::{GalleryContext, PromptSigner};
use gallery_shared::discord::{HttpCommandRegistrar, SignatureError, SignatureVerifier};
use gallery_shared::Settings;

/// Shared across invocations of a warm function
pub struct AppState {
    pub verifier: SignatureVerifier,
    pub gallery: GalleryContext,
}

impl AppState {
    pub fn new(verifier: SignatureVerifier, gallery: GalleryContext) -> Self {
        Self { verifier, gallery }
    }

    pub fn from_settings(settings: &Settings, dynamo_client: DynamoClient) -> Result<Self, SignatureError> {
        let verifier = SignatureVerifier::from_hex(&settings.discord_public_key)?;
        let store = GalleryStore::new(Arc::new(DynamoDocuments::new(
            dynamo_client,
            settings.table_name.clone(),
        )));
        let registrar = Arc::new(HttpCommandRegistrar::new(
            settings.discord_api_base.clone(),
            settings.discord_application_id.clone(),
            settings.discord_bot_token.clone(),
            settings.discord_guild_id.clone(),
        ));
        let signer = PromptSigner::new(&settings.prompt_signing_secret);

        Ok(Self::new(verifier, GalleryContext::new(store, registrar, signer)))
    }
}
