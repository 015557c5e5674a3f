use std::time::{Duration, Instant};

use gallery_shared::discord::{Interaction, InteractionKind, InteractionResponse, ResponseData};

use crate::commands;
use crate::confirmation;
use crate::error::{EventKind, InteractionError};
use crate::sync::{GALLERY_COMMAND, GALLERY_NAME};
use crate::GalleryContext;

/// The platform drops an interaction that is not answered within this window
pub const RESPONSE_WINDOW: Duration = Duration::from_secs(3);

/// Route one interaction to its handler and build exactly one response.
///
/// Every handler error is turned into a user-visible embed here; nothing is
/// propagated past this point.
pub async fn dispatch(ctx: &GalleryContext, interaction: &Interaction) -> InteractionResponse {
    let started = Instant::now();
    let route = route_name(interaction);
    tracing::info!(
        interaction_id = %interaction.id,
        kind = ?interaction.kind(),
        route = %route,
        "Dispatching interaction"
    );

    let response = match interaction.kind() {
        InteractionKind::Ping => InteractionResponse::pong(),
        InteractionKind::ApplicationCommand => {
            let result = handle_command(ctx, interaction).await;
            InteractionResponse::message(finish(ctx, interaction, &route, result))
        }
        InteractionKind::MessageComponent => {
            match handle_component(ctx, interaction).await {
                // the prompt already shows its outcome; tell only the late clicker
                Err(err @ InteractionError::AlreadyResolved) => {
                    InteractionResponse::message(finish(ctx, interaction, &route, Err(err)).ephemeral())
                }
                result => {
                    InteractionResponse::update(finish(ctx, interaction, &route, result).without_components())
                }
            }
        }
        InteractionKind::Other(code) => {
            let err = InteractionError::unrecognized(EventKind::InteractionType, code.to_string());
            InteractionResponse::message(finish(ctx, interaction, &route, Err(err)))
        }
    };

    let elapsed = started.elapsed();
    if elapsed > RESPONSE_WINDOW {
        tracing::warn!(
            interaction_id = %interaction.id,
            route = %route,
            elapsed_ms = elapsed.as_millis() as u64,
            "Response is late; the platform has likely expired this interaction"
        );
    }
    response
}

/// `gallery/<sub>` for commands, the custom id for components
fn route_name(interaction: &Interaction) -> String {
    match interaction.kind() {
        InteractionKind::ApplicationCommand => format!(
            "{}/{}",
            interaction.command_name().unwrap_or("?"),
            interaction.subcommand().map(|s| s.name.as_str()).unwrap_or("?")
        ),
        InteractionKind::MessageComponent => interaction.custom_id().unwrap_or("?").to_string(),
        InteractionKind::Ping => "ping".to_string(),
        InteractionKind::Other(code) => format!("type {}", code),
    }
}

async fn handle_command(
    ctx: &GalleryContext,
    interaction: &Interaction,
) -> Result<ResponseData, InteractionError> {
    let command = interaction.command_name().unwrap_or_default();
    if command != GALLERY_COMMAND {
        return Err(InteractionError::unrecognized(EventKind::Command, command));
    }
    let sub = interaction
        .subcommand()
        .ok_or_else(|| InteractionError::unrecognized(EventKind::Subcommand, ""))?;

    match sub.name.as_str() {
        "random" => commands::random(ctx, sub).await,
        "pick" => commands::pick(ctx, sub).await,
        "add_image" => commands::add_image(ctx, sub, interaction.invoker()).await,
        "remove_image" => confirmation::prompt_image_removal(ctx, sub).await,
        "create" => commands::create(ctx, sub).await,
        "delete" => confirmation::prompt_gallery_delete(ctx, sub).await,
        other => Err(InteractionError::unrecognized(EventKind::Subcommand, other)),
    }
}

async fn handle_component(
    ctx: &GalleryContext,
    interaction: &Interaction,
) -> Result<ResponseData, InteractionError> {
    let custom_id = interaction
        .custom_id()
        .ok_or_else(|| InteractionError::unrecognized(EventKind::Component, ""))?;
    confirmation::resolve(ctx, interaction, custom_id).await
}

/// Convert a handler result into a payload, logging failures
fn finish(
    ctx: &GalleryContext,
    interaction: &Interaction,
    route: &str,
    result: Result<ResponseData, InteractionError>,
) -> ResponseData {
    let err = match result {
        Ok(data) => return data,
        Err(err) => err,
    };

    if let Some((operation, message)) = err.store_failure() {
        tracing::error!(
            interaction_id = %interaction.id,
            route = %route,
            gallery = %target_gallery(ctx, interaction).unwrap_or_default(),
            operation = %operation,
            "Store unavailable: {}",
            message
        );
    } else if matches!(err, InteractionError::UnrecognizedEvent { .. }) {
        tracing::warn!(interaction_id = %interaction.id, route = %route, "{}", err);
    } else {
        tracing::debug!(interaction_id = %interaction.id, route = %route, "{}", err);
    }
    ResponseData::embed(err.embed())
}

/// Gallery the interaction was about, for operator logs
fn target_gallery(ctx: &GalleryContext, interaction: &Interaction) -> Option<String> {
    match interaction.kind() {
        InteractionKind::ApplicationCommand => interaction
            .subcommand()
            .and_then(|sub| sub.string(GALLERY_NAME))
            .map(str::to_string),
        InteractionKind::MessageComponent => confirmation::pending_action(ctx, interaction)
            .ok()
            .map(|action| action.gallery().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{IMAGE_LINK, IMAGE_NUMBER};
    use crate::testing::{click, command, context, context_with, description, int_opt, string_opt, RecordingRegistrar};
    use async_trait::async_trait;
    use gallery_atoms::galleries::{
        Gallery, GalleryDocuments, GalleryError, GalleryStore, MemoryDocuments, StoreOperation,
    };
    use gallery_shared::discord::response::ERROR_COLOR;
    use serde_json::json;
    use std::sync::Arc;

    fn footer(response: &InteractionResponse) -> String {
        response
            .data
            .as_ref()
            .and_then(|d| d.embeds.first())
            .and_then(|e| e.footer.as_ref())
            .map(|f| f.text.clone())
            .unwrap_or_default()
    }

    fn image_url(response: &InteractionResponse) -> Option<String> {
        response
            .data
            .as_ref()
            .and_then(|d| d.embeds.first())
            .and_then(|e| e.image.as_ref())
            .map(|i| i.url.clone())
    }

    #[tokio::test]
    async fn end_to_end_cats_gallery() {
        let (ctx, registrar) = context();

        let created = dispatch(&ctx, &command("create", json!([string_opt(GALLERY_NAME, "cats")]))).await;
        assert_eq!(description(&created), "Gallery `cats` created :white_check_mark:");
        assert_eq!(registrar.last_choices("pick"), vec!["cats".to_string()]);

        let add = |url: &'static str| {
            command(
                "add_image",
                json!([string_opt(GALLERY_NAME, "cats"), string_opt(IMAGE_LINK, url)]),
            )
        };
        let pick = |n: i64| {
            command(
                "pick",
                json!([string_opt(GALLERY_NAME, "cats"), int_opt(IMAGE_NUMBER, n)]),
            )
        };

        dispatch(&ctx, &add("http://x/1.jpg")).await;
        let first = dispatch(&ctx, &pick(0)).await;
        assert_eq!(image_url(&first).as_deref(), Some("http://x/1.jpg"));
        assert_eq!(footer(&first), "Image: 0 of 0 | Gallery: cats");

        let second_added = dispatch(&ctx, &add("http://x/2.jpg")).await;
        assert_eq!(description(&second_added), "Image `1` created!");
        let second = dispatch(&ctx, &pick(1)).await;
        assert_eq!(image_url(&second).as_deref(), Some("http://x/2.jpg"));
        assert_eq!(footer(&second), "Image: 1 of 1 | Gallery: cats");

        let prompt = dispatch(
            &ctx,
            &command(
                "remove_image",
                json!([string_opt(GALLERY_NAME, "cats"), int_opt(IMAGE_NUMBER, 0)]),
            ),
        )
        .await;
        let removed = dispatch(&ctx, &click(&prompt, "m-cats", "image_delete_yes")).await;
        assert_eq!(description(&removed), "Image `0` removed from `cats` :white_check_mark:");

        let images = ctx.store.get_images("cats").await.expect("images");
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "http://x/2.jpg");
    }

    #[tokio::test]
    async fn unknown_subcommand_gets_a_diagnostic() {
        let (ctx, _) = context();
        let response = dispatch(&ctx, &command("rename", json!([]))).await;
        assert_eq!(response.kind, 4);
        assert_eq!(description(&response), "Invalid subcommand :stop_sign:");
        assert_eq!(
            response.data.as_ref().and_then(|d| d.embeds[0].color),
            Some(ERROR_COLOR)
        );
    }

    #[tokio::test]
    async fn unknown_component_and_interaction_type_are_answered() {
        let (ctx, _) = context();
        let prompt = InteractionResponse::message(ResponseData::text("hello"));
        let response = dispatch(&ctx, &click(&prompt, "m-1", "mystery_button")).await;
        assert!(response.is_update());
        assert!(description(&response).starts_with("I didn't expect to be interacted with"));

        let odd: Interaction =
            serde_json::from_value(json!({ "id": "x", "type": 4 })).expect("interaction");
        let response = dispatch(&ctx, &odd).await;
        assert_eq!(response.kind, 4);
        assert!(description(&response).starts_with("I didn't expect to be interacted with"));
    }

    #[tokio::test]
    async fn ping_is_ponged() {
        let (ctx, _) = context();
        let ping: Interaction =
            serde_json::from_value(json!({ "id": "p", "type": 1 })).expect("ping");
        assert_eq!(dispatch(&ctx, &ping).await, InteractionResponse::pong());
    }

    /// Backend that is reachable for reads but refuses every write
    struct ReadOnly(MemoryDocuments);

    #[async_trait]
    impl GalleryDocuments for ReadOnly {
        async fn load(&self, name: &str) -> Result<Option<Gallery>, GalleryError> {
            self.0.load(name).await
        }
        async fn insert(&self, _: &Gallery) -> Result<bool, GalleryError> {
            Err(GalleryError::unavailable(StoreOperation::Create, "throttled"))
        }
        async fn replace(&self, _: &Gallery, _: u64) -> Result<bool, GalleryError> {
            Err(GalleryError::unavailable(StoreOperation::Write, "throttled"))
        }
        async fn remove(&self, _: &str) -> Result<bool, GalleryError> {
            Err(GalleryError::unavailable(StoreOperation::Delete, "throttled"))
        }
        async fn names(&self) -> Result<Vec<String>, GalleryError> {
            self.0.names().await
        }
        async fn claim(&self, key: &str, expires_at: i64) -> Result<bool, GalleryError> {
            self.0.claim(key, expires_at).await
        }
    }

    #[tokio::test]
    async fn store_outages_become_user_messages() {
        let docs = MemoryDocuments::default();
        docs.insert(&Gallery::new("cats")).await.expect("seed");
        let mut ctx = context_with(Arc::new(RecordingRegistrar::default()));
        ctx.store = GalleryStore::new(Arc::new(ReadOnly(docs)));

        let created = dispatch(&ctx, &command("create", json!([string_opt(GALLERY_NAME, "dogs")]))).await;
        assert_eq!(description(&created), "Unable to create gallery :stop_sign:");

        let added = dispatch(
            &ctx,
            &command(
                "add_image",
                json!([string_opt(GALLERY_NAME, "cats"), string_opt(IMAGE_LINK, "http://x")]),
            ),
        )
        .await;
        assert_eq!(description(&added), "Unable to modify gallery contents :stop_sign:");

        let prompt = dispatch(&ctx, &command("delete", json!([string_opt(GALLERY_NAME, "cats")]))).await;
        let deleted = dispatch(&ctx, &click(&prompt, "m-9", "gallery_delete_yes")).await;
        assert_eq!(description(&deleted), "Unable to delete gallery :stop_sign:");
        assert!(deleted.is_update());
    }
}
