use gallery_atoms::galleries::GalleryStore;
use gallery_shared::discord::commands::MAX_CHOICES;
use gallery_shared::discord::{
    ApplicationCommand, CommandChoice, CommandOptionSchema, CommandRegistrar, OptionKind,
};

use crate::error::SyncError;
use crate::GalleryContext;

pub const GALLERY_COMMAND: &str = "gallery";
pub const GALLERY_NAME: &str = "gallery_name";
pub const IMAGE_NUMBER: &str = "image_number";
pub const IMAGE_LINK: &str = "image_link";

/// Sorted, de-duplicated choices, cut to the platform limit
pub fn gallery_choices(names: &[String]) -> Vec<CommandChoice> {
    let mut names: Vec<&str> = names.iter().map(String::as_str).collect();
    names.sort_unstable();
    names.dedup();

    if names.len() > MAX_CHOICES {
        tracing::warn!(
            "{} galleries exist but only the first {} can be offered; the rest cannot be selected through /gallery until others are deleted",
            names.len(),
            MAX_CHOICES
        );
        names.truncate(MAX_CHOICES);
    }
    names.into_iter().map(CommandChoice::same).collect()
}

/// Choice Provider: current gallery names as selectable choices
pub async fn list_choices(store: &GalleryStore) -> Result<Vec<CommandChoice>, SyncError> {
    let names = store.list_names().await?;
    Ok(gallery_choices(&names))
}

fn gallery_option(description: &str, choices: &[CommandChoice]) -> CommandOptionSchema {
    CommandOptionSchema::required(OptionKind::String, GALLERY_NAME, description)
        .with_choices(choices.to_vec())
}

/// Build the `/gallery` command offering `choices` on every gallery option.
/// Each call returns a new tree; nothing is cached between calls.
pub fn gallery_command(choices: &[CommandChoice]) -> ApplicationCommand {
    ApplicationCommand::chat_input(
        GALLERY_COMMAND,
        "Server-wide image gallery",
        vec![
            CommandOptionSchema::subcommand(
                "random",
                "Send a random image from the chosen gallery",
                vec![gallery_option("The gallery to choose from", choices)],
            ),
            CommandOptionSchema::subcommand(
                "pick",
                "Send the specified image from the chosen gallery",
                vec![
                    gallery_option("The gallery to choose from", choices),
                    CommandOptionSchema::required(
                        OptionKind::Integer,
                        IMAGE_NUMBER,
                        "The image you wish to choose",
                    ),
                ],
            ),
            CommandOptionSchema::subcommand(
                "add_image",
                "Add the specified image to the chosen gallery",
                vec![
                    gallery_option("The gallery to add an image to", choices),
                    CommandOptionSchema::required(
                        OptionKind::String,
                        IMAGE_LINK,
                        "The URL pointing to the image you wish to add",
                    ),
                ],
            ),
            CommandOptionSchema::subcommand(
                "remove_image",
                "Remove the specified image from the chosen gallery",
                vec![
                    gallery_option("The gallery to remove an image from", choices),
                    CommandOptionSchema::required(
                        OptionKind::Integer,
                        IMAGE_NUMBER,
                        "The image you wish to remove",
                    ),
                ],
            ),
            CommandOptionSchema::subcommand(
                "delete",
                "Delete an existing gallery",
                vec![gallery_option("The name of the gallery to be deleted", choices)],
            ),
            CommandOptionSchema::subcommand(
                "create",
                "Create a new gallery",
                vec![CommandOptionSchema::required(
                    OptionKind::String,
                    GALLERY_NAME,
                    "The name of the gallery to be created",
                )],
            ),
        ],
    )
}

/// Re-register the full command schema from the current gallery names.
/// Returns the number of choices offered.
pub async fn sync_command_schema(
    store: &GalleryStore,
    registrar: &dyn CommandRegistrar,
) -> Result<usize, SyncError> {
    let choices = list_choices(store).await?;
    registrar.overwrite_commands(&[gallery_command(&choices)]).await?;
    tracing::info!("Command schema synced with {} gallery choice(s)", choices.len());
    Ok(choices.len())
}

/// Sync after a create/delete. Failures are logged and otherwise ignored so
/// the triggering command still reports its own outcome.
pub async fn refresh_after_change(ctx: &GalleryContext) {
    if let Err(e) = sync_command_schema(&ctx.store, ctx.registrar.as_ref()).await {
        tracing::error!("Command schema sync failed: {}", e);
    }
}
