use gallery_atoms::galleries::store::image_index;
use gallery_atoms::galleries::GalleryError;
use gallery_shared::discord::interaction::CommandOption;
use gallery_shared::discord::response::PROMPT_COLOR;
use gallery_shared::discord::{ActionRow, Button, ButtonStyle, Embed, Interaction, ResponseData};

use crate::commands::{mention, required_int, required_str, timestamp};
use crate::error::{EventKind, InteractionError};
use crate::prompt::PendingAction;
use crate::sync::{self, GALLERY_NAME, IMAGE_NUMBER};
use crate::GalleryContext;

pub const GALLERY_DELETE_YES: &str = "gallery_delete_yes";
pub const GALLERY_DELETE_NO: &str = "gallery_delete_no";
pub const IMAGE_DELETE_YES: &str = "image_delete_yes";
pub const IMAGE_DELETE_NO: &str = "image_delete_no";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Gallery,
    Image,
}

/// Which prompt a button belongs to and whether it confirms
fn parse_custom_id(custom_id: &str) -> Option<(PromptKind, bool)> {
    match custom_id {
        GALLERY_DELETE_YES => Some((PromptKind::Gallery, true)),
        GALLERY_DELETE_NO => Some((PromptKind::Gallery, false)),
        IMAGE_DELETE_YES => Some((PromptKind::Image, true)),
        IMAGE_DELETE_NO => Some((PromptKind::Image, false)),
        _ => None,
    }
}

fn confirm_buttons(yes: &str, no: &str) -> Vec<ActionRow> {
    vec![ActionRow::buttons(vec![
        Button::new("Yes, delete", ButtonStyle::Danger, yes),
        Button::new("No, cancel", ButtonStyle::Secondary, no),
    ])]
}

pub async fn prompt_gallery_delete(
    ctx: &GalleryContext,
    sub: &CommandOption,
) -> Result<ResponseData, InteractionError> {
    let name = required_str(sub, GALLERY_NAME)?;
    if !ctx.store.exists(name).await? {
        return Err(GalleryError::not_found(name).into());
    }

    let reference = ctx.signer.sign(&PendingAction::DeleteGallery {
        gallery: name.to_string(),
    })?;
    let embed = Embed::described("Are you sure you want to delete the following gallery? :thinking:")
        .color(PROMPT_COLOR)
        .field("Gallery", format!("`{}`", name), false)
        .footer(reference);

    Ok(ResponseData::embed(embed).with_components(confirm_buttons(GALLERY_DELETE_YES, GALLERY_DELETE_NO)))
}

pub async fn prompt_image_removal(
    ctx: &GalleryContext,
    sub: &CommandOption,
) -> Result<ResponseData, InteractionError> {
    let name = required_str(sub, GALLERY_NAME)?;
    let number = required_int(sub, IMAGE_NUMBER)?;
    let gallery = ctx.store.get(name).await?;
    let index = image_index(number, gallery.images.len())?;
    let image = &gallery.images[index];

    let reference = ctx.signer.sign(&PendingAction::RemoveImage {
        gallery: name.to_string(),
        index: number,
        seq: image.seq,
    })?;
    let embed = Embed::described("Are you sure you want to delete the below image? :thinking:")
        .color(PROMPT_COLOR)
        .field("In gallery", format!("`{}`", name), true)
        .field("Image number", index.to_string(), true)
        .field("Added by", mention(image.author_id.as_deref()), true)
        .field("Created at", timestamp(image.created_at), true)
        .image(&image.url)
        .footer(reference);

    Ok(ResponseData::embed(embed).with_components(confirm_buttons(IMAGE_DELETE_YES, IMAGE_DELETE_NO)))
}

/// Handle a click on one of the prompt buttons.
///
/// The pending action is read back from the signed footer of the message the
/// button is attached to, never from the visible fields. The message id is
/// claimed before anything else so that only the first click on a prompt
/// takes effect.
pub async fn resolve(
    ctx: &GalleryContext,
    interaction: &Interaction,
    custom_id: &str,
) -> Result<ResponseData, InteractionError> {
    let (kind, confirmed) = parse_custom_id(custom_id)
        .ok_or_else(|| InteractionError::unrecognized(EventKind::Component, custom_id))?;

    let message = interaction
        .message
        .as_ref()
        .ok_or(InteractionError::MalformedPrompt("click has no message"))?;
    let action = pending_action(ctx, interaction)?;

    let matches = matches!(
        (kind, &action),
        (PromptKind::Gallery, PendingAction::DeleteGallery { .. })
            | (PromptKind::Image, PendingAction::RemoveImage { .. })
    );
    if !matches {
        return Err(InteractionError::MalformedPrompt("button does not match prompt"));
    }

    if !ctx.store.claim_prompt(&message.id).await? {
        tracing::info!(message_id = %message.id, custom_id, "prompt already resolved, ignoring click");
        return Err(InteractionError::AlreadyResolved);
    }

    if confirmed {
        confirm(ctx, &action).await
    } else {
        Ok(cancelled(&action))
    }
}

/// Verified action behind the prompt a component is attached to
pub fn pending_action(
    ctx: &GalleryContext,
    interaction: &Interaction,
) -> Result<PendingAction, InteractionError> {
    let footer = interaction
        .message
        .as_ref()
        .and_then(|message| message.embeds.first())
        .and_then(|embed| embed.footer.as_ref())
        .ok_or(InteractionError::MalformedPrompt("prompt has no reference"))?;
    ctx.signer.verify(&footer.text)
}

async fn confirm(ctx: &GalleryContext, action: &PendingAction) -> Result<ResponseData, InteractionError> {
    match action {
        PendingAction::DeleteGallery { gallery } => {
            ctx.store.delete(gallery).await?;
            sync::refresh_after_change(ctx).await;
            Ok(ResponseData::embed(Embed::success(format!(
                "Gallery `{}` deleted :white_check_mark:",
                gallery
            ))))
        }
        PendingAction::RemoveImage { gallery, seq, .. } => {
            let (current, _) = ctx.store.remove_image_by_seq(gallery, *seq).await?;
            Ok(ResponseData::embed(Embed::success(format!(
                "Image `{}` removed from `{}` :white_check_mark:",
                current, gallery
            ))))
        }
    }
}

fn cancelled(action: &PendingAction) -> ResponseData {
    let text = match action {
        PendingAction::DeleteGallery { gallery } => {
            format!("Cancelled removal of gallery `{}`.", gallery)
        }
        PendingAction::RemoveImage { gallery, index, .. } => {
            format!("Cancelled removal of image `{}` from gallery `{}`.", index, gallery)
        }
    };
    ResponseData::embed(Embed::described(text))
}
