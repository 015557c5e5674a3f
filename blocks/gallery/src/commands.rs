use gallery_atoms::galleries::store::image_index;
use gallery_atoms::galleries::{Gallery, GalleryError, NewImage};
use gallery_shared::discord::interaction::{CommandOption, User};
use gallery_shared::discord::{Embed, ResponseData};
use rand::Rng;

use crate::error::InteractionError;
use crate::sync::{self, GALLERY_NAME, IMAGE_LINK, IMAGE_NUMBER};
use crate::GalleryContext;

pub(crate) fn required_str<'a>(
    sub: &'a CommandOption,
    name: &'static str,
) -> Result<&'a str, InteractionError> {
    sub.string(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(InteractionError::MissingOption(name))
}

pub(crate) fn required_int(sub: &CommandOption, name: &'static str) -> Result<i64, InteractionError> {
    sub.integer(name).ok_or(InteractionError::MissingOption(name))
}

pub(crate) fn mention(author_id: Option<&str>) -> String {
    match author_id {
        Some(id) => format!("<@{}>", id),
        None => "Unknown".to_string(),
    }
}

pub(crate) fn timestamp(created_at: Option<i64>) -> String {
    match created_at {
        Some(ts) => format!("<t:{}>", ts),
        None => "Unknown".to_string(),
    }
}

/// Uniform index into a gallery of `len` images
pub fn random_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<usize> {
    (len > 0).then(|| rng.gen_range(0..len))
}

/// Image at `index` with its "Image: i of last" footer
fn image_embed(gallery: &Gallery, index: usize) -> Result<Embed, InteractionError> {
    let image = gallery
        .images
        .get(index)
        .ok_or(GalleryError::IndexOutOfRange {
            index: index as i64,
            len: gallery.images.len(),
        })?;
    let last = gallery.last_index().unwrap_or_default();
    Ok(Embed::default().image(&image.url).footer(format!(
        "Image: {} of {} | Gallery: {}",
        index, last, gallery.gallery_name
    )))
}

pub async fn random(ctx: &GalleryContext, sub: &CommandOption) -> Result<ResponseData, InteractionError> {
    let name = required_str(sub, GALLERY_NAME)?;
    let gallery = ctx.store.get(name).await?;

    let index = random_index(&mut rand::thread_rng(), gallery.images.len())
        .ok_or(GalleryError::IndexOutOfRange { index: 0, len: 0 })?;
    tracing::debug!(gallery = name, index, "sending random image");
    Ok(ResponseData::embed(image_embed(&gallery, index)?))
}

pub async fn pick(ctx: &GalleryContext, sub: &CommandOption) -> Result<ResponseData, InteractionError> {
    let name = required_str(sub, GALLERY_NAME)?;
    let number = required_int(sub, IMAGE_NUMBER)?;
    let gallery = ctx.store.get(name).await?;

    let index = image_index(number, gallery.images.len())?;
    Ok(ResponseData::embed(image_embed(&gallery, index)?))
}

pub async fn add_image(
    ctx: &GalleryContext,
    sub: &CommandOption,
    invoker: Option<&User>,
) -> Result<ResponseData, InteractionError> {
    let name = required_str(sub, GALLERY_NAME)?;
    let link = required_str(sub, IMAGE_LINK)?;
    let author_id = invoker.map(|user| user.id.clone());

    let (index, image) = ctx
        .store
        .append_image(name, NewImage::by_author(link, author_id))
        .await?;

    let embed = Embed::described(format!("Image `{}` created!", index))
        .field("In gallery", format!("`{}`", name), true)
        .field("Added by", mention(image.author_id.as_deref()), true)
        .field("Created at", timestamp(image.created_at), true);
    Ok(ResponseData::embed(embed))
}

pub async fn create(ctx: &GalleryContext, sub: &CommandOption) -> Result<ResponseData, InteractionError> {
    let name = required_str(sub, GALLERY_NAME)?;
    ctx.store.create(name).await?;
    sync::refresh_after_change(ctx).await;

    Ok(ResponseData::embed(Embed::success(format!(
        "Gallery `{}` created :white_check_mark:",
        name
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, int_opt, string_opt};
    use gallery_atoms::galleries::GalleryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn sub(options: serde_json::Value) -> CommandOption {
        serde_json::from_value(json!({ "name": "x", "type": 1, "options": options }))
            .expect("option")
    }

    async fn seeded(store: &GalleryStore, name: &str, count: usize) {
        store.create(name).await.expect("create");
        for n in 0..count {
            store
                .append_image(name, NewImage::by_author(format!("http://x/{n}.jpg"), None))
                .await
                .expect("append");
        }
    }

    fn footer(data: &ResponseData) -> String {
        data.embeds[0]
            .footer
            .as_ref()
            .map(|f| f.text.clone())
            .unwrap_or_default()
    }

    #[test]
    fn random_index_covers_every_position_evenly() {
        let mut rng = StdRng::seed_from_u64(17);
        let len = 4;
        let trials = 8_000;
        let mut counts = vec![0usize; len];
        for _ in 0..trials {
            counts[random_index(&mut rng, len).expect("index")] += 1;
        }
        let expected = trials / len;
        for count in counts {
            assert!(count.abs_diff(expected) < expected / 10, "{count} vs {expected}");
        }
        assert_eq!(random_index(&mut rng, 0), None);
    }

    #[tokio::test]
    async fn pick_returns_each_valid_index_and_rejects_the_rest() {
        let (ctx, _) = context();
        seeded(&ctx.store, "cats", 3).await;

        for k in 0..3 {
            let data = pick(&ctx, &sub(json!([string_opt(GALLERY_NAME, "cats"), int_opt(IMAGE_NUMBER, k)])))
                .await
                .expect("pick");
            let url = data.embeds[0].image.as_ref().map(|i| i.url.clone());
            assert_eq!(url, Some(format!("http://x/{k}.jpg")));
            assert_eq!(footer(&data), format!("Image: {k} of 2 | Gallery: cats"));
        }
        for bad in [-1, 3] {
            let err = pick(&ctx, &sub(json!([string_opt(GALLERY_NAME, "cats"), int_opt(IMAGE_NUMBER, bad)])))
                .await
                .unwrap_err();
            assert_eq!(
                err,
                InteractionError::Gallery(GalleryError::IndexOutOfRange { index: bad, len: 3 })
            );
        }
    }

    #[tokio::test]
    async fn random_on_an_empty_gallery_reports_it() {
        let (ctx, _) = context();
        seeded(&ctx.store, "empty", 0).await;
        let err = random(&ctx, &sub(json!([string_opt(GALLERY_NAME, "empty")])))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Gallery is empty :stop_sign:");
    }

    #[tokio::test]
    async fn random_always_lands_inside_the_gallery() {
        let (ctx, _) = context();
        seeded(&ctx.store, "cats", 2).await;
        for _ in 0..20 {
            let data = random(&ctx, &sub(json!([string_opt(GALLERY_NAME, "cats")])))
                .await
                .expect("random");
            let text = footer(&data);
            assert!(text == "Image: 0 of 1 | Gallery: cats" || text == "Image: 1 of 1 | Gallery: cats");
        }
    }

    #[tokio::test]
    async fn add_image_reports_index_author_and_time() {
        let (ctx, _) = context();
        seeded(&ctx.store, "cats", 1).await;
        let user = crate::testing::command("add_image", json!([]))
            .invoker()
            .cloned();

        let data = add_image(
            &ctx,
            &sub(json!([string_opt(GALLERY_NAME, "cats"), string_opt(IMAGE_LINK, "http://x/new.jpg")])),
            user.as_ref(),
        )
        .await
        .expect("add");

        let embed = &data.embeds[0];
        assert_eq!(embed.description.as_deref(), Some("Image `1` created!"));
        assert_eq!(embed.field_value("In gallery"), Some("`cats`"));
        assert_eq!(embed.field_value("Added by"), Some("<@42>"));
        assert!(embed.field_value("Created at").is_some_and(|v| v.starts_with("<t:")));

        let images = ctx.store.get_images("cats").await.expect("images");
        assert_eq!(images.last().map(|i| i.url.as_str()), Some("http://x/new.jpg"));
        assert_eq!(images[1].author_id.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn add_image_to_missing_gallery_is_not_found() {
        let (ctx, _) = context();
        let err = add_image(
            &ctx,
            &sub(json!([string_opt(GALLERY_NAME, "nope"), string_opt(IMAGE_LINK, "http://x")])),
            None,
        )
        .await
        .unwrap_err();
        assert_eq!(err.user_message(), "Gallery does not exist :stop_sign:");
    }

    #[tokio::test]
    async fn create_syncs_choices_and_rejects_duplicates() {
        let (ctx, registrar) = context();
        let options = sub(json!([string_opt(GALLERY_NAME, "cats")]));

        let data = create(&ctx, &options).await.expect("create");
        assert_eq!(
            data.embeds[0].description.as_deref(),
            Some("Gallery `cats` created :white_check_mark:")
        );
        assert_eq!(registrar.last_choices("random"), vec!["cats".to_string()]);

        let err = create(&ctx, &options).await.unwrap_err();
        assert_eq!(err.user_message(), "Gallery already exists :stop_sign:");
        assert_eq!(registrar.call_count(), 1);
    }

    #[tokio::test]
    async fn missing_options_are_reported_by_name() {
        let (ctx, _) = context();
        let err = pick(&ctx, &sub(json!([string_opt(GALLERY_NAME, "cats")])))
            .await
            .unwrap_err();
        assert_eq!(err, InteractionError::MissingOption(IMAGE_NUMBER));
    }
}
