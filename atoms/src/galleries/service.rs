use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use async_trait::async_trait;
use std::collections::HashMap;

use super::error::{GalleryError, StoreOperation};
use super::model::{Gallery, Image};
use super::store::GalleryDocuments;

const GALLERY_PK: &str = "GALLERY";
const GALLERY_SK_PREFIX: &str = "GALLERY#";
const PROMPT_PK: &str = "PROMPT";

/// Gallery documents in DynamoDB:
/// PK = "GALLERY"
/// SK = "GALLERY#{gallery_name}"
///
/// Resolved confirmation prompts:
/// PK = "PROMPT"
/// SK = "PROMPT#{message_id}"
#[derive(Clone)]
pub struct DynamoDocuments {
    client: DynamoClient,
    table_name: String,
}

impl DynamoDocuments {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

fn gallery_sk(name: &str) -> String {
    format!("{}{}", GALLERY_SK_PREFIX, name)
}

fn image_to_attr(image: &Image) -> AttributeValue {
    let mut map = HashMap::new();
    map.insert("seq".to_string(), AttributeValue::N(image.seq.to_string()));
    map.insert("url".to_string(), AttributeValue::S(image.url.clone()));
    if let Some(author_id) = &image.author_id {
        map.insert("author_id".to_string(), AttributeValue::S(author_id.clone()));
    }
    if let Some(created_at) = image.created_at {
        map.insert("created_at".to_string(), AttributeValue::N(created_at.to_string()));
    }
    AttributeValue::M(map)
}

/// Documents written before sequence numbers existed fall back to position
fn image_from_attr(value: &AttributeValue, position: usize) -> Option<Image> {
    let map = value.as_m().ok()?;
    Some(Image {
        seq: map
            .get("seq")
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse().ok())
            .unwrap_or(position as u64),
        url: map.get("url").and_then(|v| v.as_s().ok()).map(|s| s.to_string())?,
        author_id: map.get("author_id").and_then(|v| v.as_s().ok()).map(|s| s.to_string()),
        created_at: map.get("created_at").and_then(|v| v.as_n().ok()).and_then(|n| n.parse().ok()),
    })
}

/// A gallery whose image list cannot be read in full fails the read; writing
/// back a partial list would lose the unreadable entries
fn gallery_from_item(name: &str, item: &HashMap<String, AttributeValue>) -> Result<Gallery, GalleryError> {
    let images: Vec<Image> = match item.get("images").and_then(|v| v.as_l().ok()) {
        Some(list) => list
            .iter()
            .enumerate()
            .map(|(position, value)| {
                image_from_attr(value, position).ok_or_else(|| {
                    GalleryError::unavailable(
                        StoreOperation::Read,
                        format!("malformed image entry {} in gallery '{}'", position, name),
                    )
                })
            })
            .collect::<Result<_, _>>()?,
        None => Vec::new(),
    };

    let next_seq = item
        .get("next_seq")
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
        .unwrap_or(images.len() as u64);

    Ok(Gallery {
        gallery_name: name.to_string(),
        version: item
            .get("version")
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse().ok())
            .unwrap_or(0),
        next_seq,
        created_at: item
            .get("created_at")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        images,
    })
}

fn images_attr(gallery: &Gallery) -> AttributeValue {
    AttributeValue::L(gallery.images.iter().map(image_to_attr).collect())
}

#[async_trait]
impl GalleryDocuments for DynamoDocuments {
    async fn load(&self, name: &str) -> Result<Option<Gallery>, GalleryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(GALLERY_PK.to_string()))
            .key("SK", AttributeValue::S(gallery_sk(name)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| {
                GalleryError::unavailable(
                    StoreOperation::Read,
                    format!("DynamoDB get_item error: {}", DisplayErrorContext(&e)),
                )
            })?;

        result.item().map(|item| gallery_from_item(name, item)).transpose()
    }

    async fn insert(&self, gallery: &Gallery) -> Result<bool, GalleryError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(GALLERY_PK.to_string()))
            .item("SK", AttributeValue::S(gallery_sk(&gallery.gallery_name)))
            .item("gallery_name", AttributeValue::S(gallery.gallery_name.clone()))
            .item("images", images_attr(gallery))
            .item("version", AttributeValue::N(gallery.version.to_string()))
            .item("next_seq", AttributeValue::N(gallery.next_seq.to_string()))
            .item("created_at", AttributeValue::S(gallery.created_at.clone()))
            .condition_expression("attribute_not_exists(SK)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Ok(false)
            }
            Err(e) => Err(GalleryError::unavailable(
                StoreOperation::Create,
                format!("DynamoDB put_item error: {}", DisplayErrorContext(&e)),
            )),
        }
    }

    async fn replace(&self, gallery: &Gallery, expected_version: u64) -> Result<bool, GalleryError> {
        // Unversioned documents read back as version 0
        let condition = if expected_version == 0 {
            "attribute_exists(SK) AND (attribute_not_exists(#version) OR #version = :expected)"
        } else {
            "attribute_exists(SK) AND #version = :expected"
        };

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(GALLERY_PK.to_string()))
            .key("SK", AttributeValue::S(gallery_sk(&gallery.gallery_name)))
            .update_expression("SET #images = :images, #version = :version, #next_seq = :next_seq")
            .condition_expression(condition)
            .expression_attribute_names("#images", "images")
            .expression_attribute_names("#version", "version")
            .expression_attribute_names("#next_seq", "next_seq")
            .expression_attribute_values(":images", images_attr(gallery))
            .expression_attribute_values(":version", AttributeValue::N(gallery.version.to_string()))
            .expression_attribute_values(":next_seq", AttributeValue::N(gallery.next_seq.to_string()))
            .expression_attribute_values(":expected", AttributeValue::N(expected_version.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Ok(false)
            }
            Err(e) => Err(GalleryError::unavailable(
                StoreOperation::Write,
                format!("DynamoDB update_item error: {}", DisplayErrorContext(&e)),
            )),
        }
    }

    async fn remove(&self, name: &str) -> Result<bool, GalleryError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(GALLERY_PK.to_string()))
            .key("SK", AttributeValue::S(gallery_sk(name)))
            .condition_expression("attribute_exists(SK)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Ok(false)
            }
            Err(e) => Err(GalleryError::unavailable(
                StoreOperation::Delete,
                format!("DynamoDB delete_item error: {}", DisplayErrorContext(&e)),
            )),
        }
    }

    async fn names(&self) -> Result<Vec<String>, GalleryError> {
        let mut names = Vec::new();
        let mut start_key = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
                .expression_attribute_values(":pk", AttributeValue::S(GALLERY_PK.to_string()))
                .expression_attribute_values(":sk_prefix", AttributeValue::S(GALLERY_SK_PREFIX.to_string()))
                .projection_expression("SK")
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| {
                    GalleryError::unavailable(
                        StoreOperation::List,
                        format!("DynamoDB query error: {}", DisplayErrorContext(&e)),
                    )
                })?;

            for item in result.items() {
                if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
                    if let Some(name) = sk.strip_prefix(GALLERY_SK_PREFIX) {
                        names.push(name.to_string());
                    }
                }
            }

            match result.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        tracing::debug!("Found {} galleries", names.len());
        Ok(names)
    }

    async fn claim(&self, key: &str, expires_at: i64) -> Result<bool, GalleryError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(PROMPT_PK.to_string()))
            .item("SK", AttributeValue::S(format!("PROMPT#{}", key)))
            .item("resolved_at", AttributeValue::S(chrono::Utc::now().to_rfc3339()))
            .item("expires_at", AttributeValue::N(expires_at.to_string()))
            .condition_expression("attribute_not_exists(SK)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Ok(false)
            }
            Err(e) => Err(GalleryError::unavailable(
                StoreOperation::Claim,
                format!("DynamoDB put_item error: {}", DisplayErrorContext(&e)),
            )),
        }
    }
}
