/// Gallery document - a named, ordered collection of images
#[derive(Debug, Clone, PartialEq)]
pub struct Gallery {
    pub gallery_name: String,

    /// Insertion order is the addressable index used by pick/remove
    pub images: Vec<Image>,

    /// Bumped on every write; conditional writes compare against it
    pub version: u64,

    /// Next per-gallery image sequence number
    pub next_seq: u64,

    pub created_at: String,
}

impl Gallery {
    pub fn new(gallery_name: &str) -> Self {
        Self {
            gallery_name: gallery_name.to_string(),
            images: Vec::new(),
            version: 0,
            next_seq: 0,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Index of the last image, used in the "Image: i of last" label
    pub fn last_index(&self) -> Option<usize> {
        self.images.len().checked_sub(1)
    }
}

/// Image record - owned by exactly one gallery
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Stable within the gallery; never reused after removal
    pub seq: u64,
    pub url: String,
    pub author_id: Option<String>,
    /// Unix seconds
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub url: String,
    pub author_id: Option<String>,
    pub created_at: Option<i64>,
}

impl NewImage {
    /// Image added by `author_id` right now
    pub fn by_author(url: impl Into<String>, author_id: Option<String>) -> Self {
        Self {
            url: url.into(),
            author_id,
            created_at: Some(chrono::Utc::now().timestamp()),
        }
    }
}
