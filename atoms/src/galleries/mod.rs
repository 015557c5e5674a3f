// Re-export model types, the store and its backends
pub mod error;
pub mod memory;
pub mod model;
pub mod service;
pub mod store;

pub use error::{GalleryError, StoreOperation};
pub use memory::MemoryDocuments;
pub use model::{Gallery, Image, NewImage};
pub use service::DynamoDocuments;
pub use store::{GalleryDocuments, GalleryStore, RetryPolicy};
