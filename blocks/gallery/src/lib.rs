// Gallery slash command: routing, subcommand handlers, destructive-action
// confirmations and command schema sync.
pub mod commands;
pub mod confirmation;
pub mod error;
pub mod prompt;
pub mod router;
pub mod sync;

use std::sync::Arc;

use gallery_atoms::galleries::GalleryStore;
use gallery_shared::discord::CommandRegistrar;

pub use error::{InteractionError, SyncError};
pub use prompt::{PendingAction, PromptSigner};
pub use router::dispatch;

/// Everything a handler needs; built once per cold start
#[derive(Clone)]
pub struct GalleryContext {
    pub store: GalleryStore,
    pub registrar: Arc<dyn CommandRegistrar>,
    pub signer: PromptSigner,
}

impl GalleryContext {
    pub fn new(store: GalleryStore, registrar: Arc<dyn CommandRegistrar>, signer: PromptSigner) -> Self {
        Self {
            store,
            registrar,
            signer,
        }
    }
}
