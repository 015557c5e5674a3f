use gallery_atoms::galleries::{GalleryError, StoreOperation};
use gallery_shared::discord::{Embed, RegistrarError};
use thiserror::Error;

/// What kind of routing key failed to match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    InteractionType,
    Command,
    Subcommand,
    Component,
}

#[derive(Debug, Error, PartialEq)]
pub enum InteractionError {
    #[error(transparent)]
    Gallery(#[from] GalleryError),

    #[error("unrecognized {kind:?} '{name}'")]
    UnrecognizedEvent { kind: EventKind, name: String },

    #[error("confirmation prompt failed verification: {0}")]
    MalformedPrompt(&'static str),

    #[error("confirmation prompt was already resolved")]
    AlreadyResolved,

    #[error("required option '{0}' is missing")]
    MissingOption(&'static str),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("could not list gallery names: {0}")]
    Store(#[from] GalleryError),
    #[error(transparent)]
    Registrar(#[from] RegistrarError),
}

impl InteractionError {
    pub fn unrecognized(kind: EventKind, name: impl Into<String>) -> Self {
        InteractionError::UnrecognizedEvent {
            kind,
            name: name.into(),
        }
    }

    /// Plain-language text shown to whoever triggered the interaction
    pub fn user_message(&self) -> String {
        match self {
            InteractionError::Gallery(err) => gallery_message(err),
            InteractionError::UnrecognizedEvent {
                kind: EventKind::Command | EventKind::Subcommand,
                ..
            } => "Invalid subcommand :stop_sign:".to_string(),
            InteractionError::UnrecognizedEvent { .. } => {
                "I didn't expect to be interacted with in this way :flushed:\nPerhaps someone should look into this :thinking:".to_string()
            }
            InteractionError::MalformedPrompt(_) => {
                "This confirmation could not be verified :stop_sign:".to_string()
            }
            InteractionError::AlreadyResolved => {
                "This confirmation has already been handled :stop_sign:".to_string()
            }
            InteractionError::MissingOption(name) => format!("Missing option `{}` :stop_sign:", name),
        }
    }

    pub fn embed(&self) -> Embed {
        Embed::error(self.user_message())
    }

    /// The failed store call, when the cause is the store being unreachable
    pub fn store_failure(&self) -> Option<(StoreOperation, &str)> {
        match self {
            InteractionError::Gallery(GalleryError::StoreUnavailable { operation, message }) => {
                Some((*operation, message.as_str()))
            }
            _ => None,
        }
    }
}

fn gallery_message(err: &GalleryError) -> String {
    match err {
        GalleryError::NotFound { .. } => "Gallery does not exist :stop_sign:".to_string(),
        GalleryError::AlreadyExists { .. } => "Gallery already exists :stop_sign:".to_string(),
        GalleryError::ImageNotFound { name, .. } => format!(
            "That image is no longer in gallery `{}` :stop_sign: (It may have been removed already.)",
            name
        ),
        GalleryError::IndexOutOfRange { len: 0, .. } => "Gallery is empty :stop_sign:".to_string(),
        GalleryError::IndexOutOfRange { len: 1, .. } => {
            "Invalid image number :stop_sign: (Only image number 0 exists.)".to_string()
        }
        GalleryError::IndexOutOfRange { len, .. } => format!(
            "Invalid image number :stop_sign: (Valid image numbers include 0 through {} inclusive.)",
            len - 1
        ),
        GalleryError::Contended { .. } => "Unable to modify gallery contents :stop_sign:".to_string(),
        GalleryError::StoreUnavailable { operation, .. } => match operation {
            StoreOperation::Read | StoreOperation::List => {
                "Unable to get gallery contents :stop_sign:".to_string()
            }
            StoreOperation::Create => "Unable to create gallery :stop_sign:".to_string(),
            StoreOperation::Delete => "Unable to delete gallery :stop_sign:".to_string(),
            StoreOperation::Write | StoreOperation::Claim => {
                "Unable to modify gallery contents :stop_sign:".to_string()
            }
        },
    }
}
