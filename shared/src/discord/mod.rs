// Discord wire types and the two HTTP-facing concerns: verifying inbound
// requests and registering commands.
pub mod commands;
pub mod interaction;
pub mod registrar;
pub mod response;
pub mod signature;

pub use commands::{ApplicationCommand, CommandChoice, CommandOptionSchema, OptionKind};
pub use interaction::{Interaction, InteractionKind};
pub use registrar::{CommandRegistrar, HttpCommandRegistrar, RegistrarError};
pub use response::{ActionRow, Button, ButtonStyle, Embed, InteractionResponse, ResponseData};
pub use signature::{SignatureError, SignatureVerifier};
