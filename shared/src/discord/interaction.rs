use serde::Deserialize;

use super::response::Embed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Ping,
    ApplicationCommand,
    MessageComponent,
    Other(u8),
}

impl From<u8> for InteractionKind {
    fn from(code: u8) -> Self {
        match code {
            1 => InteractionKind::Ping,
            2 => InteractionKind::ApplicationCommand,
            3 => InteractionKind::MessageComponent,
            other => InteractionKind::Other(other),
        }
    }
}

/// Inbound interaction body as posted to the interactions endpoint.
/// Only the fields this bot reads are modelled; the rest are ignored.
#[derive(Debug, Deserialize, Clone)]
pub struct Interaction {
    pub id: String,
    #[serde(default)]
    pub application_id: String,
    #[serde(rename = "type")]
    pub kind_code: u8,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Present for guild interactions
    #[serde(default)]
    pub member: Option<Member>,
    /// Present for DM interactions
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: String,
    /// The message a component was attached to
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InteractionData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub component_type: Option<u8>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CommandOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Member {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

const SUB_COMMAND: u8 = 1;

impl Interaction {
    pub fn kind(&self) -> InteractionKind {
        InteractionKind::from(self.kind_code)
    }

    /// Top-level command name of an application command
    pub fn command_name(&self) -> Option<&str> {
        if self.kind() != InteractionKind::ApplicationCommand {
            return None;
        }
        self.data.as_ref()?.name.as_deref()
    }

    /// The invoked subcommand, with its own options nested inside
    pub fn subcommand(&self) -> Option<&CommandOption> {
        self.data
            .as_ref()?
            .options
            .iter()
            .find(|option| option.kind == SUB_COMMAND)
    }

    pub fn custom_id(&self) -> Option<&str> {
        if self.kind() != InteractionKind::MessageComponent {
            return None;
        }
        self.data.as_ref()?.custom_id.as_deref()
    }

    /// Whoever triggered the interaction, in a guild or a DM
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|member| member.user.as_ref())
            .or(self.user.as_ref())
    }
}

impl CommandOption {
    pub fn option(&self, name: &str) -> Option<&CommandOption> {
        self.options.iter().find(|option| option.name == name)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.option(name)?.value.as_ref()?.as_str()
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.option(name)?.value.as_ref()?.as_i64()
    }
}
