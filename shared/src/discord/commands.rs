use serde::Serialize;

/// Most choices the platform accepts on one option
pub const MAX_CHOICES: usize = 25;

const CHAT_INPUT: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    SubCommand,
    String,
    Integer,
}

impl Serialize for OptionKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let code: u8 = match self {
            OptionKind::SubCommand => 1,
            OptionKind::String => 3,
            OptionKind::Integer => 4,
        };
        serializer.serialize_u8(code)
    }
}

/// Slash command definition as sent to the registration endpoint
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ApplicationCommand {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionSchema>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommandOptionSchema {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<CommandChoice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionSchema>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommandChoice {
    pub name: String,
    pub value: String,
}

impl ApplicationCommand {
    pub fn chat_input(
        name: impl Into<String>,
        description: impl Into<String>,
        options: Vec<CommandOptionSchema>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: CHAT_INPUT,
            options,
        }
    }

    pub fn subcommand(&self, name: &str) -> Option<&CommandOptionSchema> {
        self.options.iter().find(|option| option.name == name)
    }
}

impl CommandOptionSchema {
    pub fn subcommand(
        name: impl Into<String>,
        description: impl Into<String>,
        options: Vec<CommandOptionSchema>,
    ) -> Self {
        Self {
            kind: OptionKind::SubCommand,
            name: name.into(),
            description: description.into(),
            required: false,
            choices: Vec::new(),
            options,
        }
    }

    pub fn required(kind: OptionKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            required: true,
            choices: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn with_choices(mut self, choices: Vec<CommandChoice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn option(&self, name: &str) -> Option<&CommandOptionSchema> {
        self.options.iter().find(|option| option.name == name)
    }
}

impl CommandChoice {
    /// Choice whose label and value are both `value`
    pub fn same(value: &str) -> Self {
        Self {
            name: value.to_string(),
            value: value.to_string(),
        }
    }
}
