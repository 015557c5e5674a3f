use serde::{Deserialize, Serialize};

pub const ERROR_COLOR: u32 = 0xf04747;
pub const SUCCESS_COLOR: u32 = 0x43b581;
pub const PROMPT_COLOR: u32 = 0x5865f2;

const PONG: u8 = 1;
const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;
const UPDATE_MESSAGE: u8 = 7;

/// Message flag: only the invoking user sees the reply
pub const EPHEMERAL: u64 = 1 << 6;

const ACTION_ROW: u8 = 1;
const BUTTON: u8 = 2;

/// Outbound interaction response; serialized as the HTTP response body
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self { kind: PONG, data: None }
    }

    /// Reply with a new message
    pub fn message(data: ResponseData) -> Self {
        Self {
            kind: CHANNEL_MESSAGE_WITH_SOURCE,
            data: Some(data),
        }
    }

    /// Edit the message the clicked component is attached to
    pub fn update(data: ResponseData) -> Self {
        Self {
            kind: UPDATE_MESSAGE,
            data: Some(data),
        }
    }

    pub fn is_update(&self) -> bool {
        self.kind == UPDATE_MESSAGE
    }
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct ResponseData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    /// `Some(vec![])` clears the controls of an updated message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ActionRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl ResponseData {
    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn with_components(mut self, rows: Vec<ActionRow>) -> Self {
        self.components = Some(rows);
        self
    }

    pub fn without_components(self) -> Self {
        self.with_components(Vec::new())
    }

    pub fn ephemeral(mut self) -> Self {
        self.flags = Some(EPHEMERAL);
        self
    }

    /// Every button custom id in the payload, in order
    pub fn custom_ids(&self) -> Vec<&str> {
        self.components
            .iter()
            .flatten()
            .flat_map(|row| row.components.iter())
            .filter_map(|button| button.custom_id.as_deref())
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
}

impl Embed {
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self::described(description).color(ERROR_COLOR)
    }

    pub fn success(description: impl Into<String>) -> Self {
        Self::described(description).color(SUCCESS_COLOR)
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(EmbedImage { url: url.into() });
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(EmbedFooter { text: text.into() });
        self
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

impl ButtonStyle {
    fn code(self) -> u8 {
        match self {
            ButtonStyle::Primary => 1,
            ButtonStyle::Secondary => 2,
            ButtonStyle::Success => 3,
            ButtonStyle::Danger => 4,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ActionRow {
    #[serde(rename = "type")]
    pub kind: u8,
    pub components: Vec<Button>,
}

impl ActionRow {
    pub fn buttons(components: Vec<Button>) -> Self {
        Self {
            kind: ACTION_ROW,
            components,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Button {
    #[serde(rename = "type")]
    pub kind: u8,
    pub style: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
}

impl Button {
    pub fn new(label: impl Into<String>, style: ButtonStyle, custom_id: impl Into<String>) -> Self {
        Self {
            kind: BUTTON,
            style: style.code(),
            label: Some(label.into()),
            custom_id: Some(custom_id.into()),
        }
    }
}
