use thiserror::Error;

pub const DEFAULT_TABLE_NAME: &str = "galleries";
pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("environment value '{0}' is missing")]
    Missing(&'static str),
    #[error("environment value '{0}' is present but empty")]
    Empty(&'static str),
}

/// Everything the function needs from its environment, read once at cold start
#[derive(Debug, Clone)]
pub struct Settings {
    pub table_name: String,
    pub discord_public_key: String,
    pub discord_application_id: String,
    pub discord_bot_token: String,
    /// Register guild-scoped commands when set, global commands otherwise
    pub discord_guild_id: Option<String>,
    pub discord_api_base: String,
    pub prompt_signing_secret: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            match lookup(key) {
                None => Err(ConfigError::Missing(key)),
                Some(v) if v.trim().is_empty() => Err(ConfigError::Empty(key)),
                Some(v) => Ok(v),
            }
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            table_name: optional("TABLE_NAME").unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            discord_public_key: required("DISCORD_PUBLIC_KEY")?,
            discord_application_id: required("DISCORD_APPLICATION_ID")?,
            discord_bot_token: required("DISCORD_BOT_TOKEN")?,
            discord_guild_id: optional("DISCORD_GUILD_ID"),
            discord_api_base: optional("DISCORD_API_BASE")
                .unwrap_or_else(|| DEFAULT_DISCORD_API_BASE.to_string()),
            prompt_signing_secret: required("PROMPT_SIGNING_SECRET")?,
        })
    }
}
