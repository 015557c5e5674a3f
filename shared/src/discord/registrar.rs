use async_trait::async_trait;
use thiserror::Error;

use super::commands::ApplicationCommand;

#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("command registration request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("command registration rejected: {0}")]
    Rejected(String),
}

/// Replaces the full set of registered commands in one call.
#[async_trait]
pub trait CommandRegistrar: Send + Sync {
    async fn overwrite_commands(&self, commands: &[ApplicationCommand]) -> Result<(), RegistrarError>;
}

/// Bulk-overwrite client for the platform's command endpoint. Guild scoped
/// when a guild id is configured, global otherwise.
pub struct HttpCommandRegistrar {
    client: reqwest::Client,
    api_base: String,
    application_id: String,
    bot_token: String,
    guild_id: Option<String>,
}

impl HttpCommandRegistrar {
    pub fn new(
        api_base: impl Into<String>,
        application_id: impl Into<String>,
        bot_token: impl Into<String>,
        guild_id: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            application_id: application_id.into(),
            bot_token: bot_token.into(),
            guild_id,
        }
    }

    pub fn commands_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        match &self.guild_id {
            Some(guild) => format!(
                "{}/applications/{}/guilds/{}/commands",
                base, self.application_id, guild
            ),
            None => format!("{}/applications/{}/commands", base, self.application_id),
        }
    }
}

#[async_trait]
impl CommandRegistrar for HttpCommandRegistrar {
    async fn overwrite_commands(&self, commands: &[ApplicationCommand]) -> Result<(), RegistrarError> {
        let url = self.commands_url();
        tracing::info!("Registering {} command(s) at {}", commands.len(), url);

        let response = self
            .client
            .put(&url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(commands)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistrarError::Rejected(format!("{}: {}", status, body)));
        }
        Ok(())
    }
}
