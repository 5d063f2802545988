//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::client::ConnectorClient;
use crate::config::{ServiceSettings, SettingsSource};
use crate::types::JsonValue;
use anyhow::{anyhow, Context, Result};
use serde_json::json;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = ConnectorClient::new(self.load_settings()?)?;

        let outcome = match &self.cli.command {
            Commands::Token => self.token(&client).await,
            Commands::Get { path, query } => self.get(&client, path, query).await,
            Commands::Notifications { connector_id } => {
                self.notifications(&client, connector_id.as_deref()).await
            }
        };

        client.close().await;
        outcome
    }

    /// Settings file first, environment for whatever it leaves out
    fn load_settings(&self) -> Result<ServiceSettings> {
        let env = SettingsSource::from_env()?;
        let source = match &self.cli.settings {
            Some(path) => SettingsSource::from_json_file(path)
                .with_context(|| format!("loading settings from {}", path.display()))?
                .or(env),
            None => env,
        };
        ServiceSettings::new(source).context("invalid settings")
    }

    async fn token(&self, client: &ConnectorClient) -> Result<()> {
        let cache = client.executor().token_cache();
        cache.access_token().await.context("token acquisition failed")?;
        let token = cache
            .current_token()
            .await
            .ok_or_else(|| anyhow!("no token cached after acquisition"))?;

        Self::print(&json!({
            "tokenType": token.token_type(),
            "expiresAt": token.expires_at().to_rfc3339(),
            "scope": token.scope(),
        }))
    }

    async fn get(
        &self,
        client: &ConnectorClient,
        path: &str,
        query: &[(String, String)],
    ) -> Result<()> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let query: Vec<(&str, &str)> = query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let url = client.context().resource_url(&segments, &query)?;
        let body: JsonValue = client
            .executor()
            .get(&url)
            .await
            .with_context(|| format!("GET {url}"))?;
        Self::print(&body)
    }

    async fn notifications(
        &self,
        client: &ConnectorClient,
        connector_id: Option<&str>,
    ) -> Result<()> {
        let connector_id = connector_id
            .or_else(|| client.settings().connector_id())
            .ok_or_else(|| anyhow!("no connector id: pass --connector-id or set ConnectorId"))?;

        let notifications = client.notifications().list(connector_id).await?;
        Self::print(&serde_json::to_value(notifications)?)
    }

    fn print(value: &JsonValue) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
