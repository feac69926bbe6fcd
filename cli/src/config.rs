use anyhow::{Context, Result};
use pigeon_shared::api::DEFAULT_API_BASE_URL;
use serde::Deserialize;
use std::path::Path;

/// Connection settings for the terminal client.
///
/// Layered lowest to highest: built-in defaults, `pigeon.toml` (or the file
/// passed with `--config`), `PIGEON_*` environment variables, command line flags.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    pub api_url: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("pigeon").required(false),
        };

        let settings = config::Config::builder()
            .set_default("api_url", DEFAULT_API_BASE_URL)?
            .set_default("request_timeout_secs", 30)?
            .add_source(file)
            .add_source(config::Environment::with_prefix("PIGEON"))
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Apply command line overrides on top of the loaded settings.
    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        access_token: Option<String>,
        refresh_token: Option<String>,
    ) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if access_token.is_some() {
            self.access_token = access_token;
        }
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
        self
    }
}
