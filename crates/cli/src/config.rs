use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/splitten_cli.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub email: String,
    /// Read from the config file or `SPLITTEN_CLI_PASSWORD`, never from the
    /// command line.
    pub password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            email: String::new(),
            password: String::new(),
        }
    }
}

pub fn load(
    config_path: Option<&str>,
    base_url: Option<String>,
    email: Option<String>,
) -> Result<AppConfig> {
    let config_path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("SPLITTEN_CLI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = base_url {
        settings.base_url = base_url;
    }
    if let Some(email) = email {
        settings.email = email;
    }

    Ok(settings)
}
