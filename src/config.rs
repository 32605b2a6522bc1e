use crate::core::get_config_dir;
use crate::error::CliError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Config {
    /// Profile used when `--profile` is not given
    #[serde(default)]
    pub profile: Option<String>,
    /// Server used when no profile is selected
    #[serde(default)]
    pub server: ServerConfig,
    /// Named servers, selected with `--profile <name>`
    #[serde(default)]
    pub profiles: HashMap<String, ServerConfig>,
    #[serde(default)]
    pub wait: WaitConfig,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ServerConfig {
    #[serde(default)]
    pub url: Option<String>,
    /// Galaxy API key; anonymous access when unset
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WaitConfig {
    /// Seconds between two status polls in `wait`
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    15
}

/// A fully resolved server to talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerContext {
    pub url: String,
    pub key: Option<String>,
}

impl Config {
    /// Picks the server for this invocation: the explicit profile, then the
    /// configured default profile, then the top level `[server]` table.
    pub fn context(&self, profile: Option<&str>) -> Result<ServerContext, CliError> {
        let (name, server) = match profile.or(self.profile.as_deref()) {
            Some(name) => {
                let server = self
                    .profiles
                    .get(name)
                    .ok_or_else(|| CliError::usage(format!("No such profile {name}")))?;
                (Some(name), server)
            }
            None => (None, &self.server),
        };

        let url = server
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| match name {
                Some(name) => CliError::usage(format!("No server URL set for profile {name}")),
                None => CliError::usage(
                    "No server URL configured. Set server.url in gxjob.toml or GXJOB_SERVER__URL",
                ),
            })?;

        Ok(ServerContext {
            url: url.to_string(),
            key: server.key.clone(),
        })
    }
}

pub fn load_config(config_path: Option<&PathBuf>) -> Result<Config, config::ConfigError> {
    let mut config_vec = vec![];

    // User-provided config file
    if let Some(config_path) = config_path {
        if config_path.exists() {
            config_vec.push(config_path.clone());
        } else {
            eprintln!("Warning: Config file {config_path:?} not found.");
        }
    }

    // Default config file
    if let Ok(default_config_path) = get_config_dir().map(|d| d.join("gxjob.toml")) {
        if default_config_path.exists() {
            config_vec.push(default_config_path);
        }
    }

    build_config(&config_vec, None)
}

/// Layers `files` in order, then `GXJOB_*` variables on top. Nested keys are
/// joined with `__`, so `GXJOB_WAIT__INTERVAL_SECS` sets `wait.interval_secs`.
/// `env` replaces the process environment when given.
fn build_config(
    files: &[PathBuf],
    env: Option<config::Map<String, String>>,
) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder();
    let settings = files.iter().fold(settings, |s, path| {
        s.add_source(config::File::from(path.as_path()))
    });

    settings
        .add_source(
            config::Environment::with_prefix("GXJOB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()?
        .try_deserialize()
}
