use serde::Deserialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::util::atomic::write_new;

pub const APP_DIR_NAME: &str = "github_todoist_sync";
pub const CONFIG_FILE: &str = "config.json";
pub const MAPPING_FILE: &str = "item_task_mapping.json";
pub const CREDENTIALS_FILE: &str = "credentials.toml";

/// Repository full name (`owner/repo`) to Todoist project id.
pub type RepoProjectMap = BTreeMap<String, u64>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing credential: {0} (set it in credentials.toml or the environment)")]
    MissingCredential(&'static str),
}

impl ConfigError {
    fn io(path: &Path, source: io::Error) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub github_token: String,
    /// Optional here since the command line can name the user instead.
    pub github_username: Option<String>,
    pub todoist_token: String,
}

#[derive(Debug, Deserialize, Default)]
struct CredentialsFile {
    github: Option<GitHubSection>,
    todoist: Option<TodoistSection>,
}

#[derive(Debug, Deserialize, Default)]
struct GitHubSection {
    token: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TodoistSection {
    api_token: Option<String>,
}

/// Files created by [`ConfigStore::init_config`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InitReport {
    pub created: Vec<PathBuf>,
}

/// Platform config directory for this tool, e.g. `~/.config/github_todoist_sync`.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the config directory, creating it if needed.
    pub fn get_config_dir(&self) -> Result<PathBuf, ConfigError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| ConfigError::io(&self.dir, e))?;
        Ok(self.dir.clone())
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.dir.join(MAPPING_FILE)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    /// Writes `{}` to the config and mapping files when they don't exist yet.
    /// Existing files are left untouched.
    pub fn init_config(&self) -> Result<InitReport, ConfigError> {
        self.get_config_dir()?;
        let mut report = InitReport::default();

        for path in [self.config_path(), self.mapping_path()] {
            if write_new(&path, "{}").map_err(|e| ConfigError::io(&path, e))? {
                tracing::info!(path = %path.display(), "created default file");
                report.created.push(path);
            }
        }

        Ok(report)
    }

    pub fn load_repo_project_map(&self) -> Result<RepoProjectMap, ConfigError> {
        let path = self.config_path();
        let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Json { path, source })
    }

    /// Reads `credentials.toml` if present. `GITHUB_TOKEN`, `GITHUB_USERNAME` and
    /// `TODOIST_API_TOKEN` override what the file says.
    pub fn load_credentials(&self) -> Result<Credentials, ConfigError> {
        self.load_credentials_with(|key| std::env::var(key).ok())
    }

    fn load_credentials_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Credentials, ConfigError> {
        let path = self.credentials_path();
        let file = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
            toml::from_str(&contents).map_err(|source| ConfigError::Toml { path, source })?
        } else {
            CredentialsFile::default()
        };

        let github = file.github.unwrap_or_default();
        let todoist = file.todoist.unwrap_or_default();

        // An exported but empty variable must not hide the file's value.
        let lookup = |var: &str, fallback: Option<String>| {
            non_empty(env(var)).or_else(|| non_empty(fallback))
        };
        let pick = |var: &'static str, fallback: Option<String>| {
            lookup(var, fallback).ok_or(ConfigError::MissingCredential(var))
        };

        Ok(Credentials {
            github_token: pick("GITHUB_TOKEN", github.token)?,
            github_username: lookup("GITHUB_USERNAME", github.username),
            todoist_token: pick("TODOIST_API_TOKEN", todoist.api_token)?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
