//! `devmcp.toml` schema

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "devmcp.toml";

/// Root of `devmcp.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name, used as the dev container name
    pub name: String,

    /// Manifest files, relative to the project root
    #[serde(default)]
    pub manifests: Vec<String>,

    /// Client ids to emit configs for; `None` means every registered client
    #[serde(default)]
    pub clients: Option<Vec<String>>,

    #[serde(default)]
    pub environment: EnvironmentSettings,
}

impl ProjectConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manifests: Vec::new(),
            clients: None,
            environment: EnvironmentSettings::default(),
        }
    }

    /// Validate the configuration against the known client ids.
    pub fn validate(&self, known_clients: &[&str]) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("'name' must not be empty"));
        }
        if let Some(clients) = &self.clients
            && let Some(unknown) = clients.iter().find(|c| !known_clients.contains(&c.as_str()))
        {
            return Err(Error::UnknownClient(unknown.clone()));
        }
        self.environment.validate()
    }
}

/// Settings for the generated dev container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSettings {
    /// Image of the implicit workspace service
    #[serde(default = "default_base_image")]
    pub base_image: String,

    /// Compose service name the editor attaches to
    #[serde(default = "default_workspace_service")]
    pub workspace_service: String,

    /// Mount point of the project inside the workspace service
    #[serde(default = "default_workspace_folder")]
    pub workspace_folder: String,
}

fn default_base_image() -> String {
    "mcr.microsoft.com/devcontainers/base:ubuntu".to_string()
}

fn default_workspace_service() -> String {
    "workspace".to_string()
}

fn default_workspace_folder() -> String {
    "/workspace".to_string()
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            base_image: default_base_image(),
            workspace_service: default_workspace_service(),
            workspace_folder: default_workspace_folder(),
        }
    }
}

impl EnvironmentSettings {
    pub fn validate(&self) -> Result<()> {
        if self.base_image.trim().is_empty() {
            return Err(invalid("'environment.base_image' must not be empty"));
        }
        // Composed service names always contain '-', so a hyphen-free name
        // can never collide with one.
        let service = &self.workspace_service;
        if service.is_empty()
            || !service
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(invalid(
                "'environment.workspace_service' must use only lowercase letters, digits and '_'",
            ));
        }
        if !self.workspace_folder.starts_with('/') {
            return Err(invalid(
                "'environment.workspace_folder' must be an absolute path",
            ));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> Error {
    Error::Parse {
        path: CONFIG_FILE_NAME.into(),
        message: message.to_string(),
    }
}
