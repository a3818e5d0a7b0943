//! MCP server manifest schema
//!
//! Declarative definition of one MCP server: how editors launch it, how it is
//! installed, what it needs from the development container, and which
//! backing services it depends on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The only manifest format version this crate understands.
pub const SUPPORTED_MANIFEST_VERSION: &str = "1.0";

/// Manifest - the root structure of a server descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Format version this manifest conforms to (e.g., "1.0")
    pub manifest_version: String,

    /// Unique slug used as the server key in every client config
    pub name: String,

    /// Semantic version of the server (optional)
    #[serde(default)]
    pub version: Option<String>,

    /// Brief description (at most 200 characters)
    #[serde(default)]
    pub description: Option<String>,

    /// Informational metadata
    #[serde(default)]
    pub metadata: Option<Metadata>,

    /// How editors launch the server
    #[serde(default)]
    pub server: ServerSpec,

    /// How the server is fetched and built
    #[serde(default)]
    pub install: Option<InstallSpec>,

    /// What the development container must provide
    #[serde(default)]
    pub requirements: Requirements,

    /// Backing services, keyed by service name
    #[serde(default)]
    pub services: BTreeMap<String, ServiceSpec>,

    /// User-supplied secrets and settings
    #[serde(default)]
    pub config: ConfigSchema,
}

impl Manifest {
    /// Create a minimal stdio manifest.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            manifest_version: SUPPORTED_MANIFEST_VERSION.to_string(),
            name: name.into(),
            version: None,
            description: None,
            metadata: None,
            server: ServerSpec {
                command: command.into(),
                ..ServerSpec::default()
            },
            install: None,
            requirements: Requirements::default(),
            services: BTreeMap::new(),
            config: ConfigSchema::default(),
        }
    }

    /// Metadata-only manifests carry no launch command and are not emitted
    /// into client configs.
    pub fn has_launch_command(&self) -> bool {
        !self.server.command.trim().is_empty()
    }
}

/// Author, license and links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub license: Option<String>,

    #[serde(default)]
    pub homepage: Option<String>,

    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default)]
    pub documentation: Option<String>,

    /// Search tags (lowercase slugs)
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Transport types for MCP servers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
    Http,
    Sse,
}

/// Server launch descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSpec {
    #[serde(default)]
    pub transport: Transport,

    /// Executable to run; empty for metadata-only manifests
    #[serde(default)]
    pub command: String,

    /// Command arguments (may contain `${secret}` placeholders)
    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub working_dir: Option<String>,

    /// Environment variables (values may contain `${secret}` placeholders)
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Install descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallSpec {
    /// Source kind: git, local, file or remote
    #[serde(rename = "type")]
    pub kind: String,

    /// Must equal `kind`
    #[serde(default)]
    pub method: String,

    /// Repository URL (required for git)
    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default)]
    pub setup: Vec<String>,

    #[serde(default)]
    pub build: Vec<String>,

    #[serde(default)]
    pub test: Vec<String>,
}

impl InstallSpec {
    /// Every command the installer would run, in execution order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.setup
            .iter()
            .chain(self.build.iter())
            .chain(self.test.iter())
            .map(String::as_str)
    }
}

/// Requirement descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    /// Tools that must exist in the container (docker, git, ...)
    #[serde(default)]
    pub system: Vec<SystemRequirement>,

    /// Language runtimes with version constraints
    #[serde(default)]
    pub runtimes: Vec<RuntimeRequirement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemRequirement {
    pub name: String,

    /// Command that proves the tool is installed
    #[serde(default)]
    pub check: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeRequirement {
    pub name: String,

    /// Version literal ("3.11") or range (">=3.0")
    #[serde(default)]
    pub version: String,
}

impl RuntimeRequirement {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// One backing service a manifest depends on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub image: String,

    /// "6379", "5432:5432" or "127.0.0.1:5433:5432"
    #[serde(default)]
    pub ports: Vec<String>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// Named volumes: "name:/container/path"
    #[serde(default)]
    pub volumes: Vec<String>,

    #[serde(default)]
    pub healthcheck: Option<HealthCheck>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Command vector, e.g. ["CMD", "redis-cli", "ping"]
    pub test: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Signed so negative values can be rejected with a useful message
    #[serde(default)]
    pub retries: i64,
}

/// Configuration schema: declared secrets and settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSchema {
    #[serde(default)]
    pub secrets: BTreeMap<String, ConfigField>,

    #[serde(default)]
    pub settings: BTreeMap<String, ConfigField>,
}

impl ConfigSchema {
    /// All declared fields, secrets first.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &ConfigField)> {
        self.secrets.iter().chain(self.settings.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    #[serde(default)]
    pub description: String,

    /// One of [`CONFIG_FIELD_TYPES`]
    #[serde(rename = "type", default)]
    pub field_type: String,

    /// Choices for select / multiselect
    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

/// Allowed configuration field types.
pub const CONFIG_FIELD_TYPES: &[&str] = &[
    "string",
    "number",
    "boolean",
    "secret",
    "path",
    "url",
    "select",
    "multiselect",
];
