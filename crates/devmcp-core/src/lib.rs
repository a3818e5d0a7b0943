//! devmcp core library
//!
//! Validates MCP server manifests, merges their runtime and service
//! requirements into one development container, and writes each editor's
//! MCP client config with secrets expanded at emission time.

pub mod client;
pub mod config;
pub mod context;
pub mod environment;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod orchestration;
pub mod requirements;
pub mod secrets;
pub mod topology;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{EnvironmentSettings, ProjectConfig, parse_project_config};
    pub use crate::context::ProjectContext;

    // Manifests
    pub use crate::manifest::{
        FileManifestSource, Manifest, ManifestSource, ValidationReport, validate, validate_all,
    };

    // Client
    pub use crate::client::{ClientAdapter, ClientKind, ClientRegistry, ReloadPolicy};

    // Secrets
    pub use crate::secrets::{EnvSecretResolver, NoSecrets, SecretResolver};

    // Pipeline
    pub use crate::orchestration::{SynthesisReport, Synthesizer, load_manifests};

    // Errors
    pub use crate::error::{Error, Result, ValidationError, ValidationRule};
}
