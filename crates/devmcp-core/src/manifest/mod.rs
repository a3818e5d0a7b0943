//! MCP server manifests: schema, decoding and validation.

pub mod loader;
pub mod schema;
pub mod validate;

pub use loader::{FileManifestSource, ManifestFormat, ManifestSource, parse_manifest_str};
pub use schema::{
    ConfigField, ConfigSchema, HealthCheck, InstallSpec, Manifest, Metadata, Requirements,
    RuntimeRequirement, SUPPORTED_MANIFEST_VERSION, ServerSpec, ServiceSpec, SystemRequirement,
    Transport,
};
pub use validate::{ValidationReport, validate, validate_all};
