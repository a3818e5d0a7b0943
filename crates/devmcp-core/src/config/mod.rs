//! Project configuration (`devmcp.toml`).

pub mod parser;
pub mod schema;

pub use parser::{parse_project_config, parse_project_config_str};
pub use schema::{CONFIG_FILE_NAME, EnvironmentSettings, ProjectConfig};
