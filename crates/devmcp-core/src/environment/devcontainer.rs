//! `devcontainer.json` rendering.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{EnvironmentDescriptor, FeatureOptions};
use crate::config::EnvironmentSettings;
use crate::context::COMPOSE_FILE;

/// The dev container descriptor, attached to the compose workspace service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevcontainerFile {
    pub name: String,
    pub docker_compose_file: String,
    pub service: String,
    pub workspace_folder: String,
    pub features: BTreeMap<String, FeatureOptions>,
    pub forward_ports: Vec<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_create_command: Option<String>,
}

impl DevcontainerFile {
    pub fn render(
        project_name: &str,
        environment: &EnvironmentDescriptor,
        settings: &EnvironmentSettings,
    ) -> Self {
        Self {
            name: project_name.to_string(),
            docker_compose_file: COMPOSE_FILE.to_string(),
            service: settings.workspace_service.clone(),
            workspace_folder: settings.workspace_folder.clone(),
            features: environment.features.clone(),
            forward_ports: environment.forward_ports.clone(),
            on_create_command: environment.on_create_command(),
        }
    }
}
