//! Composition file rendering.
//!
//! The file is emitted in JSON syntax. JSON is a subset of YAML 1.2, so Docker
//! Compose reads it as a regular `docker-compose.yml`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::EnvironmentSettings;
use crate::manifest::HealthCheck;
use crate::topology::{ComposedService, ServiceTopology};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeFile {
    pub services: BTreeMap<String, ComposeService>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeService {
    pub image: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<HealthCheck>,
}

impl ComposeService {
    fn from_composed(service: &ComposedService) -> Self {
        let volumes = service
            .volumes
            .iter()
            .map(|v| {
                let mode = if v.read_only { ":ro" } else { "" };
                format!("./{}:{}{}", v.host_dir, v.container_path, mode)
            })
            .collect();

        Self {
            image: service.image.clone(),
            command: None,
            ports: service.ports.iter().map(ToString::to_string).collect(),
            environment: service.environment.clone(),
            volumes,
            depends_on: Vec::new(),
            healthcheck: service.healthcheck.clone(),
        }
    }
}

impl ComposeFile {
    /// One block per composed service plus the workspace service the
    /// editor attaches to.
    pub fn render(topology: &ServiceTopology, settings: &EnvironmentSettings) -> Self {
        let mut services: BTreeMap<String, ComposeService> = topology
            .services
            .iter()
            .map(|s| (s.name.clone(), ComposeService::from_composed(s)))
            .collect();

        let workspace = ComposeService {
            image: settings.base_image.clone(),
            command: Some("sleep infinity".to_string()),
            ports: Vec::new(),
            environment: BTreeMap::new(),
            volumes: vec![format!("..:{}:cached", settings.workspace_folder)],
            depends_on: topology.services.iter().map(|s| s.name.clone()).collect(),
            healthcheck: None,
        };
        services.insert(settings.workspace_service.clone(), workspace);

        Self { services }
    }
}
