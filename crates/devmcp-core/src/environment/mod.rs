//! Development environment synthesis.
//!
//! Turns aggregated requirements and the service topology into the
//! dev container descriptor and its composition file.

pub mod compose;
pub mod devcontainer;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::requirements::AggregatedRequirements;
use crate::topology::ServiceTopology;

pub use compose::{ComposeFile, ComposeService};
pub use devcontainer::DevcontainerFile;

/// Directory holding every generated environment artifact.
pub const DEVCONTAINER_DIR: &str = ".devcontainer";

/// Version requested for system tools, which carry no constraint.
pub const LATEST: &str = "latest";

/// Feature options as written into `devcontainer.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureOptions {
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentDescriptor {
    /// Feature id → options, key-sorted
    pub features: BTreeMap<String, FeatureOptions>,
    /// Ascending
    pub forward_ports: Vec<u16>,
    /// Idempotent `mkdir -p` commands, workspace-relative
    pub bootstrap: Vec<String>,
}

impl EnvironmentDescriptor {
    /// Bootstrap commands joined into one shell string, if any.
    pub fn on_create_command(&self) -> Option<String> {
        if self.bootstrap.is_empty() {
            None
        } else {
            Some(self.bootstrap.join(" && "))
        }
    }
}

/// Dev container feature for a runtime name.
pub fn runtime_feature(name: &str) -> Option<&'static str> {
    let id = match name.to_ascii_lowercase().as_str() {
        "python" | "python3" => "ghcr.io/devcontainers/features/python:1",
        "node" | "nodejs" | "node.js" => "ghcr.io/devcontainers/features/node:1",
        "go" | "golang" => "ghcr.io/devcontainers/features/go:1",
        "rust" => "ghcr.io/devcontainers/features/rust:1",
        "java" => "ghcr.io/devcontainers/features/java:1",
        "dotnet" | ".net" => "ghcr.io/devcontainers/features/dotnet:2",
        "ruby" => "ghcr.io/devcontainers/features/ruby:1",
        "php" => "ghcr.io/devcontainers/features/php:1",
        "deno" => "ghcr.io/devcontainers-community/features/deno:1",
        "bun" => "ghcr.io/shyim/devcontainers-features/bun:0",
        _ => return None,
    };
    Some(id)
}

/// Dev container feature for a system tool name.
pub fn system_feature(name: &str) -> Option<&'static str> {
    let id = match name.to_ascii_lowercase().as_str() {
        "docker" => "ghcr.io/devcontainers/features/docker-in-docker:2",
        "git" => "ghcr.io/devcontainers/features/git:1",
        "gh" | "github-cli" => "ghcr.io/devcontainers/features/github-cli:1",
        "kubectl" | "helm" => "ghcr.io/devcontainers/features/kubectl-helm-minikube:1",
        "terraform" => "ghcr.io/devcontainers/features/terraform:1",
        "aws" | "aws-cli" => "ghcr.io/devcontainers/features/aws-cli:1",
        _ => return None,
    };
    Some(id)
}

pub fn synthesize(
    requirements: &AggregatedRequirements,
    topology: &ServiceTopology,
) -> EnvironmentDescriptor {
    let mut features = BTreeMap::new();

    for name in &requirements.system {
        match system_feature(name) {
            Some(id) => {
                features.insert(
                    id.to_string(),
                    FeatureOptions {
                        version: LATEST.to_string(),
                    },
                );
            }
            None => tracing::warn!("no dev container feature known for system tool '{}'", name),
        }
    }
    for (name, version) in &requirements.runtimes {
        match runtime_feature(name) {
            Some(id) => {
                features.insert(
                    id.to_string(),
                    FeatureOptions {
                        version: version.clone(),
                    },
                );
            }
            None => tracing::warn!("no dev container feature known for runtime '{}'", name),
        }
    }

    let forward_ports = topology.ports.iter().copied().collect();

    let mut bootstrap = Vec::new();
    for owner in &topology.volumes {
        for dir in owner.data_dirs.iter().chain(std::iter::once(&owner.log_dir)) {
            bootstrap.push(format!("mkdir -p '{DEVCONTAINER_DIR}/{dir}'"));
        }
    }

    EnvironmentDescriptor {
        features,
        forward_ports,
        bootstrap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::VolumeOwner;

    #[test]
    fn maps_runtimes_to_features_with_resolved_versions() {
        let mut requirements = AggregatedRequirements::default();
        requirements
            .runtimes
            .insert("python".to_string(), "3.11".to_string());
        requirements.runtimes.insert("node".to_string(), "20".to_string());

        let env = synthesize(&requirements, &ServiceTopology::default());

        let keys: Vec<_> = env.features.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "ghcr.io/devcontainers/features/node:1".to_string(),
                "ghcr.io/devcontainers/features/python:1".to_string(),
            ]
        );
        assert_eq!(
            env.features["ghcr.io/devcontainers/features/python:1"].version,
            "3.11"
        );
    }

    #[test]
    fn system_tools_use_latest_and_unknown_names_are_skipped() {
        let mut requirements = AggregatedRequirements::default();
        requirements.system.insert("docker".to_string());
        requirements.system.insert("frobnicator".to_string());
        requirements
            .runtimes
            .insert("cobol".to_string(), "85".to_string());

        let env = synthesize(&requirements, &ServiceTopology::default());

        assert_eq!(env.features.len(), 1);
        assert_eq!(
            env.features["ghcr.io/devcontainers/features/docker-in-docker:2"].version,
            "latest"
        );
    }

    #[test]
    fn bootstrap_creates_data_and_log_dirs() {
        let topology = ServiceTopology {
            volumes: vec![VolumeOwner {
                manifest: "a".to_string(),
                service: "cache".to_string(),
                data_dirs: vec!["data/a/cache/data".to_string()],
                log_dir: "logs/a/cache".to_string(),
            }],
            ..ServiceTopology::default()
        };

        let env = synthesize(&AggregatedRequirements::default(), &topology);

        assert_eq!(
            env.bootstrap,
            vec![
                "mkdir -p '.devcontainer/data/a/cache/data'".to_string(),
                "mkdir -p '.devcontainer/logs/a/cache'".to_string(),
            ]
        );
        assert!(env.bootstrap.iter().all(|c| c.starts_with("mkdir -p ")));
        assert_eq!(
            env.on_create_command().unwrap(),
            "mkdir -p '.devcontainer/data/a/cache/data' && mkdir -p '.devcontainer/logs/a/cache'"
        );
    }

    #[test]
    fn no_volumes_means_no_on_create_command() {
        let env = synthesize(&AggregatedRequirements::default(), &ServiceTopology::default());
        assert!(env.on_create_command().is_none());
    }

    #[test]
    fn forwarded_ports_are_ascending() {
        let topology = ServiceTopology {
            ports: [6379, 5432, 8080].into_iter().collect(),
            ..ServiceTopology::default()
        };

        let env = synthesize(&AggregatedRequirements::default(), &topology);

        assert_eq!(env.forward_ports, vec![5432, 6379, 8080]);
    }
}
