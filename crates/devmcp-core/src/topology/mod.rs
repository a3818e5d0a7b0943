//! Service topology: merges every manifest's service dependencies into one
//! namespaced composition graph.

pub mod ports;
pub mod volumes;

use std::collections::{BTreeMap, BTreeSet};

use crate::manifest::{HealthCheck, Manifest};

pub use ports::PortBinding;
pub use volumes::VolumeSpec;

/// A service after namespacing and normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedService {
    /// `{manifest}-{service}`
    pub name: String,
    pub manifest: String,
    pub service: String,
    pub image: String,
    pub ports: Vec<PortBinding>,
    pub environment: BTreeMap<String, String>,
    pub volumes: Vec<ServiceVolume>,
    pub healthcheck: Option<HealthCheck>,
}

/// A named volume rewritten onto a project-local host directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceVolume {
    pub name: String,
    /// Relative to `.devcontainer/`
    pub host_dir: String,
    pub container_path: String,
    pub read_only: bool,
}

/// Directories a (manifest, service) pair needs on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeOwner {
    pub manifest: String,
    pub service: String,
    pub data_dirs: Vec<String>,
    pub log_dir: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceTopology {
    /// Sorted by composed name
    pub services: Vec<ComposedService>,
    /// Union of container ports
    pub ports: BTreeSet<u16>,
    /// Owners of at least one volume, sorted by (manifest, service)
    pub volumes: Vec<VolumeOwner>,
}

impl ServiceTopology {
    pub fn service(&self, composed_name: &str) -> Option<&ComposedService> {
        self.services.iter().find(|s| s.name == composed_name)
    }
}

pub fn composed_name(manifest: &str, service: &str) -> String {
    format!("{manifest}-{service}")
}

/// Build the merged topology. Input is assumed to be validated.
pub fn build(manifests: &[Manifest]) -> ServiceTopology {
    let mut services: BTreeMap<String, ComposedService> = BTreeMap::new();

    for manifest in manifests {
        for (service_name, spec) in &manifest.services {
            let name = composed_name(&manifest.name, service_name);
            if services.contains_key(&name) {
                tracing::warn!(
                    "service '{}' from manifest '{}' collides with an existing composed name; keeping the first",
                    service_name,
                    manifest.name
                );
                continue;
            }

            let ports = spec
                .ports
                .iter()
                .filter_map(|raw| match PortBinding::parse(raw) {
                    Ok(binding) => Some(binding),
                    Err(e) => {
                        tracing::warn!("skipping port on '{}': {}", name, e);
                        None
                    }
                })
                .collect();

            let volumes = spec
                .volumes
                .iter()
                .filter_map(|raw| match VolumeSpec::parse(raw) {
                    Ok(volume) => Some(ServiceVolume {
                        host_dir: volumes::data_dir(&manifest.name, service_name, &volume.name),
                        name: volume.name,
                        container_path: volume.container_path,
                        read_only: volume.read_only,
                    }),
                    Err(e) => {
                        tracing::warn!("skipping volume on '{}': {}", name, e);
                        None
                    }
                })
                .collect();

            services.insert(
                name.clone(),
                ComposedService {
                    name,
                    manifest: manifest.name.clone(),
                    service: service_name.clone(),
                    image: spec.image.clone(),
                    ports,
                    environment: spec.environment.clone(),
                    volumes,
                    healthcheck: spec.healthcheck.clone(),
                },
            );
        }
    }

    let ports = services
        .values()
        .flat_map(|s| s.ports.iter().map(|p| p.container_port))
        .collect();

    let mut owners: Vec<VolumeOwner> = services
        .values()
        .filter(|s| !s.volumes.is_empty())
        .map(|s| VolumeOwner {
            manifest: s.manifest.clone(),
            service: s.service.clone(),
            data_dirs: s.volumes.iter().map(|v| v.host_dir.clone()).collect(),
            log_dir: volumes::log_dir(&s.manifest, &s.service),
        })
        .collect();
    owners.sort_by(|a, b| (&a.manifest, &a.service).cmp(&(&b.manifest, &b.service)));

    ServiceTopology {
        services: services.into_values().collect(),
        ports,
        volumes: owners,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ServiceSpec;

    fn with_service(name: &str, service: &str, spec: ServiceSpec) -> Manifest {
        let mut manifest = Manifest::new(name, "npx");
        manifest.services.insert(service.to_string(), spec);
        manifest
    }

    fn cache(ports: &[&str]) -> ServiceSpec {
        ServiceSpec {
            image: "redis:7".to_string(),
            ports: ports.iter().map(|p| p.to_string()).collect(),
            volumes: vec!["data:/data".to_string()],
            ..ServiceSpec::default()
        }
    }

    #[test]
    fn services_are_namespaced_by_manifest() {
        let manifests = vec![
            with_service("a", "cache", cache(&[])),
            with_service("b", "cache", cache(&[])),
        ];

        let topology = build(&manifests);

        let names: Vec<_> = topology.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a-cache", "b-cache"]);
        let a = topology.service("a-cache").unwrap();
        let b = topology.service("b-cache").unwrap();
        assert_eq!(a.volumes[0].host_dir, "data/a/cache/data");
        assert_eq!(b.volumes[0].host_dir, "data/b/cache/data");
    }

    #[test]
    fn forwarded_ports_are_deduplicated_container_ports() {
        let manifests = vec![
            with_service(
                "pg",
                "db",
                ServiceSpec {
                    image: "postgres:16".to_string(),
                    ports: vec!["5432:5432".to_string()],
                    ..ServiceSpec::default()
                },
            ),
            with_service("a", "cache", cache(&["6379"])),
            with_service("b", "cache", cache(&["6379"])),
        ];

        let topology = build(&manifests);

        assert_eq!(topology.ports.len(), 2);
        assert_eq!(topology.ports.iter().copied().collect::<Vec<_>>(), vec![5432, 6379]);
    }

    #[test]
    fn forwarded_ports_use_container_side() {
        let manifests = vec![with_service(
            "pg",
            "db",
            ServiceSpec {
                image: "postgres:16".to_string(),
                ports: vec!["127.0.0.1:5433:5432".to_string()],
                ..ServiceSpec::default()
            },
        )];

        let topology = build(&manifests);

        assert!(topology.ports.contains(&5432));
        assert!(!topology.ports.contains(&5433));
    }

    #[test]
    fn volume_owners_get_data_and_log_dirs() {
        let manifests = vec![with_service("a", "cache", cache(&[]))];

        let topology = build(&manifests);

        assert_eq!(
            topology.volumes,
            vec![VolumeOwner {
                manifest: "a".to_string(),
                service: "cache".to_string(),
                data_dirs: vec!["data/a/cache/data".to_string()],
                log_dir: "logs/a/cache".to_string(),
            }]
        );
    }

    #[test]
    fn services_without_volumes_own_no_directories() {
        let manifests = vec![with_service(
            "web",
            "proxy",
            ServiceSpec {
                image: "nginx".to_string(),
                ..ServiceSpec::default()
            },
        )];

        let topology = build(&manifests);

        assert_eq!(topology.services.len(), 1);
        assert!(topology.volumes.is_empty());
    }

    #[test]
    fn manifest_order_does_not_change_topology() {
        let forward = vec![
            with_service("a", "cache", cache(&["6379"])),
            with_service("b", "cache", cache(&["6380:6379"])),
        ];
        let reverse: Vec<_> = forward.iter().rev().cloned().collect();

        assert_eq!(build(&forward), build(&reverse));
    }
}
