//! Manifest checks, planning and artifact writing.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::client::{ClientRegistry, EmitOutcome};
use crate::config::ProjectConfig;
use crate::context::ProjectContext;
use crate::environment::{self, ComposeFile, DevcontainerFile, EnvironmentDescriptor};
use crate::error::{Error, Result};
use crate::fs;
use crate::manifest::{Manifest, ManifestSource, validate};
use crate::requirements::{self, AggregatedRequirements, RequirementConflict};
use crate::secrets::SecretResolver;
use crate::topology::{self, ServiceTopology};

/// Load every manifest listed in the project config, in order.
pub fn load_manifests(config: &ProjectConfig, source: &dyn ManifestSource) -> Result<Vec<Manifest>> {
    config
        .manifests
        .iter()
        .map(|entry| source.load(entry))
        .collect()
}

/// Validate each manifest and reject duplicate names.
pub fn check_manifests(manifests: &[Manifest]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for manifest in manifests {
        validate(manifest)?;
        if !seen.insert(manifest.name.as_str()) {
            return Err(Error::DuplicateManifest(manifest.name.clone()));
        }
    }
    Ok(())
}

/// Everything derived from a manifest set, before anything touches disk.
#[derive(Debug, Clone)]
pub struct SynthesisPlan {
    pub requirements: AggregatedRequirements,
    pub topology: ServiceTopology,
    pub environment: EnvironmentDescriptor,
    pub devcontainer: DevcontainerFile,
    pub compose: ComposeFile,
}

impl SynthesisPlan {
    /// Derive the plan from manifests that already passed [`check_manifests`].
    pub fn build(config: &ProjectConfig, manifests: &[Manifest]) -> Self {
        let requirements = requirements::aggregate(manifests);
        let topology = topology::build(manifests);
        let environment = environment::synthesize(&requirements, &topology);
        let devcontainer = DevcontainerFile::render(&config.name, &environment, &config.environment);
        let compose = ComposeFile::render(&topology, &config.environment);

        Self {
            requirements,
            topology,
            environment,
            devcontainer,
            compose,
        }
    }
}

/// What a synthesis pass wrote.
#[derive(Debug, Clone)]
pub struct SynthesisReport {
    pub devcontainer_path: PathBuf,
    pub compose_path: PathBuf,
    pub clients: Vec<EmitOutcome>,
    pub conflicts: Vec<RequirementConflict>,
    pub forwarded_ports: Vec<u16>,
}

/// Runs the pipeline for one project.
#[derive(Debug)]
pub struct Synthesizer<'a> {
    ctx: &'a ProjectContext,
    registry: &'a ClientRegistry,
}

impl<'a> Synthesizer<'a> {
    pub fn new(ctx: &'a ProjectContext, registry: &'a ClientRegistry) -> Self {
        Self { ctx, registry }
    }

    /// Check, plan and write every artifact.
    ///
    /// `clients` overrides the config's client list when given. Nothing is
    /// written unless every manifest is valid and every client id is known.
    pub fn run(
        &self,
        config: &ProjectConfig,
        manifests: &[Manifest],
        clients: Option<&[String]>,
        resolver: &dyn SecretResolver,
    ) -> Result<SynthesisReport> {
        config.validate(&self.registry.client_ids())?;
        check_manifests(manifests)?;

        let targets = self
            .registry
            .select(clients.or(config.clients.as_deref()))?;

        tracing::info!(
            "synthesizing '{}' from {} manifest(s) for {} client(s)",
            config.name,
            manifests.len(),
            targets.len()
        );

        let plan = SynthesisPlan::build(config, manifests);

        let devcontainer_path = self.ctx.devcontainer_path();
        fs::write_json(&devcontainer_path, &plan.devcontainer)?;
        let compose_path = self.ctx.compose_path();
        fs::write_json(&compose_path, &plan.compose)?;

        let mut outcomes = Vec::with_capacity(targets.len());
        for client in targets {
            outcomes.push(client.emit(self.ctx, manifests, resolver)?);
        }

        tracing::info!(
            "wrote {} and {} client config(s)",
            devcontainer_path.display(),
            outcomes.len()
        );

        Ok(SynthesisReport {
            devcontainer_path,
            compose_path,
            clients: outcomes,
            conflicts: plan.requirements.conflicts,
            forwarded_ports: plan.environment.forward_ports,
        })
    }
}
