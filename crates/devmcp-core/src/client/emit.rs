//! Emission algorithm shared by every editor adapter.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use super::ClientAdapter;
use crate::context::ProjectContext;
use crate::error::{Error, Result};
use crate::fs;
use crate::manifest::Manifest;
use crate::secrets::{self, SecretResolver};

/// One resolved launch descriptor as editors read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerEntry {
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl ServerEntry {
    /// Expand secrets in every argument and env value. The command and the
    /// env keys are taken as written.
    pub fn resolve(manifest: &Manifest, resolver: &dyn SecretResolver) -> Self {
        let server = &manifest.server;
        Self {
            command: server.command.clone(),
            args: server
                .args
                .iter()
                .map(|arg| secrets::expand(arg, resolver))
                .collect(),
            env: server
                .env
                .iter()
                .map(|(key, value)| (key.clone(), secrets::expand(value, resolver)))
                .collect(),
        }
    }

    /// Placeholder names still present after expansion.
    pub fn unresolved(&self) -> BTreeSet<&str> {
        self.args
            .iter()
            .chain(self.env.values())
            .flat_map(|value| secrets::placeholders(value))
            .collect()
    }
}

/// What one emission wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOutcome {
    pub client: &'static str,
    pub path: PathBuf,
    pub servers: Vec<String>,
    /// Manifests without a launch command.
    pub skipped: Vec<String>,
    /// Secret names the resolver could not supply, sorted.
    pub unresolved: Vec<String>,
}

/// Build the server map, skipping metadata-only manifests.
pub fn server_entries(
    manifests: &[Manifest],
    resolver: &dyn SecretResolver,
) -> (BTreeMap<String, ServerEntry>, Vec<String>) {
    let mut entries = BTreeMap::new();
    let mut skipped = Vec::new();

    for manifest in manifests {
        if !manifest.has_launch_command() {
            tracing::debug!("skipping '{}': no server command", manifest.name);
            skipped.push(manifest.name.clone());
            continue;
        }
        entries.insert(manifest.name.clone(), ServerEntry::resolve(manifest, resolver));
    }

    (entries, skipped)
}

pub fn emit<A: ClientAdapter + ?Sized>(
    adapter: &A,
    ctx: &ProjectContext,
    manifests: &[Manifest],
    resolver: &dyn SecretResolver,
) -> Result<EmitOutcome> {
    let (entries, skipped) = server_entries(manifests, resolver);
    let unresolved: Vec<String> = entries
        .values()
        .flat_map(ServerEntry::unresolved)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut document = BTreeMap::new();
    document.insert(adapter.server_key(), &entries);

    let path = adapter.config_path(ctx);
    fs::write_json(&path, &document)?;
    tracing::debug!(
        "{}: wrote {} server(s) to {}",
        adapter.id(),
        entries.len(),
        path.display()
    );

    Ok(EmitOutcome {
        client: adapter.id(),
        path,
        servers: entries.into_keys().collect(),
        skipped,
        unresolved,
    })
}

pub fn remove_server<A: ClientAdapter + ?Sized>(
    adapter: &A,
    ctx: &ProjectContext,
    name: &str,
) -> Result<bool> {
    let path = adapter.config_path(ctx);
    let Some(mut document) = fs::read_json_object(&path)? else {
        return Ok(false);
    };

    let removed = match document.get_mut(adapter.server_key()) {
        Some(Value::Object(servers)) => servers.remove(name).is_some(),
        Some(_) => return Err(not_a_server_map(adapter, path)),
        None => false,
    };

    if removed {
        fs::write_json(&path, &document)?;
        tracing::debug!("{}: removed '{}' from {}", adapter.id(), name, path.display());
    }
    Ok(removed)
}

pub fn list_servers<A: ClientAdapter + ?Sized>(
    adapter: &A,
    ctx: &ProjectContext,
) -> Result<Vec<String>> {
    let path = adapter.config_path(ctx);
    let Some(document) = fs::read_json_object(&path)? else {
        return Ok(Vec::new());
    };

    match document.get(adapter.server_key()) {
        Some(Value::Object(servers)) => Ok(sorted_keys(servers)),
        Some(_) => Err(not_a_server_map(adapter, path)),
        None => Ok(Vec::new()),
    }
}

fn sorted_keys(map: &Map<String, Value>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

fn not_a_server_map<A: ClientAdapter + ?Sized>(adapter: &A, path: PathBuf) -> Error {
    Error::MalformedArtifact {
        path,
        message: format!("'{}' is not an object", adapter.server_key()),
    }
}
