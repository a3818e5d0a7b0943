//! devmcp - MCP server dev environment generator
//!
//! Usage:
//!   devmcp sync                 # Regenerate .devcontainer/ and editor configs
//!   devmcp validate [FILES]     # Check manifests
//!   devmcp list <client>        # Show configured servers
//!   devmcp remove <client> <n>  # Drop one server from a client config
//!   devmcp clients              # Show supported editors

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devmcp_core::client::ClientRegistry;
use devmcp_core::config::{ProjectConfig, parse_project_config};
use devmcp_core::context::ProjectContext;
use devmcp_core::manifest::{FileManifestSource, ManifestSource, validate};
use devmcp_core::orchestration::{SynthesisReport, Synthesizer, load_manifests};
use devmcp_core::secrets::EnvSecretResolver;

#[derive(Parser)]
#[command(name = "devmcp")]
#[command(about = "MCP server dev environment and editor config generator", long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, short = 'C', global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate the dev container and every enabled editor config
    Sync {
        /// Only emit configs for these clients (repeatable)
        #[arg(long = "client", value_name = "ID")]
        clients: Vec<String>,

        /// Resolve `${name}` placeholders from `<PREFIX>name` environment variables
        #[arg(long)]
        secret_prefix: Option<String>,
    },

    /// Validate manifests; exits non-zero if any is rejected
    Validate {
        /// Manifest files, relative to the project root (defaults to devmcp.toml's list)
        files: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List servers configured for a client
    List {
        /// Client id (see `devmcp clients`)
        client: String,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove one server from a client config
    #[command(alias = "rm")]
    Remove {
        /// Client id
        client: String,
        /// Server (manifest) name
        name: String,
    },

    /// List supported clients
    Clients {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devmcp=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let root = match cli.project {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    tracing::debug!("project root: {}", root.display());
    let ctx = ProjectContext::new(root);
    let registry = ClientRegistry::with_default_clients();

    let exit_code = run_cli(cli.command, &ctx, &registry)?;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn run_cli(command: Commands, ctx: &ProjectContext, registry: &ClientRegistry) -> Result<i32> {
    match command {
        Commands::Sync {
            clients,
            secret_prefix,
        } => run_sync(ctx, registry, clients, secret_prefix),
        Commands::Validate { files, format } => run_validate(ctx, files, format),
        Commands::List { client, format } => {
            run_list(ctx, registry, &client, format)?;
            Ok(0)
        }
        Commands::Remove { client, name } => run_remove(ctx, registry, &client, &name),
        Commands::Clients { format } => {
            run_clients(registry, format)?;
            Ok(0)
        }
    }
}

fn load_config(ctx: &ProjectContext) -> Result<ProjectConfig> {
    let path = ctx.config_path();
    parse_project_config(&path)
        .with_context(|| format!("Failed to load project config {}", path.display()))
}

// =============================================================================
// Sync
// =============================================================================

fn run_sync(
    ctx: &ProjectContext,
    registry: &ClientRegistry,
    clients: Vec<String>,
    secret_prefix: Option<String>,
) -> Result<i32> {
    let config = load_config(ctx)?;
    let source = FileManifestSource::new(ctx.project_root());
    let manifests = load_manifests(&config, &source).context("Failed to load manifests")?;

    let resolver = match secret_prefix {
        Some(prefix) => EnvSecretResolver::with_prefix(prefix),
        None => EnvSecretResolver::new(),
    };
    let overrides = (!clients.is_empty()).then_some(clients.as_slice());

    let report = Synthesizer::new(ctx, registry)
        .run(&config, &manifests, overrides, &resolver)
        .context("Synthesis failed")?;

    print_sync_report(ctx, registry, &report);
    Ok(0)
}

fn print_sync_report(ctx: &ProjectContext, registry: &ClientRegistry, report: &SynthesisReport) {
    println!(
        "{} {}",
        style("wrote").green(),
        display_relative(ctx, &report.devcontainer_path)
    );
    println!(
        "{} {}",
        style("wrote").green(),
        display_relative(ctx, &report.compose_path)
    );

    for outcome in &report.clients {
        let reload = registry
            .get(outcome.client)
            .map(|c| c.reload().describe())
            .unwrap_or("-");
        println!(
            "{} {} ({} server(s), {})",
            style("wrote").green(),
            display_relative(ctx, &outcome.path),
            outcome.servers.len(),
            reload
        );
        for skipped in &outcome.skipped {
            println!("  skipped '{skipped}': no server command");
        }
        for name in &outcome.unresolved {
            println!("  {} secret '{name}' is unresolved", style("warning:").yellow());
        }
    }

    if !report.forwarded_ports.is_empty() {
        let ports: Vec<String> = report.forwarded_ports.iter().map(u16::to_string).collect();
        println!("forwarded ports: {}", ports.join(", "));
    }

    for conflict in &report.conflicts {
        println!("{} {}", style("warning:").yellow(), conflict);
    }
}

fn display_relative(ctx: &ProjectContext, path: &Path) -> String {
    path.strip_prefix(ctx.project_root())
        .unwrap_or(path)
        .display()
        .to_string()
}

// =============================================================================
// Validate
// =============================================================================

fn run_validate(ctx: &ProjectContext, files: Vec<PathBuf>, format: OutputFormat) -> Result<i32> {
    let sources: Vec<String> = if files.is_empty() {
        load_config(ctx)?.manifests
    } else {
        files
            .iter()
            .map(|f| f.to_string_lossy().into_owned())
            .collect()
    };
    let loader = FileManifestSource::new(ctx.project_root());

    let mut rows = Vec::with_capacity(sources.len());
    for source in &sources {
        let outcome = match loader.load(source) {
            Ok(manifest) => match validate(&manifest) {
                Ok(()) => ValidateRow::ok(source, manifest.name),
                Err(e) => ValidateRow::failed(
                    source,
                    Some(manifest.name),
                    Some(e.rule.as_str()),
                    e.message,
                ),
            },
            Err(e) => ValidateRow::failed(source, None, None, e.to_string()),
        };
        rows.push(outcome);
    }

    match format {
        OutputFormat::Table => print_validate_table(&rows),
        OutputFormat::Json => print_validate_json(&rows)?,
    }

    let failures = rows.iter().filter(|r| r.error.is_some()).count();
    Ok(if failures > 0 { 1 } else { 0 })
}

struct ValidateRow {
    source: String,
    manifest: Option<String>,
    rule: Option<&'static str>,
    error: Option<String>,
}

impl ValidateRow {
    fn ok(source: &str, manifest: String) -> Self {
        Self {
            source: source.to_string(),
            manifest: Some(manifest),
            rule: None,
            error: None,
        }
    }

    fn failed(
        source: &str,
        manifest: Option<String>,
        rule: Option<&'static str>,
        message: String,
    ) -> Self {
        Self {
            source: source.to_string(),
            manifest,
            rule,
            error: Some(message),
        }
    }
}

fn print_validate_table(rows: &[ValidateRow]) {
    if rows.is_empty() {
        println!("No manifests to validate.");
        return;
    }

    for row in rows {
        let name = row.manifest.as_deref().unwrap_or("-");
        match (&row.error, row.rule) {
            (None, _) => println!("{} {:<20} {}", style("ok").green(), name, row.source),
            (Some(message), Some(rule)) => println!(
                "{} {:<20} {} [{}] {}",
                style("fail").red(),
                name,
                row.source,
                rule,
                message
            ),
            (Some(message), None) => {
                println!("{} {:<20} {} {}", style("fail").red(), name, row.source, message)
            }
        }
    }

    let failures = rows.iter().filter(|r| r.error.is_some()).count();
    println!();
    println!("{} manifest(s), {} rejected", rows.len(), failures);
}

fn print_validate_json(rows: &[ValidateRow]) -> Result<()> {
    let output: Vec<_> = rows
        .iter()
        .map(|r| {
            serde_json::json!({
                "source": r.source,
                "manifest": r.manifest,
                "valid": r.error.is_none(),
                "rule": r.rule,
                "error": r.error,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// =============================================================================
// Client commands
// =============================================================================

fn run_list(
    ctx: &ProjectContext,
    registry: &ClientRegistry,
    client: &str,
    format: OutputFormat,
) -> Result<()> {
    let adapter = registry.require(client)?;
    let servers = adapter
        .list_servers(ctx)
        .with_context(|| format!("Failed to read {} config", adapter.display_name()))?;

    match format {
        OutputFormat::Table => {
            if servers.is_empty() {
                println!("No servers configured for {}.", adapter.display_name());
                println!("Generate them with: devmcp sync --client {}", adapter.id());
            }
            for name in &servers {
                println!("{name}");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "client": adapter.id(),
                "path": adapter.relative_path(),
                "servers": servers,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn run_remove(
    ctx: &ProjectContext,
    registry: &ClientRegistry,
    client: &str,
    name: &str,
) -> Result<i32> {
    let adapter = registry.require(client)?;
    let removed = adapter
        .remove_server(ctx, name)
        .with_context(|| format!("Failed to update {} config", adapter.display_name()))?;

    if removed {
        println!(
            "Removed '{}' from {} ({})",
            name,
            adapter.relative_path(),
            adapter.reload().describe()
        );
        Ok(0)
    } else {
        println!("'{}' is not configured for {}", name, adapter.display_name());
        Ok(1)
    }
}

fn run_clients(registry: &ClientRegistry, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{:<14} {:<14} {:<20} Reload", "ID", "Name", "Config");
            println!("{}", "-".repeat(66));
            for client in registry.all() {
                println!(
                    "{:<14} {:<14} {:<20} {}",
                    client.id(),
                    client.display_name(),
                    client.relative_path(),
                    client.reload().describe()
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<_> = registry
                .all()
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "id": c.id(),
                        "name": c.display_name(),
                        "path": c.relative_path(),
                        "server_key": c.server_key(),
                        "reload": c.reload(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
