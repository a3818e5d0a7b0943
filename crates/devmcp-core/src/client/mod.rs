//! Editor client adapters.
//!
//! Every supported editor reads MCP server launch descriptors from a JSON file
//! in the project. Adapters differ only in where that file lives, which key
//! the server map nests under, and how the editor picks up changes. The
//! emission algorithm itself is shared in [`emit`].

pub mod claude_code;
pub mod cursor;
pub mod emit;
pub mod registry;
pub mod vscode;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::context::ProjectContext;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::secrets::SecretResolver;

pub use claude_code::ClaudeCodeClient;
pub use cursor::CursorClient;
pub use emit::{EmitOutcome, ServerEntry};
pub use registry::ClientRegistry;
pub use vscode::VsCodeClient;

/// Built-in editor integrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientKind {
    ClaudeCode,
    #[serde(rename = "vscode")]
    VsCode,
    Cursor,
}

impl ClientKind {
    pub const ALL: [ClientKind; 3] = [ClientKind::ClaudeCode, ClientKind::VsCode, ClientKind::Cursor];

    pub fn id(self) -> &'static str {
        match self {
            ClientKind::ClaudeCode => "claude-code",
            ClientKind::VsCode => "vscode",
            ClientKind::Cursor => "cursor",
        }
    }

    pub fn adapter(self) -> Box<dyn ClientAdapter> {
        match self {
            ClientKind::ClaudeCode => Box::new(ClaudeCodeClient::new()),
            ClientKind::VsCode => Box::new(VsCodeClient::new()),
            ClientKind::Cursor => Box::new(CursorClient::new()),
        }
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ClientKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ClientKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| Error::UnknownClient(s.to_string()))
    }
}

/// How an editor picks up a rewritten config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReloadPolicy {
    /// The editor must be restarted before new servers are visible.
    pub requires_restart: bool,
    /// The editor exposes a command or watcher that reloads servers in place.
    pub programmatic_reload: bool,
}

impl ReloadPolicy {
    pub const RESTART: ReloadPolicy = ReloadPolicy {
        requires_restart: true,
        programmatic_reload: false,
    };

    pub const LIVE: ReloadPolicy = ReloadPolicy {
        requires_restart: false,
        programmatic_reload: true,
    };

    pub fn describe(&self) -> &'static str {
        match (self.requires_restart, self.programmatic_reload) {
            (true, _) => "restart required",
            (false, true) => "live reload",
            (false, false) => "reload manually",
        }
    }
}

/// An editor integration.
///
/// Implementors declare the three variance points; emission, removal and
/// listing are provided on top of them.
pub trait ClientAdapter: Send + Sync + fmt::Debug {
    /// Stable identifier used in `devmcp.toml` and on the command line.
    fn id(&self) -> &'static str;

    /// Human-readable editor name.
    fn display_name(&self) -> &'static str;

    /// Top-level key the server map nests under.
    fn server_key(&self) -> &'static str;

    /// Config file location relative to the project root.
    fn relative_path(&self) -> &'static str;

    fn reload(&self) -> ReloadPolicy;

    fn config_path(&self, ctx: &ProjectContext) -> PathBuf {
        ctx.resolve(Path::new(self.relative_path()))
    }

    /// Regenerate the whole config file from `manifests`.
    fn emit(
        &self,
        ctx: &ProjectContext,
        manifests: &[Manifest],
        resolver: &dyn SecretResolver,
    ) -> Result<EmitOutcome> {
        emit::emit(self, ctx, manifests, resolver)
    }

    /// Drop one server entry; returns whether it was present.
    fn remove_server(&self, ctx: &ProjectContext, name: &str) -> Result<bool> {
        emit::remove_server(self, ctx, name)
    }

    fn list_servers(&self, ctx: &ProjectContext) -> Result<Vec<String>> {
        emit::list_servers(self, ctx)
    }
}
