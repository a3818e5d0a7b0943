//! VS Code (GitHub Copilot) client implementation.

use crate::client::{ClientAdapter, ReloadPolicy};

/// VS Code watches `.vscode/mcp.json` and restarts changed servers itself.
#[derive(Debug, Default)]
pub struct VsCodeClient;

impl VsCodeClient {
    pub fn new() -> Self {
        Self
    }
}

impl ClientAdapter for VsCodeClient {
    fn id(&self) -> &'static str {
        "vscode"
    }

    fn display_name(&self) -> &'static str {
        "VS Code"
    }

    // VS Code uses "servers" instead of "mcpServers"
    fn server_key(&self) -> &'static str {
        "servers"
    }

    fn relative_path(&self) -> &'static str {
        ".vscode/mcp.json"
    }

    fn reload(&self) -> ReloadPolicy {
        ReloadPolicy::LIVE
    }
}
