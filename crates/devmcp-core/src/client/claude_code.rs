//! Claude Code client implementation.

use crate::client::{ClientAdapter, ReloadPolicy};

/// Project-scoped `.mcp.json`, read once at session start.
#[derive(Debug, Default)]
pub struct ClaudeCodeClient;

impl ClaudeCodeClient {
    pub fn new() -> Self {
        Self
    }
}

impl ClientAdapter for ClaudeCodeClient {
    fn id(&self) -> &'static str {
        "claude-code"
    }

    fn display_name(&self) -> &'static str {
        "Claude Code"
    }

    fn server_key(&self) -> &'static str {
        "mcpServers"
    }

    fn relative_path(&self) -> &'static str {
        ".mcp.json"
    }

    fn reload(&self) -> ReloadPolicy {
        ReloadPolicy::RESTART
    }
}
