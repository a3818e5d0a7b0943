//! Cursor client implementation.

use crate::client::{ClientAdapter, ReloadPolicy};

#[derive(Debug, Default)]
pub struct CursorClient;

impl CursorClient {
    pub fn new() -> Self {
        Self
    }
}

impl ClientAdapter for CursorClient {
    fn id(&self) -> &'static str {
        "cursor"
    }

    fn display_name(&self) -> &'static str {
        "Cursor"
    }

    fn server_key(&self) -> &'static str {
        "mcpServers"
    }

    fn relative_path(&self) -> &'static str {
        ".cursor/mcp.json"
    }

    // Cursor only rereads project MCP config on window reload
    fn reload(&self) -> ReloadPolicy {
        ReloadPolicy::RESTART
    }
}
