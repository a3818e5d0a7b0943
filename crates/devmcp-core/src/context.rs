//! Project context for dependency injection.

use std::path::{Path, PathBuf};

use crate::config::CONFIG_FILE_NAME;
use crate::environment::DEVCONTAINER_DIR;

/// Devcontainer descriptor file name
pub const DEVCONTAINER_FILE: &str = "devcontainer.json";

/// Composition file name, next to the devcontainer descriptor
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// Paths of one project. Frontends create this once and pass it to the
/// pipeline and client adapters.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    project_root: PathBuf,
}

impl ProjectContext {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config_path(&self) -> PathBuf {
        self.project_root.join(CONFIG_FILE_NAME)
    }

    pub fn devcontainer_dir(&self) -> PathBuf {
        self.project_root.join(DEVCONTAINER_DIR)
    }

    pub fn devcontainer_path(&self) -> PathBuf {
        self.devcontainer_dir().join(DEVCONTAINER_FILE)
    }

    pub fn compose_path(&self) -> PathBuf {
        self.devcontainer_dir().join(COMPOSE_FILE)
    }

    /// Resolve a project-relative artifact path.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.project_root.join(relative)
    }
}
