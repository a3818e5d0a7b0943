//! Named volume parsing and project-local host path assignment.

/// Directory under `.devcontainer/` holding persistent service data.
pub const DATA_ROOT: &str = "data";

/// Directory under `.devcontainer/` holding service logs.
pub const LOG_ROOT: &str = "logs";

/// A `name:/container/path[:ro|:rw]` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSpec {
    pub name: String,
    pub container_path: String,
    pub read_only: bool,
}

impl VolumeSpec {
    pub fn parse(spec: &str) -> Result<Self, String> {
        let mut parts = spec.trim().splitn(3, ':');
        let name = parts.next().unwrap_or_default();
        let container_path = parts
            .next()
            .ok_or_else(|| format!("volume '{spec}' must be 'name:/container/path'"))?;
        let read_only = match parts.next() {
            None | Some("rw") => false,
            Some("ro") => true,
            Some(mode) => return Err(format!("volume '{spec}' has unknown mode '{mode}'")),
        };

        if name.is_empty() || !name.chars().all(is_volume_name_char) || name.starts_with('.') {
            return Err(format!(
                "volume name '{name}' must be a named volume ([A-Za-z0-9_.-]), not a host path"
            ));
        }
        if !container_path.starts_with('/') {
            return Err(format!(
                "volume '{spec}' must mount at an absolute container path"
            ));
        }

        Ok(Self {
            name: name.to_string(),
            container_path: container_path.to_string(),
            read_only,
        })
    }
}

fn is_volume_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Host data directory for one volume, relative to `.devcontainer/`.
///
/// Keyed only by manifest, service and volume name so re-synthesis from the
/// same inputs lands on the same directory.
pub fn data_dir(manifest: &str, service: &str, volume: &str) -> String {
    format!("{DATA_ROOT}/{manifest}/{service}/{volume}")
}

/// Log directory for a service, relative to `.devcontainer/`.
pub fn log_dir(manifest: &str, service: &str) -> String {
    format!("{LOG_ROOT}/{manifest}/{service}")
}
