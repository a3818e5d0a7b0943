//! Filesystem primitives for generated artifacts.
//!
//! Every artifact is written whole: parent directories are created, the file
//! is overwritten, and JSON goes through `serde_json::Value` first so object
//! keys come out sorted.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Write `contents` to `path`, creating parent directories.
pub fn write_artifact(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::io("create directory", parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| Error::io("write", path, e))?;
    tracing::debug!("wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// Canonical pretty JSON with sorted keys and a trailing newline.
pub fn to_canonical_json<T: Serialize>(value: &T, path: &Path) -> Result<Vec<u8>> {
    let json_err = |source| Error::Json {
        path: path.to_path_buf(),
        source,
    };
    let value = serde_json::to_value(value).map_err(json_err)?;
    let mut bytes = serde_json::to_vec_pretty(&value).map_err(json_err)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serialize `value` canonically and write it to `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = to_canonical_json(value, path)?;
    write_artifact(path, &bytes)
}

/// Read a JSON object from `path`; a missing file reads as `None`.
pub fn read_json_object(path: &Path) -> Result<Option<Map<String, Value>>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io("read", path, e)),
    };
    let value: Value = serde_json::from_slice(&bytes).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(Error::MalformedArtifact {
            path: path.to_path_buf(),
            message: "expected a JSON object at the root".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn write_json_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/deep/config.json");

        write_json(&path, &json!({"key": "value"})).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn canonical_json_sorts_keys_and_ends_with_newline() {
        #[derive(Serialize)]
        struct Unsorted {
            zeta: u8,
            alpha: u8,
        }

        let bytes = to_canonical_json(&Unsorted { zeta: 1, alpha: 2 }, Path::new("x.json")).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.find("alpha").unwrap() < text.find("zeta").unwrap());
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn write_overwrites_whole_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "{\"stale\": true, \"padding\": \"xxxxxxxxxxxxxxxx\"}").unwrap();

        write_json(&path, &json!({"fresh": true})).unwrap();

        let loaded = read_json_object(&path).unwrap().unwrap();
        assert!(loaded.contains_key("fresh"));
        assert!(!loaded.contains_key("stale"));
    }

    #[test]
    fn read_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(read_json_object(&temp.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn read_rejects_non_object_root() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("array.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let err = read_json_object(&path).unwrap_err();

        assert!(matches!(err, Error::MalformedArtifact { .. }));
    }

    #[test]
    fn read_reports_invalid_json_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = read_json_object(&path).unwrap_err();

        assert!(err.to_string().contains("broken.json"));
    }
}
