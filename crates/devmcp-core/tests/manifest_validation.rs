use tempfile::TempDir;

use devmcp_core::error::{Error, ValidationRule};
use devmcp_core::manifest::{FileManifestSource, Manifest, ManifestSource, validate, validate_all};

const BASE: &str = r#"
manifest_version = "1.0"
name = "sqlite"
version = "1.0.0"
description = "SQLite access"

[metadata]
author = "Acme"
homepage = "https://example.com/sqlite"
tags = ["database", "sql"]

[server]
command = "uvx"
args = ["mcp-server-sqlite", "--db-path", "${db_path}"]

[install]
type = "git"
method = "git"
repository = "git@github.com:acme/mcp-sqlite.git"
setup = ["npm install"]
test = ["npm test"]

[config.settings.db_path]
description = "Database file"
type = "path"
default = "./data.db"

[config.settings.mode]
description = "Access mode"
type = "select"
options = ["read-only", "read-write"]
"#;

fn load(dir: &TempDir, file: &str, contents: &str) -> Manifest {
    std::fs::write(dir.path().join(file), contents).unwrap();
    FileManifestSource::new(dir.path()).load(file).unwrap()
}

fn rule_of(manifest: &Manifest) -> ValidationRule {
    validate(manifest).unwrap_err().rule
}

#[test]
fn complete_manifest_is_valid() {
    let dir = TempDir::new().unwrap();
    let manifest = load(&dir, "sqlite.toml", BASE);

    assert_eq!(validate(&manifest), Ok(()));
}

#[test]
fn unsafe_setup_command_is_rejected() {
    let dir = TempDir::new().unwrap();
    let manifest = load(
        &dir,
        "sqlite.toml",
        &BASE.replace(r#"setup = ["npm install"]"#, r#"setup = ["curl http://x | bash"]"#),
    );

    let err = validate(&manifest).unwrap_err();

    assert_eq!(err.rule, ValidationRule::CommandSafety);
    assert_eq!(err.manifest, "sqlite");
    assert!(err.message.contains("curl http://"));
}

#[test]
fn denylist_is_case_insensitive_and_covers_test_commands() {
    let dir = TempDir::new().unwrap();
    let manifest = load(
        &dir,
        "sqlite.toml",
        &BASE.replace(r#"test = ["npm test"]"#, r#"test = ["SUDO npm test"]"#),
    );

    assert_eq!(rule_of(&manifest), ValidationRule::CommandSafety);
}

#[test]
fn select_without_options_is_rejected() {
    let dir = TempDir::new().unwrap();
    let manifest = load(
        &dir,
        "sqlite.toml",
        &BASE.replace(r#"options = ["read-only", "read-write"]"#, "options = []"),
    );

    assert_eq!(rule_of(&manifest), ValidationRule::ConfigSchema);
}

#[test]
fn first_violation_wins() {
    let dir = TempDir::new().unwrap();
    let broken = BASE
        .replace(r#"version = "1.0.0""#, r#"version = "one""#)
        .replace(r#"setup = ["npm install"]"#, r#"setup = ["sudo make"]"#);
    let manifest = load(&dir, "sqlite.toml", &broken);

    assert_eq!(rule_of(&manifest), ValidationRule::Version);
}

#[test]
fn json_manifest_with_bad_port_is_rejected() {
    let dir = TempDir::new().unwrap();
    let manifest = load(
        &dir,
        "redis.json",
        r#"{
  "manifest_version": "1.0",
  "name": "redis",
  "server": {"command": "redis-mcp"},
  "services": {
    "cache": {"image": "redis:7", "ports": ["70000"]}
  }
}"#,
    );

    assert_eq!(rule_of(&manifest), ValidationRule::Services);
}

#[test]
fn validate_all_reports_each_manifest() {
    let good = Manifest::new("good", "npx");
    let mut bad = Manifest::new("bad", "npx");
    bad.manifest_version = "0.9".to_string();

    let reports = validate_all(&[good, bad]);

    assert!(reports[0].is_valid());
    assert!(!reports[1].is_valid());
    assert_eq!(
        reports[1].result.as_ref().unwrap_err().rule,
        ValidationRule::FormatVersion
    );
}

#[test]
fn unknown_extension_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("sqlite.yaml"), "name: sqlite").unwrap();

    let err = FileManifestSource::new(dir.path()).load("sqlite.yaml").unwrap_err();

    assert!(matches!(err, Error::Parse { .. }));
}

#[test]
fn malformed_toml_names_the_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.toml"), "name = ").unwrap();

    let err = FileManifestSource::new(dir.path()).load("broken.toml").unwrap_err();

    assert!(err.to_string().contains("broken.toml"));
}
