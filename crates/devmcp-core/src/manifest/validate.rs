//! Manifest validation
//!
//! Every manifest passes through [`validate`] before it reaches aggregation.
//! Checks run in a fixed order and stop at the first violation.

use crate::error::{ValidationError, ValidationRule};
use crate::topology::{PortBinding, VolumeSpec};

use super::schema::{
    CONFIG_FIELD_TYPES, HealthCheck, InstallSpec, Manifest, Metadata, Requirements,
    SUPPORTED_MANIFEST_VERSION, ServiceSpec,
};

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Install source kinds.
pub const INSTALL_KINDS: &[&str] = &["git", "local", "file", "remote"];

/// Substrings that make an install command unsafe to run.
pub const DANGEROUS_COMMAND_PATTERNS: &[&str] = &[
    "rm -rf",
    "sudo",
    "chmod 777",
    "curl http://",
    "wget http://",
    "bash -c",
    "sh -c",
    "eval",
    "exec",
];

/// Outcome of validating one manifest, for reporting whole sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub manifest: String,
    pub result: Result<(), ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }
}

type Check = Result<(), ValidationError>;

/// Validate one manifest, returning the first violated rule.
pub fn validate(manifest: &Manifest) -> Check {
    let name = manifest.name.as_str();

    check_format_version(manifest)?;
    check_top_level(manifest)?;
    if let Some(metadata) = &manifest.metadata {
        check_metadata(name, metadata)?;
    }
    check_requirements(name, &manifest.requirements)?;
    if let Some(install) = &manifest.install {
        check_install(name, install)?;
    }
    for (service_name, service) in &manifest.services {
        check_service(name, service_name, service)?;
    }
    check_config_schema(manifest)?;

    Ok(())
}

/// Validate every manifest independently.
pub fn validate_all(manifests: &[Manifest]) -> Vec<ValidationReport> {
    manifests
        .iter()
        .map(|manifest| ValidationReport {
            manifest: manifest.name.clone(),
            result: validate(manifest),
        })
        .collect()
}

/// `^[a-z][a-z0-9-]*[a-z0-9]$`
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) if bytes.len() >= 2 => {
            first.is_ascii_lowercase()
                && (last.is_ascii_lowercase() || last.is_ascii_digit())
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        }
        _ => false,
    }
}

/// `^[a-z][a-z0-9-]*$`
pub fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        }
        _ => false,
    }
}

/// `^\d+[smh]$`
pub fn is_valid_duration(value: &str) -> bool {
    match value.strip_suffix(['s', 'm', 'h']) {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// First denylisted pattern found in `command`, compared case-insensitively.
pub fn dangerous_pattern(command: &str) -> Option<&'static str> {
    let lowered = command.to_lowercase();
    DANGEROUS_COMMAND_PATTERNS
        .iter()
        .copied()
        .find(|pattern| lowered.contains(*pattern))
}

fn check_format_version(manifest: &Manifest) -> Check {
    if manifest.manifest_version != SUPPORTED_MANIFEST_VERSION {
        return Err(ValidationError::new(
            &manifest.name,
            ValidationRule::FormatVersion,
            format!(
                "unsupported manifest_version '{}', expected '{}'",
                manifest.manifest_version, SUPPORTED_MANIFEST_VERSION
            ),
        ));
    }
    Ok(())
}

fn check_top_level(manifest: &Manifest) -> Check {
    let name = manifest.name.as_str();
    if !is_valid_name(name) {
        return Err(ValidationError::new(
            name,
            ValidationRule::Name,
            format!(
                "name '{name}' must start with a lowercase letter, contain only lowercase letters, digits and '-', and not end with '-'"
            ),
        ));
    }

    if let Some(version) = &manifest.version
        && let Err(e) = semver::Version::parse(version)
    {
        return Err(ValidationError::new(
            name,
            ValidationRule::Version,
            format!("version '{version}' is not valid semver: {e}"),
        ));
    }

    if let Some(description) = &manifest.description {
        let len = description.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::new(
                name,
                ValidationRule::Description,
                format!("description is {len} characters, limit is {MAX_DESCRIPTION_LEN}"),
            ));
        }
    }
    Ok(())
}

fn check_metadata(name: &str, metadata: &Metadata) -> Check {
    let urls = [
        ("homepage", &metadata.homepage),
        ("repository", &metadata.repository),
        ("documentation", &metadata.documentation),
    ];
    for (field, value) in urls {
        if let Some(raw) = value
            && let Err(e) = url::Url::parse(raw)
        {
            return Err(ValidationError::new(
                name,
                ValidationRule::Metadata,
                format!("{field} '{raw}' is not a valid URL: {e}"),
            ));
        }
    }

    if let Some(tag) = metadata.tags.iter().find(|t| !is_valid_tag(t)) {
        return Err(ValidationError::new(
            name,
            ValidationRule::Metadata,
            format!("tag '{tag}' must be lowercase letters, digits and '-'"),
        ));
    }
    Ok(())
}

fn check_requirements(name: &str, requirements: &Requirements) -> Check {
    if requirements.system.iter().any(|r| r.name.trim().is_empty()) {
        return Err(ValidationError::new(
            name,
            ValidationRule::Requirements,
            "system requirement has an empty name",
        ));
    }
    for runtime in &requirements.runtimes {
        if runtime.name.trim().is_empty() {
            return Err(ValidationError::new(
                name,
                ValidationRule::Requirements,
                "runtime requirement has an empty name",
            ));
        }
        if runtime.version.trim().is_empty() {
            return Err(ValidationError::new(
                name,
                ValidationRule::Requirements,
                format!("runtime '{}' needs a version constraint", runtime.name),
            ));
        }
    }
    Ok(())
}

fn check_install(name: &str, install: &InstallSpec) -> Check {
    let fail = |message: String| Err(ValidationError::new(name, ValidationRule::Install, message));

    if !INSTALL_KINDS.contains(&install.kind.as_str()) {
        return fail(format!(
            "install type '{}' must be one of: {}",
            install.kind,
            INSTALL_KINDS.join(", ")
        ));
    }
    if install.method != install.kind {
        return fail(format!(
            "install method '{}' does not match type '{}'",
            install.method, install.kind
        ));
    }
    if install.kind == "git" {
        match install.repository.as_deref() {
            Some(repo) if is_repository_url(repo) => {}
            Some(repo) => return fail(format!("repository '{repo}' is not a valid URL")),
            None => return fail("git install requires a repository URL".to_string()),
        }
    }
    if install.setup.is_empty() {
        return fail("install needs at least one setup command".to_string());
    }

    for command in install.commands() {
        if let Some(pattern) = dangerous_pattern(command) {
            return Err(ValidationError::new(
                name,
                ValidationRule::CommandSafety,
                format!("command '{command}' contains forbidden pattern '{pattern}'"),
            ));
        }
    }
    Ok(())
}

/// Accepts URLs and scp-style `user@host:path` remotes.
fn is_repository_url(repo: &str) -> bool {
    if url::Url::parse(repo).is_ok() {
        return true;
    }
    match repo.split_once('@').and_then(|(_, rest)| rest.split_once(':')) {
        Some((host, path)) => !host.is_empty() && !path.is_empty() && !host.contains('/'),
        None => false,
    }
}

fn check_service(name: &str, service_name: &str, service: &ServiceSpec) -> Check {
    let fail = |message: String| {
        Err(ValidationError::new(
            name,
            ValidationRule::Services,
            format!("service '{service_name}': {message}"),
        ))
    };

    if !is_valid_name(service_name) {
        return fail("name must be a lowercase slug".to_string());
    }
    if service.image.trim().is_empty() {
        return fail("image must not be empty".to_string());
    }
    for port in &service.ports {
        if let Err(e) = PortBinding::parse(port) {
            return fail(e);
        }
    }
    for volume in &service.volumes {
        if let Err(e) = VolumeSpec::parse(volume) {
            return fail(e);
        }
    }
    if let Some(healthcheck) = &service.healthcheck
        && let Err(message) = check_healthcheck(healthcheck)
    {
        return fail(message);
    }
    Ok(())
}

fn check_healthcheck(healthcheck: &HealthCheck) -> Result<(), String> {
    if healthcheck.test.is_empty() || healthcheck.test.iter().all(|t| t.trim().is_empty()) {
        return Err("healthcheck test must not be empty".to_string());
    }
    if healthcheck.retries < 0 {
        return Err(format!(
            "healthcheck retries must be >= 0, got {}",
            healthcheck.retries
        ));
    }
    for (field, value) in [
        ("interval", &healthcheck.interval),
        ("timeout", &healthcheck.timeout),
    ] {
        if let Some(value) = value
            && !is_valid_duration(value)
        {
            return Err(format!(
                "healthcheck {field} '{value}' must look like 30s, 5m or 1h"
            ));
        }
    }
    Ok(())
}

fn check_config_schema(manifest: &Manifest) -> Check {
    for (key, field) in manifest.config.fields() {
        let fail = |message: String| {
            Err(ValidationError::new(
                &manifest.name,
                ValidationRule::ConfigSchema,
                format!("config '{key}': {message}"),
            ))
        };
        if field.description.trim().is_empty() {
            return fail("description is required".to_string());
        }
        if !CONFIG_FIELD_TYPES.contains(&field.field_type.as_str()) {
            return fail(format!(
                "type '{}' must be one of: {}",
                field.field_type,
                CONFIG_FIELD_TYPES.join(", ")
            ));
        }
        if matches!(field.field_type.as_str(), "select" | "multiselect") && field.options.is_empty()
        {
            return fail(format!("type '{}' requires options", field.field_type));
        }
    }
    Ok(())
}
