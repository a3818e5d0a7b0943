//! Secret placeholder expansion.
//!
//! Manifest arguments and environment values may embed `${name}`
//! placeholders. They are resolved at emission time through a
//! [`SecretResolver`]. A placeholder that cannot be resolved stays in the
//! output verbatim, so the editor fails loudly at launch instead of starting
//! a server with a blank credential.

use std::collections::{BTreeMap, HashMap};

const OPEN: &str = "${";
const CLOSE: char = '}';

/// Source of secret values, looked up by placeholder name.
pub trait SecretResolver {
    fn resolve(&self, name: &str) -> Option<String>;
}

impl<F> SecretResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, name: &str) -> Option<String> {
        self(name)
    }
}

impl SecretResolver for BTreeMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl SecretResolver for HashMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Resolver that never finds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSecrets;

impl SecretResolver for NoSecrets {
    fn resolve(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Resolves secrets from process environment variables.
///
/// With a prefix of `DEVMCP_`, `${api_key}` reads `DEVMCP_api_key`.
#[derive(Debug, Default, Clone)]
pub struct EnvSecretResolver {
    prefix: String,
}

impl EnvSecretResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl SecretResolver for EnvSecretResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        std::env::var(format!("{}{}", self.prefix, name)).ok()
    }
}

/// Replace every resolvable `${name}` in `value`.
///
/// Single left-to-right pass. Substituted text is never re-scanned, and an
/// unterminated `${` leaves the rest of the string untouched.
pub fn expand(value: &str, resolver: &dyn SecretResolver) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];

        let Some(end) = after_open.find(CLOSE) else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after_open[..end];
        let placeholder = &rest[start..start + OPEN.len() + end + 1];
        match resolve_non_empty(name, resolver) {
            Some(secret) => out.push_str(&secret),
            None => {
                tracing::debug!("leaving placeholder '{}' unresolved", name);
                out.push_str(placeholder);
            }
        }
        rest = &after_open[end + 1..];
    }

    out.push_str(rest);
    out
}

fn resolve_non_empty(name: &str, resolver: &dyn SecretResolver) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    resolver.resolve(name).filter(|value| !value.is_empty())
}

/// Placeholder names referenced by `value`, in order of appearance.
pub fn placeholders(value: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = value;
    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        if end > 0 {
            names.push(&after_open[..end]);
        }
        rest = &after_open[end + 1..];
    }
    names
}
