//! Requirement aggregation across manifests.
//!
//! Runtime constraints are grouped by name and resolved to one concrete
//! version. Every comparator proposes a candidate (its literal, or the
//! neighbouring version at the same precision for strict `<`/`>` bounds)
//! and the highest candidate every constraint admits wins. Bare literals act
//! as floors. When no candidate satisfies everyone, the highest candidate is
//! used and each unsatisfied constraint becomes a [`RequirementConflict`].
//! Conflicts never abort synthesis.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::manifest::Manifest;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedRequirements {
    /// Runtime name → resolved version literal
    pub runtimes: BTreeMap<String, String>,
    /// Deduplicated system requirement names
    pub system: BTreeSet<String>,
    pub conflicts: Vec<RequirementConflict>,
}

/// A declared constraint the resolved version does not satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementConflict {
    pub runtime: String,
    pub manifest: String,
    pub constraint: String,
    pub resolved: String,
}

impl std::fmt::Display for RequirementConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} resolved to {} but manifest '{}' requires '{}'",
            self.runtime, self.resolved, self.manifest, self.constraint
        )
    }
}

/// Operator of a single comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Bare,
    Exact,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Caret,
    Tilde,
}

impl Op {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "" => Some(Op::Bare),
            "=" | "==" => Some(Op::Exact),
            ">" => Some(Op::Greater),
            ">=" => Some(Op::GreaterEq),
            "<" => Some(Op::Less),
            "<=" => Some(Op::LessEq),
            "^" | "~=" => Some(Op::Caret),
            "~" => Some(Op::Tilde),
            _ => None,
        }
    }

    fn as_req(self) -> &'static str {
        match self {
            Op::Bare | Op::GreaterEq => ">=",
            Op::Exact => "=",
            Op::Greater => ">",
            Op::Less => "<",
            Op::LessEq => "<=",
            Op::Caret => "^",
            Op::Tilde => "~",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub op: Op,
    pub literal: String,
}

impl Comparator {
    fn new(op: Op, literal: &str) -> Self {
        Self {
            op,
            literal: literal.to_string(),
        }
    }

    /// The version this comparator proposes.
    pub fn candidate(&self) -> Option<String> {
        match self.op {
            Op::Less => predecessor(&self.literal),
            Op::Greater => successor(&self.literal),
            _ => Some(self.literal.clone()),
        }
    }
}

/// Split a constraint into comparators. Commas and whitespace both separate
/// comparators (`">=3.9, <4"`, `">=3.9 <4"`, `">= 3.9"`); unknown operators
/// are dropped.
pub fn comparators(constraint: &str) -> Vec<Comparator> {
    let mut parsed = Vec::new();
    let mut pending = String::new();

    for token in constraint
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let split = token
            .find(|c: char| !matches!(c, '<' | '>' | '=' | '^' | '~' | '!' | '|'))
            .unwrap_or(token.len());
        let (op_text, literal) = token.split_at(split);
        pending.push_str(op_text);
        if literal.is_empty() {
            continue;
        }

        match Op::parse(&pending) {
            Some(op) => parsed.push(Comparator::new(op, literal.trim_start_matches('v'))),
            None => tracing::debug!("ignoring comparator '{}{}' in '{}'", pending, literal, constraint),
        }
        pending.clear();
    }
    parsed
}

struct Declared<'a> {
    manifest: &'a str,
    constraint: &'a str,
    comparators: Vec<Comparator>,
    requirement: Option<semver::VersionReq>,
}

impl<'a> Declared<'a> {
    fn new(manifest: &'a str, constraint: &'a str) -> Self {
        let comparators = comparators(constraint);
        let requirement = requirement(&comparators);
        Self {
            manifest,
            constraint,
            comparators,
            requirement,
        }
    }

    /// Non-numeric candidates and constraints semver cannot express are
    /// always admitted.
    fn admits(&self, candidate: &str) -> bool {
        match (parse_literal(candidate), &self.requirement) {
            (Some(version), Some(req)) => req.matches(&version),
            _ => true,
        }
    }
}

fn requirement(comparators: &[Comparator]) -> Option<semver::VersionReq> {
    if comparators.is_empty() {
        return None;
    }
    let text = comparators
        .iter()
        .map(|c| format!("{}{}", c.op.as_req(), c.literal))
        .collect::<Vec<_>>()
        .join(", ");
    semver::VersionReq::parse(&text).ok()
}

pub fn aggregate(manifests: &[Manifest]) -> AggregatedRequirements {
    let mut grouped: BTreeMap<&str, Vec<Declared<'_>>> = BTreeMap::new();
    let mut system = BTreeSet::new();

    for manifest in manifests {
        for runtime in &manifest.requirements.runtimes {
            grouped
                .entry(runtime.name.trim())
                .or_default()
                .push(Declared::new(&manifest.name, runtime.version.trim()));
        }
        for requirement in &manifest.requirements.system {
            system.insert(requirement.name.trim().to_string());
        }
    }

    let mut runtimes = BTreeMap::new();
    let mut conflicts = Vec::new();
    for (name, declared) in grouped {
        let mut candidates: Vec<String> = declared
            .iter()
            .flat_map(|d| d.comparators.iter().filter_map(Comparator::candidate))
            .collect();
        candidates.sort_by(|a, b| compare_literals(a, b));
        candidates.dedup();

        let Some(resolved) = candidates
            .iter()
            .rev()
            .find(|c| declared.iter().all(|d| d.admits(c)))
            .or(candidates.last())
            .cloned()
        else {
            tracing::warn!("runtime {} has no usable version constraint", name);
            continue;
        };

        for d in declared.iter().filter(|d| !d.admits(&resolved)) {
            let conflict = RequirementConflict {
                runtime: name.to_string(),
                manifest: d.manifest.to_string(),
                constraint: d.constraint.to_string(),
                resolved: resolved.clone(),
            };
            tracing::warn!("requirement conflict: {}", conflict);
            conflicts.push(conflict);
        }
        tracing::debug!(
            "runtime {} resolved to {} from {} declaration(s)",
            name,
            resolved,
            declared.len()
        );
        runtimes.insert(name.to_string(), resolved);
    }

    AggregatedRequirements {
        runtimes,
        system,
        conflicts,
    }
}

/// Numeric components of a literal with one to three parts.
fn components(literal: &str) -> Option<Vec<u64>> {
    let parts = literal
        .split('.')
        .map(|part| part.parse().ok())
        .collect::<Option<Vec<u64>>>()?;
    (1..=3).contains(&parts.len()).then_some(parts)
}

fn join(parts: &[u64]) -> String {
    parts
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Highest version below `literal` at its precision: `3.12` → `3.11`,
/// `4.0` → `3`.
fn predecessor(literal: &str) -> Option<String> {
    let mut parts = components(literal)?;
    let last = parts.iter().rposition(|&p| p > 0)?;
    parts[last] -= 1;
    parts.truncate(last + 1);
    Some(join(&parts))
}

/// Next version above `literal` at its precision: `3.9` → `3.10`.
fn successor(literal: &str) -> Option<String> {
    let mut parts = components(literal)?;
    if let Some(last) = parts.last_mut() {
        *last += 1;
    }
    Some(join(&parts))
}

/// Parse a version literal, filling missing minor/patch with zero.
pub fn parse_literal(literal: &str) -> Option<semver::Version> {
    let parts = components(literal)?;
    let at = |i: usize| parts.get(i).copied().unwrap_or(0);
    Some(semver::Version::new(at(0), at(1), at(2)))
}

/// Numeric literals compare semantically, then by spelling so `3.11` and
/// `3.11.0` order the same way regardless of input order. Anything else
/// ranks below them and compares lexically among itself.
pub fn compare_literals(a: &str, b: &str) -> Ordering {
    match (parse_literal(a), parse_literal(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{RuntimeRequirement, SystemRequirement};

    fn needing(name: &str, runtimes: &[(&str, &str)]) -> Manifest {
        let mut manifest = Manifest::new(name, "npx");
        manifest.requirements.runtimes = runtimes
            .iter()
            .map(|(n, v)| RuntimeRequirement::new(*n, *v))
            .collect();
        manifest
    }

    #[test]
    fn picks_highest_python_literal() {
        let manifests = vec![
            needing("a", &[("python", "3.9")]),
            needing("b", &[("python", "3.11")]),
            needing("c", &[("python", "3.10")]),
        ];

        let aggregated = aggregate(&manifests);

        assert_eq!(aggregated.runtimes["python"], "3.11");
        assert!(aggregated.conflicts.is_empty());
    }

    #[test]
    fn groups_runtimes_independently() {
        let manifests = vec![
            needing("a", &[("python", "3.12"), ("node", "18")]),
            needing("b", &[("node", "20")]),
        ];

        let aggregated = aggregate(&manifests);

        assert_eq!(aggregated.runtimes.len(), 2);
        assert_eq!(aggregated.runtimes["node"], "20");
        assert_eq!(aggregated.runtimes["python"], "3.12");
    }

    #[test]
    fn range_operators_contribute_their_literal() {
        let manifests = vec![
            needing("a", &[("node", ">=18")]),
            needing("b", &[("node", "16")]),
        ];

        let aggregated = aggregate(&manifests);

        assert_eq!(aggregated.runtimes["node"], "18");
    }

    #[test]
    fn incompatible_ranges_are_reported_not_fatal() {
        let manifests = vec![
            needing("legacy", &[("python", "<2.0")]),
            needing("modern", &[("python", ">=3.0")]),
        ];

        let aggregated = aggregate(&manifests);

        assert_eq!(aggregated.runtimes["python"], "3.0");
        assert_eq!(aggregated.conflicts.len(), 1);
        assert_eq!(aggregated.conflicts[0].manifest, "legacy");
        assert_eq!(aggregated.conflicts[0].constraint, "<2.0");
    }

    #[test]
    fn named_channels_rank_below_numbers() {
        let manifests = vec![
            needing("a", &[("node", "lts")]),
            needing("b", &[("node", "20")]),
        ];
        assert_eq!(aggregate(&manifests).runtimes["node"], "20");

        let only_channel = vec![needing("a", &[("node", "lts")])];
        assert_eq!(aggregate(&only_channel).runtimes["node"], "lts");
    }

    #[test]
    fn system_requirements_are_deduplicated() {
        let mut a = Manifest::new("a", "npx");
        a.requirements.system = vec![
            SystemRequirement {
                name: "docker".to_string(),
                check: Some("docker --version".to_string()),
            },
            SystemRequirement {
                name: "git".to_string(),
                check: None,
            },
        ];
        let mut b = Manifest::new("b", "npx");
        b.requirements.system = vec![SystemRequirement {
            name: "docker".to_string(),
            check: None,
        }];

        let aggregated = aggregate(&[a, b]);

        assert_eq!(
            aggregated.system.into_iter().collect::<Vec<_>>(),
            vec!["docker".to_string(), "git".to_string()]
        );
    }

    #[test]
    fn literal_parsing_and_ordering() {
        assert_eq!(parse_literal("3"), Some(semver::Version::new(3, 0, 0)));
        assert_eq!(parse_literal("3.11"), Some(semver::Version::new(3, 11, 0)));
        assert_eq!(parse_literal("1.2.3.4"), None);
        assert_eq!(parse_literal("lts"), None);
        assert_eq!(compare_literals("3.10", "3.9"), Ordering::Greater);
        assert_eq!(compare_literals("3.11.0", "3.11"), Ordering::Greater);
        assert_eq!(compare_literals("lts", "3"), Ordering::Less);
    }

    #[test]
    fn comparators_split_on_commas_and_whitespace() {
        let expected = vec![
            Comparator::new(Op::GreaterEq, "3.9"),
            Comparator::new(Op::Less, "4"),
        ];
        assert_eq!(comparators(">=3.9, <4"), expected);
        assert_eq!(comparators(">=3.9 <4"), expected);
        assert_eq!(comparators(">= 3.9 , < 4"), expected);
        assert_eq!(comparators("v18"), vec![Comparator::new(Op::Bare, "18")]);
        assert_eq!(comparators("~=3.9"), vec![Comparator::new(Op::Caret, "3.9")]);
        assert!(comparators("!=3.9").is_empty());
    }

    #[test]
    fn strict_bounds_propose_neighbouring_versions() {
        assert_eq!(Comparator::new(Op::Less, "3.12").candidate().as_deref(), Some("3.11"));
        assert_eq!(Comparator::new(Op::Less, "4.0").candidate().as_deref(), Some("3"));
        assert_eq!(Comparator::new(Op::Less, "0.0").candidate(), None);
        assert_eq!(Comparator::new(Op::Greater, "3.9").candidate().as_deref(), Some("3.10"));
        assert_eq!(Comparator::new(Op::LessEq, "3.12").candidate().as_deref(), Some("3.12"));
    }

    #[test]
    fn lone_upper_bound_resolves_below_it() {
        let aggregated = aggregate(&[needing("a", &[("python", "<3.12")])]);

        assert_eq!(aggregated.runtimes["python"], "3.11");
        assert!(aggregated.conflicts.is_empty());
    }

    #[test]
    fn upper_bound_with_lower_literal_picks_highest_admitted() {
        let manifests = vec![
            needing("a", &[("python", "<3.12")]),
            needing("b", &[("python", "3.9")]),
        ];

        let aggregated = aggregate(&manifests);

        assert_eq!(aggregated.runtimes["python"], "3.11");
        assert!(aggregated.conflicts.is_empty());
    }

    #[test]
    fn exclusive_lower_bound_does_not_conflict_with_itself() {
        let aggregated = aggregate(&[needing("a", &[("python", ">3.9")])]);

        assert_eq!(aggregated.runtimes["python"], "3.10");
        assert!(aggregated.conflicts.is_empty());
    }

    #[test]
    fn space_separated_range_resolves_to_a_clean_literal() {
        let aggregated = aggregate(&[needing("a", &[("python", ">=3.9 <4")])]);

        assert_eq!(aggregated.runtimes["python"], "3.9");
        assert!(aggregated.conflicts.is_empty());
    }

    #[test]
    fn space_separated_range_reports_conflicts() {
        let manifests = vec![
            needing("a", &[("python", ">=3.9 <3.11")]),
            needing("b", &[("python", "3.12")]),
        ];

        let aggregated = aggregate(&manifests);

        assert_eq!(aggregated.runtimes["python"], "3.12");
        assert_eq!(aggregated.conflicts.len(), 1);
        assert_eq!(aggregated.conflicts[0].manifest, "a");
    }

    #[test]
    fn equal_spellings_resolve_the_same_in_any_order() {
        let forward = vec![
            needing("a", &[("python", "3.11")]),
            needing("b", &[("python", "3.11.0")]),
        ];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();

        let resolved = aggregate(&forward).runtimes["python"].clone();

        assert_eq!(resolved, "3.11.0");
        assert_eq!(aggregate(&reversed).runtimes["python"], resolved);
    }
}
