//! Synthesis pipeline.
//!
//! Validation runs per manifest; aggregation and topology run over the whole
//! set; the environment and every enabled client config are then regenerated
//! from scratch.

pub mod synthesis;

pub use synthesis::{SynthesisPlan, SynthesisReport, Synthesizer, check_manifests, load_manifests};
