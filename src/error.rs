//!
//! Defines error types for the stash, the scheme, configuration and the harness.

use crate::conversion::ConversionError;
use crate::harness::{Direction, Phase};
use crate::semantic::Divergence;
use crate::types::GroupVersionKind;

/// Errors from storing or restoring stashed conversion data.
#[derive(Debug, thiserror::Error)]
pub enum StashError {
    /// The source could not be turned into a generic value tree.
    #[error("failed to convert source to unstructured: {0}")]
    ToUnstructured(#[source] serde_json::Error),
    /// The source serialized to something other than a structured object.
    #[error("failed to convert source to unstructured: not a structured object")]
    NotAnObject,
    /// The stripped value tree could not be encoded.
    #[error("failed to marshal source object: {0}")]
    Marshal(#[source] serde_json::Error),
    /// The restore target could not be turned into a generic value tree.
    #[error("failed to convert restore target to unstructured: {0}")]
    Target(#[source] serde_json::Error),
    /// The annotation value is not valid data for the target.
    #[error("failed to unmarshal data annotation: {0}")]
    Unmarshal(#[source] serde_json::Error),
}

/// Errors from registering types in a `Scheme`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemeError {
    /// The kind or the type is already registered against something else.
    #[error("conflicting registration for {kind}: {type_name}")]
    Conflict { kind: GroupVersionKind, type_name: &'static str },
}

/// Errors from reading harness settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue { key: &'static str, value: String, reason: String },
}

/// Everything that terminates a harness phase.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// No reference instance was supplied and the scheme has no prototype.
    #[error("no reference instance or scheme prototype for {type_name}")]
    MissingPrototype { type_name: &'static str },
    /// An object lacks a capability the harness was configured to use.
    #[error("{type_name} does not provide {capability}")]
    MissingCapability { type_name: &'static str, capability: &'static str },
    /// Harness settings could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A conversion function returned an error.
    #[error("{phase}: iteration {iteration} (seed {seed}): {direction} failed: {source}")]
    Conversion {
        phase: Phase,
        iteration: usize,
        seed: u64,
        direction: Direction,
        #[source]
        source: ConversionError,
    },
    /// The round trip changed the object.
    #[error("{phase}: iteration {iteration} (seed {seed}): round trip diverged at {divergence}\n{diff}")]
    Mismatch { phase: Phase, iteration: usize, seed: u64, divergence: Divergence, diff: String },
    /// Objects could not be serialized for comparison.
    #[error("{phase}: iteration {iteration}: semantic comparison failed: {source}")]
    Semantic {
        phase: Phase,
        iteration: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl HarnessError {
    /// Configuration and setup defects, as opposed to failures of the
    /// conversions under test.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            HarnessError::MissingPrototype { .. }
                | HarnessError::MissingCapability { .. }
                | HarnessError::Config(_)
        )
    }
}
