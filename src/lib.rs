#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! Conversion-Fuzz checks that conversions between a "spoke" version of a
//! resource and its canonical "hub" version are lossless in both directions.
//!
//! The crate provides two pieces that resource-specific conversion code
//! builds on: a data stash that parks hub-only fields in an annotation while
//! an object lives at an older version, and a fuzz-driven round-trip harness
//! that fills objects with random values, converts them there and back, and
//! reports the first structural difference.

// Shared wire-level value types (Time, IntOrString, kinds, reserved keys).
pub mod types;

// Identity metadata and the `Object` capability.
pub mod primitives;

// Re-export the metadata types for easier access at the crate root.
pub use primitives::*;

// Spoke/hub capability traits.
pub mod conversion;

pub use conversion::{ConversionError, Convertible, Hub, RuntimeObject};

// Annotation-backed data stash.
pub mod stash;

// Explicit type registry.
pub mod scheme;

// Randomized value generator.
pub mod fill;

// Semantic equality and structural diffs.
pub mod semantic;

// Error types shared across modules.
pub mod error;

// Environment-driven harness settings.
pub mod config;

// Round-trip harness.
pub mod harness;

pub use harness::{fuzz_test_func, FuzzReport, FuzzTest, FuzzTestInput};

#[cfg(feature = "test-utils")]
pub mod test_utils;
