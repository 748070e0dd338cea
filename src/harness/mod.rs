//! Spoke↔hub round-trip fuzzing.
//!
//! `fuzz_test_func` turns a [`FuzzTestInput`] into a [`FuzzTest`] that runs
//! two phases, each `n` times with freshly generated objects:
//!
//! * spoke-hub-spoke: fill a spoke, convert it to the hub and back, and
//!   require the result to equal the filled spoke;
//! * hub-spoke-hub: the same, starting from a filled hub.
//!
//! Failures carry the phase, the iteration and the seed, so a run can be
//! replayed with `CONVERSION_FUZZ_SEED`.

pub mod input;
pub mod runner;

pub use input::{FuzzTestInput, SpokeMutation};
pub use runner::{fuzz_test_func, Direction, FuzzReport, FuzzTest, Phase, PhaseSummary};
