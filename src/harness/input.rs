//! Inputs to a round-trip test.

use std::fmt;

use crate::fill::FuzzerFuncs;
use crate::scheme::Scheme;

/// Post-processing applied to the converted-back spoke before comparison.
pub type SpokeMutation<S> = Box<dyn Fn(&mut S) + Send + Sync>;

/// Everything a round-trip test needs. Fields left unset fall back to the
/// scheme (for the reference instances), the environment, then defaults.
pub struct FuzzTestInput<H, S> {
    pub scheme: Scheme,
    /// Reference hub; every iteration starts from a clone of it.
    pub hub: Option<H>,
    /// Reference spoke; every iteration starts from a clone of it.
    pub spoke: Option<S>,
    pub spoke_after_mutation: Option<SpokeMutation<S>>,
    /// Leave the stash annotation on the converted-back spoke.
    pub skip_spoke_annotation_cleanup: bool,
    /// Compare an empty JSON object as if the member were unset. Only for
    /// types whose optional maps do not skip themselves when empty; it also
    /// hides `Some(empty struct)` turning into `None`.
    pub empty_objects_as_unset: bool,
    /// Applied after the built-in metadata rules; later entries win.
    pub fuzzer_funcs: Vec<FuzzerFuncs>,
    /// Iterations per phase.
    pub n: Option<usize>,
    pub seed: Option<u64>,
}

impl<H, S> FuzzTestInput<H, S> {
    pub fn new(hub: H, spoke: S) -> Self {
        FuzzTestInput { hub: Some(hub), spoke: Some(spoke), ..Self::from_scheme(Scheme::new()) }
    }

    /// Reference instances come from `scheme` prototypes.
    pub fn from_scheme(scheme: Scheme) -> Self {
        FuzzTestInput {
            scheme,
            hub: None,
            spoke: None,
            spoke_after_mutation: None,
            skip_spoke_annotation_cleanup: false,
            empty_objects_as_unset: false,
            fuzzer_funcs: Vec::new(),
            n: None,
            seed: None,
        }
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_spoke_after_mutation<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut S) + Send + Sync + 'static,
    {
        self.spoke_after_mutation = Some(Box::new(f));
        self
    }

    pub fn with_skip_spoke_annotation_cleanup(mut self, skip: bool) -> Self {
        self.skip_spoke_annotation_cleanup = skip;
        self
    }

    pub fn with_empty_objects_as_unset(mut self, enabled: bool) -> Self {
        self.empty_objects_as_unset = enabled;
        self
    }

    pub fn with_fuzzer_funcs(mut self, funcs: impl IntoIterator<Item = FuzzerFuncs>) -> Self {
        self.fuzzer_funcs.extend(funcs);
        self
    }

    pub fn with_iterations(mut self, n: usize) -> Self {
        self.n = Some(n);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl<H: fmt::Debug, S: fmt::Debug> fmt::Debug for FuzzTestInput<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzTestInput")
            .field("scheme", &self.scheme)
            .field("hub", &self.hub)
            .field("spoke", &self.spoke)
            .field("spoke_after_mutation", &self.spoke_after_mutation.is_some())
            .field("skip_spoke_annotation_cleanup", &self.skip_spoke_annotation_cleanup)
            .field("empty_objects_as_unset", &self.empty_objects_as_unset)
            .field("fuzzer_funcs", &self.fuzzer_funcs.len())
            .field("n", &self.n)
            .field("seed", &self.seed)
            .finish()
    }
}
