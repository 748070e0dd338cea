//!
//! Randomized value generator.
//!
//! [`Fill`] gives every shape a default way to populate itself with random
//! data. A [`Filler`] drives it from a seeded ChaCha stream and consults a
//! table of shape-keyed overrides ([`FillFunc`]) before falling back to the
//! default, so callers can constrain fields whose valid values a naive
//! generator would get wrong.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::scheme::Scheme;

// Default Fill impls for std and crate types, plus the impl_fill! macro.
mod impls;

// Built-in override sets.
pub mod funcs;

pub use funcs::{meta_funcs, wire_funcs};

/// A shape that can populate itself with random data.
///
/// Implementations must overwrite every field; the harness fills deep copies
/// of reference instances and relies on nothing of the reference surviving.
/// Nested values go through [`Continue::fill`] so overrides apply to them.
pub trait Fill {
    fn fill(&mut self, c: &mut Continue<'_>);
}

type ErasedFillFn = dyn Fn(&mut dyn Any, &mut Continue<'_>) + Send + Sync;

/// An override for one shape, replacing its default [`Fill`] impl.
#[derive(Clone)]
pub struct FillFunc {
    type_id: TypeId,
    type_name: &'static str,
    func: Arc<ErasedFillFn>,
}

impl FillFunc {
    pub fn new<T, F>(func: F) -> Self
    where
        T: Any,
        F: Fn(&mut T, &mut Continue<'_>) + Send + Sync + 'static,
    {
        FillFunc {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            func: Arc::new(move |value: &mut dyn Any, c: &mut Continue<'_>| {
                if let Some(value) = value.downcast_mut::<T>() {
                    func(value, c);
                }
            }),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl std::fmt::Debug for FillFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FillFunc").field(&self.type_name).finish()
    }
}

/// Factory for a set of overrides. Receives the scheme the generator is
/// being built for.
pub type FuzzerFuncs = fn(&Scheme) -> Vec<FillFunc>;

/// Tuning knobs for default fills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillOptions {
    /// Probability that an `Option` is left `None`.
    pub nil_chance: f64,
    pub min_elements: usize,
    pub max_elements: usize,
    /// Nesting depth past which optional values and collections stay empty.
    pub max_depth: usize,
}

impl Default for FillOptions {
    fn default() -> Self {
        FillOptions { nil_chance: 0.5, min_elements: 0, max_elements: 1, max_depth: 20 }
    }
}

/// State handed to every fill call.
pub struct Continue<'a> {
    rng: &'a mut ChaCha8Rng,
    funcs: &'a HashMap<TypeId, FillFunc>,
    options: &'a FillOptions,
    depth: usize,
}

impl<'a> Continue<'a> {
    /// Fills `value`, using the override registered for `T` if there is one.
    pub fn fill<T: Fill + 'static>(&mut self, value: &mut T) {
        let custom = self.funcs.get(&TypeId::of::<T>()).map(|f| Arc::clone(&f.func));
        match custom {
            Some(func) => {
                let value: &mut dyn Any = value;
                self.depth += 1;
                func(value, self);
                self.depth -= 1;
            }
            None => self.fill_no_custom(value),
        }
    }

    /// Fills `value` with its default impl, ignoring any override for `T`.
    /// Nested values still see overrides.
    pub fn fill_no_custom<T: Fill>(&mut self, value: &mut T) {
        if self.exhausted() {
            return;
        }
        self.depth += 1;
        value.fill(self);
        self.depth -= 1;
    }

    /// Whether the nesting limit has been reached.
    pub fn exhausted(&self) -> bool {
        self.depth >= self.options.max_depth
    }

    pub fn bool(&mut self) -> bool {
        self.rng.gen()
    }

    /// Uniform in `0..n`; `0` when `n <= 0`.
    pub fn int31n(&mut self, n: i32) -> i32 {
        if n <= 0 {
            0
        } else {
            self.rng.gen_range(0..n)
        }
    }

    pub fn u32(&mut self) -> u32 {
        self.rng.gen()
    }

    /// Whether an optional value should be left unset.
    pub fn nil(&mut self) -> bool {
        self.exhausted() || self.rng.gen_bool(self.options.nil_chance)
    }

    /// Length for a generated collection.
    pub fn element_count(&mut self) -> usize {
        if self.exhausted() {
            return 0;
        }
        self.rng.gen_range(self.options.min_elements..=self.options.max_elements)
    }

    /// A random string of up to 19 characters drawn from printable ASCII,
    /// Latin-1/IPA and CJK ranges.
    pub fn string(&mut self) -> String {
        const RANGES: [(u32, u32); 3] = [(0x20, 0x7e), (0xa0, 0x2af), (0x4e00, 0x9fff)];
        let len = self.rng.gen_range(0..20);
        (0..len)
            .filter_map(|_| {
                let (lo, hi) = RANGES[self.rng.gen_range(0..RANGES.len())];
                char::from_u32(self.rng.gen_range(lo..=hi))
            })
            .collect()
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut *self.rng
    }
}

impl RngCore for Continue<'_> {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// A configured random value generator.
///
/// Constructed fresh per test run; it is deterministic for a given seed and
/// set of overrides.
#[derive(Debug)]
pub struct Filler {
    rng: ChaCha8Rng,
    seed: u64,
    funcs: HashMap<TypeId, FillFunc>,
    options: FillOptions,
}

impl Filler {
    /// A generator seeded from the operating system's entropy source.
    pub fn new() -> Self {
        Filler::with_seed(os_seed())
    }

    pub fn with_seed(seed: u64) -> Self {
        Filler {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            funcs: HashMap::new(),
            options: FillOptions::default(),
        }
    }

    /// Adds overrides. A later override for a shape replaces an earlier one.
    pub fn funcs(mut self, funcs: impl IntoIterator<Item = FillFunc>) -> Self {
        for func in funcs {
            tracing::trace!(shape = func.type_name, "registering fill override");
            self.funcs.insert(func.type_id, func);
        }
        self
    }

    /// Probability of leaving optional values unset, clamped to `0.0..=1.0`.
    pub fn nil_chance(mut self, p: f64) -> Self {
        self.options.nil_chance = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self
    }

    pub fn num_elements(mut self, min: usize, max: usize) -> Self {
        self.options.min_elements = min.min(max);
        self.options.max_elements = max.max(min);
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Switches to an independent stream of the same seed, restarting at its
    /// beginning. Stream 0 is the one `with_seed` starts on.
    pub fn stream(mut self, stream: u64) -> Self {
        self.rng.set_stream(stream);
        self.rng.set_word_pos(0);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    pub fn has_override<T: Any>(&self) -> bool {
        self.funcs.contains_key(&TypeId::of::<T>())
    }

    pub fn fill<T: Fill + 'static>(&mut self, value: &mut T) {
        let mut c = Continue { rng: &mut self.rng, funcs: &self.funcs, options: &self.options, depth: 0 };
        c.fill(value);
    }
}

impl Default for Filler {
    fn default() -> Self {
        Filler::new()
    }
}

/// A seed from the operating system's entropy source.
pub fn os_seed() -> u64 {
    rand_core::OsRng.next_u64()
}

/// Builds a generator with the built-in rules followed by `funcs`, seeded
/// from the operating system.
pub fn get_fuzzer(scheme: &Scheme, funcs: &[FuzzerFuncs]) -> Filler {
    get_fuzzer_with_seed(scheme, funcs, os_seed())
}

/// Builds a generator with the built-in rules followed by `funcs`.
///
/// Metadata rules come first, then the wire-safety rules, then the caller's
/// factories in order; the last rule registered for a shape wins.
pub fn get_fuzzer_with_seed(scheme: &Scheme, funcs: &[FuzzerFuncs], seed: u64) -> Filler {
    let builtin: [FuzzerFuncs; 2] = [meta_funcs, wire_funcs];
    let merged = builtin.iter().chain(funcs).flat_map(|factory| factory(scheme));
    Filler::with_seed(seed).funcs(merged)
}
