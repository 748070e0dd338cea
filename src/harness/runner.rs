//! Phase execution.

use std::any::type_name;
use std::fmt;

use serde::Serialize;

use crate::config::{HarnessConfig, DEFAULT_ITERATIONS};
use crate::conversion::{Convertible, Hub};
use crate::error::HarnessError;
use crate::fill::{get_fuzzer_with_seed, os_seed, Filler};
use crate::harness::input::FuzzTestInput;
use crate::semantic::{self, Normalization};
use crate::stash;

/// One of the two round trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    SpokeHubSpoke,
    HubSpokeHub,
}

impl Phase {
    /// Generator stream the phase draws from, so both phases of a seeded run
    /// see different objects.
    pub fn stream(self) -> u64 {
        match self {
            Phase::SpokeHubSpoke => 0,
            Phase::HubSpokeHub => 1,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::SpokeHubSpoke => "spoke-hub-spoke",
            Phase::HubSpokeHub => "hub-spoke-hub",
        })
    }
}

/// Which conversion function failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Spoke → hub.
    ConvertTo,
    /// Hub → spoke.
    ConvertFrom,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::ConvertTo => "convert_to (spoke -> hub)",
            Direction::ConvertFrom => "convert_from (hub -> spoke)",
        })
    }
}

/// A phase that completed every iteration. `seed` is the run's base seed,
/// which replays both phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSummary {
    pub phase: Phase,
    pub iterations: usize,
    pub seed: u64,
}

/// Outcome of both phases. A failure in one phase does not stop the other.
#[derive(Debug)]
pub struct FuzzReport {
    pub spoke_hub_spoke: Result<PhaseSummary, HarnessError>,
    pub hub_spoke_hub: Result<PhaseSummary, HarnessError>,
}

impl FuzzReport {
    pub fn is_success(&self) -> bool {
        self.spoke_hub_spoke.is_ok() && self.hub_spoke_hub.is_ok()
    }

    pub fn failures(&self) -> Vec<&HarnessError> {
        [&self.spoke_hub_spoke, &self.hub_spoke_hub]
            .into_iter()
            .filter_map(|r| r.as_ref().err())
            .collect()
    }

    /// Panics with every failure if either phase failed.
    #[track_caller]
    pub fn assert_passed(&self) {
        let failures = self.failures();
        if !failures.is_empty() {
            let lines: Vec<String> = failures.iter().map(|e| e.to_string()).collect();
            panic!("conversion round trips failed:\n{}", lines.join("\n"));
        }
    }
}

/// Source of environment settings.
pub type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A runnable round-trip test for hub `H` and spoke `S`.
pub struct FuzzTest<H, S> {
    input: FuzzTestInput<H, S>,
    env: EnvLookup,
}

/// Builds the round-trip test described by `input`.
pub fn fuzz_test_func<H, S>(input: FuzzTestInput<H, S>) -> FuzzTest<H, S>
where
    H: Hub,
    S: Convertible<H>,
{
    FuzzTest { input, env: Box::new(|key| std::env::var(key).ok()) }
}

impl<H, S> FuzzTest<H, S>
where
    H: Hub,
    S: Convertible<H>,
{
    pub fn input(&self) -> &FuzzTestInput<H, S> {
        &self.input
    }

    /// Reads settings through `lookup` instead of the process environment.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    /// Runs both phases.
    pub fn run(&self) -> FuzzReport {
        FuzzReport { spoke_hub_spoke: self.spoke_hub_spoke(), hub_spoke_hub: self.hub_spoke_hub() }
    }

    /// Runs both phases and panics on any failure.
    #[track_caller]
    pub fn check(&self) {
        self.run().assert_passed();
    }

    pub fn spoke_hub_spoke(&self) -> Result<PhaseSummary, HarnessError> {
        let phase = Phase::SpokeHubSpoke;
        let (hub, spoke) = self.references()?;
        if !self.input.skip_spoke_annotation_cleanup {
            let mut reference = spoke.clone();
            if reference.as_object_mut().is_none() {
                return Err(missing_metadata::<S>());
            }
        }
        let (n, seed) = self.settings()?;
        let mut fuzzer = self.fuzzer(phase, seed);
        tracing::debug!(%phase, n, seed, spoke = type_name::<S>(), hub = type_name::<H>(), "starting");

        for iteration in 0..n {
            let mut spoke_before = spoke.clone();
            fuzzer.fill(&mut spoke_before);

            let mut hub_copy = hub.clone();
            spoke_before.convert_to(&mut hub_copy).map_err(|source| HarnessError::Conversion {
                phase,
                iteration,
                seed,
                direction: Direction::ConvertTo,
                source,
            })?;

            let mut spoke_after = spoke.clone();
            spoke_after.convert_from(&hub_copy).map_err(|source| HarnessError::Conversion {
                phase,
                iteration,
                seed,
                direction: Direction::ConvertFrom,
                source,
            })?;

            if !self.input.skip_spoke_annotation_cleanup {
                let meta = spoke_after.as_object_mut().ok_or_else(missing_metadata::<S>)?;
                stash::delete(meta);
            }
            if let Some(mutate) = &self.input.spoke_after_mutation {
                mutate(&mut spoke_after);
            }

            self.compare(phase, iteration, seed, &spoke_before, &spoke_after)?;
        }

        tracing::info!(%phase, n, seed, "round trips passed");
        Ok(PhaseSummary { phase, iterations: n, seed })
    }

    pub fn hub_spoke_hub(&self) -> Result<PhaseSummary, HarnessError> {
        let phase = Phase::HubSpokeHub;
        let (hub, spoke) = self.references()?;
        let (n, seed) = self.settings()?;
        let mut fuzzer = self.fuzzer(phase, seed);
        tracing::debug!(%phase, n, seed, spoke = type_name::<S>(), hub = type_name::<H>(), "starting");

        for iteration in 0..n {
            let mut hub_before = hub.clone();
            fuzzer.fill(&mut hub_before);

            let mut spoke_copy = spoke.clone();
            spoke_copy.convert_from(&hub_before).map_err(|source| HarnessError::Conversion {
                phase,
                iteration,
                seed,
                direction: Direction::ConvertFrom,
                source,
            })?;

            let mut hub_after = hub.clone();
            spoke_copy.convert_to(&mut hub_after).map_err(|source| HarnessError::Conversion {
                phase,
                iteration,
                seed,
                direction: Direction::ConvertTo,
                source,
            })?;

            self.compare(phase, iteration, seed, &hub_before, &hub_after)?;
        }

        tracing::info!(%phase, n, seed, "round trips passed");
        Ok(PhaseSummary { phase, iterations: n, seed })
    }

    fn references(&self) -> Result<(H, S), HarnessError> {
        let hub = match &self.input.hub {
            Some(hub) => hub.clone(),
            None => self
                .input
                .scheme
                .new_object::<H>()
                .ok_or(HarnessError::MissingPrototype { type_name: type_name::<H>() })?,
        };
        let spoke = match &self.input.spoke {
            Some(spoke) => spoke.clone(),
            None => self
                .input
                .scheme
                .new_object::<S>()
                .ok_or(HarnessError::MissingPrototype { type_name: type_name::<S>() })?,
        };
        Ok((hub, spoke))
    }

    /// Iteration count and base seed: input, then environment, then
    /// defaults. Without a configured seed each phase draws its own.
    fn settings(&self) -> Result<(usize, u64), HarnessError> {
        let env = match (self.input.n, self.input.seed) {
            (Some(_), Some(_)) => HarnessConfig::default(),
            _ => HarnessConfig::from_lookup(|key| (self.env)(key))?,
        };
        let n = self.input.n.or(env.iterations).unwrap_or(DEFAULT_ITERATIONS);
        let seed = self.input.seed.or(env.seed).unwrap_or_else(os_seed);
        Ok((n, seed))
    }

    fn fuzzer(&self, phase: Phase, seed: u64) -> Filler {
        get_fuzzer_with_seed(&self.input.scheme, &self.input.fuzzer_funcs, seed).stream(phase.stream())
    }

    fn compare<T>(&self, phase: Phase, iteration: usize, seed: u64, before: &T, after: &T) -> Result<(), HarnessError>
    where
        T: Serialize + fmt::Debug,
    {
        let rules = Normalization { empty_objects_as_unset: self.input.empty_objects_as_unset };
        let divergence = rules
            .first_divergence(before, after)
            .map_err(|source| HarnessError::Semantic { phase, iteration, source })?;
        match divergence {
            None => Ok(()),
            Some(divergence) => {
                tracing::warn!(%phase, iteration, seed, %divergence, "round trip mismatch");
                Err(HarnessError::Mismatch {
                    phase,
                    iteration,
                    seed,
                    divergence,
                    diff: semantic::diff(before, after),
                })
            }
        }
    }
}

fn missing_metadata<S>() -> HarnessError {
    HarnessError::MissingCapability { type_name: type_name::<S>(), capability: "mutable object metadata" }
}

