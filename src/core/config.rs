//! Simulation configuration with documented constants
//!
//! Every run-level knob lives here. Values that only make sense for one
//! topology (which city hosts the airport, where patient zero lives) are
//! injectable policies rather than literals.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{CityIndex, EpidemicParams, MetroIndex};
use crate::population::HubPolicy;

/// Where the single initial infection is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedLocation {
    pub metro: MetroIndex,
    pub city: CityIndex,
}

impl Default for SeedLocation {
    fn default() -> Self {
        // Matches the default FixedIndex(10) hub of a 13-city binary tree
        Self { metro: 0, city: 10 }
    }
}

/// Configuration for one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated time horizon (days)
    pub final_time: f64,

    /// Euler step size. One step is one recorded history entry.
    ///
    /// Also scales the travel probabilities: a city with outgoing weight W and
    /// population N sends W * dt / N of each compartment per step, so dt must
    /// stay small enough that this sum is at most 1.
    pub dt: f64,

    /// Master seed. Every random draw is a substream of this seed.
    pub seed: u64,

    /// Default per-City rates, overridable per metro in a scenario
    pub epidemic: EpidemicParams,

    /// Rule choosing each MetroArea's airport city
    pub hub_policy: HubPolicy,

    /// Patient zero
    pub seed_location: SeedLocation,

    /// Minimum metro count before the intra-metro phase runs on rayon
    ///
    /// Below this, thread overhead exceeds the benefit. Results are identical
    /// either way because every metro draws from its own substream.
    pub parallel_threshold: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            final_time: 100.0,
            dt: 0.1,
            seed: 12345,
            epidemic: EpidemicParams::default(),
            hub_policy: HubPolicy::default(),
            seed_location: SeedLocation::default(),
            parallel_threshold: 64,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of Euler steps in the run
    pub fn step_number(&self) -> usize {
        (self.final_time / self.dt).floor() as usize
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::ConfigurationError(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }

        if !(self.final_time.is_finite() && self.final_time >= 0.0) {
            return Err(SimError::ConfigurationError(format!(
                "final_time must be non-negative, got {}",
                self.final_time
            )));
        }

        if self.epidemic.infection_rate < 0.0 || self.epidemic.recovery_rate < 0.0 {
            return Err(SimError::ConfigurationError(
                "epidemic rates must be non-negative".into(),
            ));
        }

        Ok(())
    }
}
