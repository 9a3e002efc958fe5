//! Scenario files: everything a batch of runs needs, loaded from TOML
//!
//! ```toml
//! runs = 2
//! airport_weight_multiplier = 180.0
//!
//! [simulation]
//! final_time = 100.0
//! dt = 0.1
//! seed = 42
//! hub_policy = { policy = "fixed_index", index = 10 }
//! seed_location = { metro = 346, city = 10 }
//!
//! [topology]
//! kind = "rary_tree"
//! arity = 2
//!
//! [[metros]]
//! index = 346
//! name = "Toronto"
//! populations = [2930000, 120000, 95000]
//!
//! [[routes]]
//! origin = 346
//! destination = 82
//! raw_weight = 3
//! ```

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::network::builder::{BuildReport, MetroDescriptor, MetroNetwork, NetworkBuilder, Route, DEFAULT_AIRPORT_MULTIPLIER};
use crate::network::graph::WeightedGraph;
use crate::network::topology::TopologyKind;
use crate::simulation::engine::{from_networks_to_populations, Simulation};
use crate::simulation::output::SimulationOutput;

fn default_multiplier() -> f64 {
    DEFAULT_AIRPORT_MULTIPLIER
}

fn default_runs() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub topology: TopologyKind,
    #[serde(default = "default_multiplier")]
    pub airport_weight_multiplier: f64,
    /// Independent runs; run k uses seed + k
    #[serde(default = "default_runs")]
    pub runs: usize,
    pub metros: Vec<MetroDescriptor>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// Networks built once and shared by every run of a batch
#[derive(Debug, Clone)]
pub struct BuiltNetworks {
    pub metros: Vec<MetroNetwork>,
    pub airport: WeightedGraph,
    pub report: BuildReport,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn build_networks(&self) -> Result<BuiltNetworks> {
        let mut builder = NetworkBuilder::new().with_airport_multiplier(self.airport_weight_multiplier);
        let topology = &self.topology;
        let metros = builder.build_metro_networks(&self.metros, |n| topology.generate(n))?;
        let airport = builder.build_airport_network(&self.routes);

        let report = builder.report().clone();
        if !report.clamped_edges.is_empty() {
            tracing::info!("{} edges were clamped to weight 1", report.clamped_edges.len());
        }

        Ok(BuiltNetworks {
            metros,
            airport,
            report,
        })
    }

    /// Fresh populations over prebuilt networks, seeded with `seed`
    pub fn build_simulation(&self, networks: &BuiltNetworks, seed: u64) -> Result<Simulation> {
        let config = SimulationConfig {
            seed,
            ..self.simulation.clone()
        };
        let metros = from_networks_to_populations(&networks.metros, config.epidemic, &config.hub_policy)?;
        Simulation::new(config, metros, networks.airport.clone())
    }

    /// Build the networks once, then run every simulation to completion
    pub fn run_batch(&self) -> Result<Vec<SimulationOutput>> {
        let networks = self.build_networks()?;
        let mut outputs = Vec::with_capacity(self.runs);

        for run in 0..self.runs {
            tracing::info!("{}/{} simulation!", run, self.runs);
            let seed = self.simulation.seed.wrapping_add(run as u64);

            let start = Instant::now();
            let mut simulation = self.build_simulation(&networks, seed)?;
            simulation.run()?;
            outputs.push(SimulationOutput::new(&simulation, start.elapsed()));
        }

        Ok(outputs)
    }
}
