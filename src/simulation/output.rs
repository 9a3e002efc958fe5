//! Simulation output and serialization

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{CityIndex, CompartmentState, Day, MetroIndex};
use crate::population::{PendingTravelers, PopulationEntity};
use crate::simulation::engine::Simulation;

/// Complete output of one run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub metros: Vec<MetroOutput>,
    pub statistics: SimulationStats,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetroOutput {
    pub index: MetroIndex,
    pub name: String,
    pub hub: CityIndex,
    pub cities: Vec<CityHistory>,
    /// Member histories summed per day
    pub aggregate: Vec<CompartmentState>,
    pub hub_travel_log: Vec<PendingTravelers>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CityHistory {
    pub index: CityIndex,
    pub name: String,
    pub history: Vec<CompartmentState>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationStats {
    pub seed: u64,
    pub dt: f64,
    pub days_simulated: Day,
    pub simulation_time_ms: u64,
    pub metro_count: usize,
    pub city_count: usize,
    pub total_population: f64,
    pub peak_infected: f64,
    pub peak_day: Day,
    pub final_recovered: f64,
}

impl SimulationOutput {
    pub fn new(simulation: &Simulation, elapsed: Duration) -> Self {
        let metros: Vec<MetroOutput> = simulation
            .metros()
            .map(|metro| MetroOutput {
                index: metro.index,
                name: metro.name.clone(),
                hub: metro.hub_index(),
                cities: metro
                    .cities()
                    .iter()
                    .map(|city| CityHistory {
                        index: city.index,
                        name: city.name().to_string(),
                        history: city.history().to_vec(),
                    })
                    .collect(),
                aggregate: metro.aggregate_history(),
                hub_travel_log: metro.hub_travel_log().to_vec(),
            })
            .collect();

        // World-wide curve from the per-metro aggregates
        let days = metros.iter().map(|m| m.aggregate.len()).max().unwrap_or(0);
        let world: Vec<CompartmentState> = (0..days)
            .map(|day| {
                metros
                    .iter()
                    .filter_map(|m| m.aggregate.get(day))
                    .fold(CompartmentState::default(), |acc, s| acc.combined(s))
            })
            .collect();

        let (peak_day, peak_infected) = world
            .iter()
            .enumerate()
            .fold((0, 0.0), |best, (day, state)| {
                if state.i > best.1 {
                    (day, state.i)
                } else {
                    best
                }
            });

        let last = world.last().copied().unwrap_or_default();

        Self {
            statistics: SimulationStats {
                seed: simulation.config().seed,
                dt: simulation.config().dt,
                days_simulated: simulation.day(),
                simulation_time_ms: elapsed.as_millis() as u64,
                metro_count: metros.len(),
                city_count: metros.iter().map(|m| m.cities.len()).sum(),
                total_population: last.total(),
                peak_infected,
                peak_day,
                final_recovered: last.r,
            },
            metros,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn summary(&self) -> String {
        let stats = &self.statistics;
        format!(
            "Simulated {} steps (dt = {}) over {} metros / {} cities in {}ms\n\
             Peak infected {:.1} on step {}, {:.1} recovered of {:.0} at the end",
            stats.days_simulated,
            stats.dt,
            stats.metro_count,
            stats.city_count,
            stats.simulation_time_ms,
            stats.peak_infected,
            stats.peak_day,
            stats.final_recovered,
            stats.total_population,
        )
    }
}
