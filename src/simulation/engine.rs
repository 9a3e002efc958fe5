//! Simulation engine - owns time and the entity registry, drives each day
//!
//! Every day runs three phases in a fixed order:
//! 1. **Integrate** -- Euler step of the SIR equations in every City.
//! 2. **Intra-metro movement** -- compute travelers for every City, apply
//!    them across each metro's city graph, then refresh populations and
//!    append one history entry per City.
//! 3. **Inter-metro movement** -- compute travelers for every hub, apply them
//!    across the airport graph, refresh hub populations and overwrite the
//!    hub's newest history entry.
//!
//! Populations are refreshed only after a phase's moves are all applied, so
//! every probability in a phase is computed against the same snapshot.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{CompartmentState, Day, EpidemicParams, MetroIndex};
use crate::network::builder::MetroNetwork;
use crate::network::graph::WeightedGraph;
use crate::population::{City, Connections, HubPolicy, MetroArea, PopulationEntity};
use crate::simulation::epidemic;
use crate::simulation::rng::{substream, Phase};
use crate::transport::{apply_travelers, compute_travelers};

/// Turn built metro networks into Cities and MetroAreas
///
/// Each City starts fully susceptible at its node population with the
/// metro's rates (or `default_params`).
pub fn from_networks_to_populations(
    networks: &[MetroNetwork],
    default_params: EpidemicParams,
    hub_policy: &HubPolicy,
) -> Result<Vec<MetroArea>> {
    networks
        .iter()
        .map(|network| {
            let params = network.epidemic.unwrap_or(default_params);
            let cities = network
                .cities
                .iter()
                .enumerate()
                .map(|(node, attrs)| {
                    City::new(
                        attrs.name.clone(),
                        node,
                        CompartmentState::susceptible(attrs.population),
                        params,
                    )
                })
                .collect();
            MetroArea::new(
                network.name.clone(),
                network.index,
                cities,
                network.graph.clone(),
                hub_policy,
            )
        })
        .collect()
}

/// A single simulation run
pub struct Simulation {
    config: SimulationConfig,
    step_number: usize,
    day: Day,
    metros: BTreeMap<MetroIndex, MetroArea>,
    airport_network: WeightedGraph,
}

impl Simulation {
    /// Validate, wire all connections and seed patient zero
    ///
    /// Every setup problem surfaces here, before any step runs.
    pub fn new(
        config: SimulationConfig,
        metro_areas: Vec<MetroArea>,
        airport_network: WeightedGraph,
    ) -> Result<Self> {
        config.validate()?;

        let mut metros = BTreeMap::new();
        for metro in metro_areas {
            let index = metro.index;
            if metros.insert(index, metro).is_some() {
                return Err(SimError::ConfigurationError(format!(
                    "metro index {} appears twice",
                    index
                )));
            }
        }

        let mut simulation = Self {
            step_number: config.step_number(),
            config,
            day: 0,
            metros,
            airport_network,
        };

        simulation.set_connections_cities()?;
        simulation.set_connections_airports()?;
        simulation.set_initial_conditions()?;

        Ok(simulation)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn step_number(&self) -> usize {
        self.step_number
    }

    pub fn is_finished(&self) -> bool {
        self.day >= self.step_number
    }

    pub fn metros(&self) -> impl Iterator<Item = &MetroArea> {
        self.metros.values()
    }

    pub fn metro(&self, index: MetroIndex) -> Option<&MetroArea> {
        self.metros.get(&index)
    }

    pub fn airport_network(&self) -> &WeightedGraph {
        &self.airport_network
    }

    /// Run every remaining day
    ///
    /// A fatal error stops the run immediately; history recorded so far
    /// stays available through the accessors.
    pub fn run(&mut self) -> Result<()> {
        while !self.is_finished() {
            self.step()?;
        }
        tracing::info!("Simulation finished after {} days", self.day);
        Ok(())
    }

    /// Advance one day. No-op once the run is finished.
    pub fn step(&mut self) -> Result<()> {
        if self.is_finished() {
            return Ok(());
        }

        tracing::debug!("Day :{}", self.day as f64 * self.config.dt);

        self.euler_step()?;
        self.inner_movement()?;
        self.outer_movement()?;

        self.day += 1;
        Ok(())
    }

    fn euler_step(&mut self) -> Result<()> {
        let dt = self.config.dt;
        for metro in self.metros.values_mut() {
            for city in metro.cities_mut() {
                epidemic::euler_step(city, dt)?;
            }
        }
        Ok(())
    }

    fn inner_movement(&mut self) -> Result<()> {
        let seed = self.config.seed;
        let dt = self.config.dt;
        let day = self.day;

        if self.metros.len() >= self.config.parallel_threshold {
            self.metros
                .par_iter_mut()
                .try_for_each(|(_, metro)| move_within_metro(metro, seed, day, dt))?;
        } else {
            self.metros
                .values_mut()
                .try_for_each(|metro| move_within_metro(metro, seed, day, dt))?;
        }

        // Deferred until every metro has moved
        self.update_all_populations();
        Ok(())
    }

    fn outer_movement(&mut self) -> Result<()> {
        let mut rng = substream(self.config.seed, Phase::InterMetro, self.day, 0);

        for metro in self.metros.values_mut() {
            let total = compute_travelers(metro, self.config.dt, &mut rng)?;
            tracing::debug!(
                "The total outer travelers at day {} at metropolitan area {} were {}",
                self.day,
                metro.name,
                total
            );
            if let Some(travelers) = metro.pending_travelers().cloned() {
                metro.log_hub_travelers(travelers);
            }
        }

        apply_travelers(&self.airport_network, &mut self.metros, &mut rng)?;
        for metro in self.metros.values_mut() {
            metro.clear_pending_travelers();
        }

        self.update_airport_populations();
        Ok(())
    }

    fn update_all_populations(&mut self) {
        for metro in self.metros.values_mut() {
            for city in metro.cities_mut() {
                city.refresh_population();
                city.record_history();
            }
        }
    }

    fn update_airport_populations(&mut self) {
        for metro in self.metros.values_mut() {
            metro.refresh_population();
            // Replace rather than append, keeping every history the same length
            metro.hub_mut().overwrite_last_history();
        }
    }

    fn set_connections_cities(&mut self) -> Result<()> {
        for metro in self.metros.values_mut() {
            let wiring: Vec<(usize, Connections)> = metro
                .network()
                .nodes()
                .map(|node| (node, metro.network().neighbors(node).collect()))
                .collect();

            for (node, connections) in wiring {
                let name = metro.name.clone();
                let city = metro.city_mut(node).ok_or_else(|| {
                    SimError::ConfigurationError(format!("metro {} has no city {}", name, node))
                })?;
                city.set_connections(connections);
            }
        }
        Ok(())
    }

    fn set_connections_airports(&mut self) -> Result<()> {
        for node in self.airport_network.nodes() {
            let connections: Connections = self.airport_network.neighbors(node).collect();

            if let Some(missing) = connections.keys().find(|n| !self.metros.contains_key(*n)) {
                return Err(SimError::ConfigurationError(format!(
                    "route from metro {} to unknown metro {}",
                    node, missing
                )));
            }

            let metro = self.metros.get_mut(&node).ok_or_else(|| {
                SimError::ConfigurationError(format!("airport network references unknown metro {}", node))
            })?;
            metro.set_connections(connections);
        }
        Ok(())
    }

    fn set_initial_conditions(&mut self) -> Result<()> {
        let location = self.config.seed_location;

        let metro = self.metros.get_mut(&location.metro).ok_or_else(|| {
            SimError::ConfigurationError(format!("seed metro {} does not exist", location.metro))
        })?;
        let city = metro.city_mut(location.city).ok_or_else(|| {
            SimError::ConfigurationError(format!(
                "seed city {} does not exist in metro {}",
                location.city, location.metro
            ))
        })?;

        if city.compartment_state().s < 1.0 {
            return Err(SimError::InvalidPopulationState {
                entity: city.name.clone(),
                reason: "no susceptible individual to seed".into(),
            });
        }

        let state = city.compartment_state_mut();
        state.s -= 1.0;
        state.i += 1.0;
        city.overwrite_last_history();

        tracing::info!("Patient zero is in {}!!", city.name);
        Ok(())
    }
}

/// Compute and apply one metro's city-level moves on its own substream
fn move_within_metro(metro: &mut MetroArea, seed: u64, day: Day, dt: f64) -> Result<()> {
    let mut rng = substream(seed, Phase::IntraMetro, day, metro.index as u64);

    let mut total_inner_travelers = 0;
    for city in metro.cities_mut() {
        total_inner_travelers += compute_travelers(city, dt, &mut rng)?;
    }
    tracing::debug!(
        "The total inner travelers at day {} at metropolitan area {} were {}",
        day,
        metro.name,
        total_inner_travelers
    );

    let (network, cities) = metro.network_and_cities_mut();
    apply_travelers(network, &mut *cities, &mut rng)?;
    for city in cities.iter_mut() {
        city.clear_pending_travelers();
    }
    Ok(())
}
