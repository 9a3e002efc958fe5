//! MetroArea - a fixed set of Cities anchored to one hub (airport) city

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{CityIndex, CompartmentState, MetroIndex};
use crate::network::graph::WeightedGraph;
use crate::population::city::City;
use crate::population::entity::{Connections, EntityRegistry, PendingTravelers, PopulationEntity};

/// Rule picking the airport city of every MetroArea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum HubPolicy {
    /// The city with this node index
    FixedIndex { index: CityIndex },
    /// The most populous city; ties go to the lowest index
    LargestPopulation,
}

impl Default for HubPolicy {
    fn default() -> Self {
        HubPolicy::FixedIndex { index: 10 }
    }
}

impl HubPolicy {
    pub fn select(&self, cities: &[City]) -> Option<CityIndex> {
        match self {
            HubPolicy::FixedIndex { index } => cities.iter().find(|c| c.index == *index).map(|c| c.index),
            HubPolicy::LargestPopulation => cities
                .iter()
                .fold(None, |best: Option<&City>, city| match best {
                    Some(b) if b.current_population() >= city.current_population() => Some(b),
                    _ => Some(city),
                })
                .map(|c| c.index),
        }
    }
}

/// A metropolitan area; its compartments and population mirror the hub city
#[derive(Debug, Clone)]
pub struct MetroArea {
    pub name: String,
    pub index: MetroIndex,
    /// Sorted so that position == city index
    cities: Vec<City>,
    hub: CityIndex,
    network: WeightedGraph,
    connections: Connections,
    pending: Option<PendingTravelers>,
    /// Inter-metro departures computed for the hub, one entry per day
    hub_travel_log: Vec<PendingTravelers>,
}

impl MetroArea {
    pub fn new(
        name: String,
        index: MetroIndex,
        mut cities: Vec<City>,
        network: WeightedGraph,
        hub_policy: &HubPolicy,
    ) -> Result<Self> {
        cities.sort_by_key(|c| c.index);
        if let Some((position, city)) = cities.iter().enumerate().find(|(p, c)| c.index != *p) {
            return Err(SimError::ConfigurationError(format!(
                "metro {} city indices must be 0..{}, found {} at position {}",
                name,
                cities.len(),
                city.index,
                position
            )));
        }

        if let Some(node) = network.nodes().find(|&n| n >= cities.len()) {
            return Err(SimError::ConfigurationError(format!(
                "metro {} network has node {} with no city",
                name, node
            )));
        }

        let hub = hub_policy.select(&cities).ok_or_else(|| {
            SimError::ConfigurationError(format!(
                "hub policy {:?} matches no city in metro {}",
                hub_policy, name
            ))
        })?;

        tracing::debug!("Metropolitan area around {} was created!", name);

        Ok(Self {
            name,
            index,
            cities,
            hub,
            network,
            connections: Connections::new(),
            pending: None,
            hub_travel_log: Vec::new(),
        })
    }

    pub fn hub_index(&self) -> CityIndex {
        self.hub
    }

    pub fn hub(&self) -> &City {
        &self.cities[self.hub]
    }

    pub fn hub_mut(&mut self) -> &mut City {
        &mut self.cities[self.hub]
    }

    pub fn city(&self, index: CityIndex) -> Option<&City> {
        self.cities.get(index)
    }

    pub fn city_mut(&mut self, index: CityIndex) -> Option<&mut City> {
        self.cities.get_mut(index)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn cities_mut(&mut self) -> &mut [City] {
        &mut self.cities
    }

    pub fn network(&self) -> &WeightedGraph {
        &self.network
    }

    /// The city graph alongside mutable cities, for the movement phase
    pub fn network_and_cities_mut(&mut self) -> (&WeightedGraph, &mut [City]) {
        (&self.network, &mut self.cities)
    }

    /// Sum over all member cities (not the hub mirror)
    pub fn total_population(&self) -> f64 {
        self.cities.iter().map(|c| c.compute_population()).sum()
    }

    /// Metro-wide curve: member city histories summed day by day
    pub fn aggregate_history(&self) -> Vec<CompartmentState> {
        let days = self.hub().history().len();
        (0..days)
            .map(|day| {
                self.cities
                    .iter()
                    .filter_map(|c| c.history().get(day))
                    .fold(CompartmentState::default(), |acc, s| acc.combined(s))
            })
            .collect()
    }

    pub fn hub_travel_log(&self) -> &[PendingTravelers] {
        &self.hub_travel_log
    }

    pub fn log_hub_travelers(&mut self, travelers: PendingTravelers) {
        self.hub_travel_log.push(travelers);
    }
}

impl PopulationEntity for MetroArea {
    fn name(&self) -> &str {
        &self.name
    }

    fn index(&self) -> usize {
        self.index
    }

    fn connections(&self) -> &Connections {
        &self.connections
    }

    fn set_connections(&mut self, connections: Connections) {
        self.connections = connections;
    }

    fn compartment_state(&self) -> &CompartmentState {
        self.hub().compartment_state()
    }

    fn compartment_state_mut(&mut self) -> &mut CompartmentState {
        self.hub_mut().compartment_state_mut()
    }

    fn current_population(&self) -> f64 {
        self.hub().current_population()
    }

    fn refresh_population(&mut self) {
        self.hub_mut().refresh_population();
    }

    fn pending_travelers(&self) -> Option<&PendingTravelers> {
        self.pending.as_ref()
    }

    fn set_pending_travelers(&mut self, travelers: PendingTravelers) {
        self.pending = Some(travelers);
    }

    fn clear_pending_travelers(&mut self) -> Option<PendingTravelers> {
        self.pending.take()
    }
}

/// Metro registry keyed by metro index
impl EntityRegistry for BTreeMap<MetroIndex, MetroArea> {
    type Entity = MetroArea;

    fn entity(&self, index: usize) -> Option<&MetroArea> {
        self.get(&index)
    }

    fn entity_mut(&mut self, index: usize) -> Option<&mut MetroArea> {
        self.get_mut(&index)
    }
}
