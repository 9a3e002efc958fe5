//! The capability shared by Cities and MetroAreas

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{Compartment, CompartmentState};

/// Neighbor index -> expected travelers per unit time
pub type Connections = BTreeMap<usize, f64>;

/// Departures computed for one entity, keyed by destination index
///
/// Written by `compute_travelers`, consumed by the matching
/// `apply_travelers`, then cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingTravelers {
    pub susceptible: BTreeMap<usize, u64>,
    pub infected: BTreeMap<usize, u64>,
    pub recovered: BTreeMap<usize, u64>,
}

impl PendingTravelers {
    pub fn for_label(&self, compartment: Compartment) -> &BTreeMap<usize, u64> {
        match compartment {
            Compartment::Susceptible => &self.susceptible,
            Compartment::Infected => &self.infected,
            Compartment::Recovered => &self.recovered,
        }
    }

    pub fn for_label_mut(&mut self, compartment: Compartment) -> &mut BTreeMap<usize, u64> {
        match compartment {
            Compartment::Susceptible => &mut self.susceptible,
            Compartment::Infected => &mut self.infected,
            Compartment::Recovered => &mut self.recovered,
        }
    }

    /// Per-compartment volume headed to `destination`, if it was computed
    pub fn transfer_to(&self, destination: usize) -> Option<CompartmentState> {
        let s = self.susceptible.get(&destination)?;
        let i = self.infected.get(&destination)?;
        let r = self.recovered.get(&destination)?;
        Some(CompartmentState::new(*s as f64, *i as f64, *r as f64))
    }

    /// Departures of one compartment summed over all destinations
    pub fn departures(&self, compartment: Compartment) -> u64 {
        self.for_label(compartment).values().sum()
    }

    pub fn total(&self) -> u64 {
        Compartment::ALL.iter().map(|&c| self.departures(c)).sum()
    }
}

/// An epidemic unit: compartments, weighted connections, transient travelers
///
/// `current_population` is a cached value refreshed only through
/// `refresh_population`, so travel probabilities within a phase are all
/// computed against the same snapshot.
pub trait PopulationEntity {
    fn name(&self) -> &str;

    fn index(&self) -> usize;

    fn connections(&self) -> &Connections;

    /// Replaces the connections map
    fn set_connections(&mut self, connections: Connections);

    fn compartment_state(&self) -> &CompartmentState;

    fn compartment_state_mut(&mut self) -> &mut CompartmentState;

    /// Cached population as of the last refresh
    fn current_population(&self) -> f64;

    fn refresh_population(&mut self);

    fn pending_travelers(&self) -> Option<&PendingTravelers>;

    fn set_pending_travelers(&mut self, travelers: PendingTravelers);

    fn clear_pending_travelers(&mut self) -> Option<PendingTravelers>;

    /// Sum of compartments right now. Pure.
    fn compute_population(&self) -> f64 {
        self.compartment_state().total()
    }

    /// One "weight -> neighbor" line per connection
    fn describe_connections(&self) -> String {
        let mut out = format!("The travelers from {} are:", self.name());
        for (neighbor, weight) in self.connections() {
            out.push_str(&format!("\n{} -> {}", weight, neighbor));
        }
        out
    }
}

/// Index-keyed lookup of the entities a graph's nodes refer to
pub trait EntityRegistry {
    type Entity: PopulationEntity;

    fn entity(&self, index: usize) -> Option<&Self::Entity>;

    fn entity_mut(&mut self, index: usize) -> Option<&mut Self::Entity>;
}
