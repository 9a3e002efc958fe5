//! City - the leaf epidemic unit

use crate::core::types::{CityIndex, CompartmentState, EpidemicParams};
use crate::population::entity::{Connections, EntityRegistry, PendingTravelers, PopulationEntity};

/// A city inside a metropolitan area; its own compartments are authoritative
#[derive(Debug, Clone)]
pub struct City {
    pub name: String,
    pub index: CityIndex,
    pub params: EpidemicParams,
    state: CompartmentState,
    current_population: f64,
    /// One entry per simulated day, starting with the initial state
    history: Vec<CompartmentState>,
    connections: Connections,
    pending: Option<PendingTravelers>,
}

impl City {
    pub fn new(name: String, index: CityIndex, state: CompartmentState, params: EpidemicParams) -> Self {
        tracing::debug!("City {} was created!", name);
        Self {
            name,
            index,
            params,
            state,
            current_population: state.total(),
            history: vec![state],
            connections: Connections::new(),
            pending: None,
        }
    }

    pub fn history(&self) -> &[CompartmentState] {
        &self.history
    }

    /// Append the current state as the newest history entry
    pub fn record_history(&mut self) {
        self.history.push(self.state);
    }

    /// Replace the newest history entry with the current state
    pub fn overwrite_last_history(&mut self) {
        match self.history.last_mut() {
            Some(last) => *last = self.state,
            None => self.history.push(self.state),
        }
    }
}

impl PopulationEntity for City {
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
        &self.state
    }

    fn compartment_state_mut(&mut self) -> &mut CompartmentState {
        &mut self.state
    }

    fn current_population(&self) -> f64 {
        self.current_population
    }

    fn refresh_population(&mut self) {
        self.current_population = self.compute_population();
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

/// Cities of one metro, looked up by position (position == city index)
impl EntityRegistry for [City] {
    type Entity = City;

    fn entity(&self, index: usize) -> Option<&City> {
        self.get(index)
    }

    fn entity_mut(&mut self, index: usize) -> Option<&mut City> {
        self.get_mut(index)
    }
}
