//! Apply phase: move precomputed travelers along every directed edge
//!
//! Edge order is shuffled with the run's random source. Every transfer
//! comes from the origin's pending travelers computed before any edge was
//! applied, so the result does not depend on which edge goes first.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::error::{Result, SimError};
use crate::core::types::Compartment;
use crate::network::graph::WeightedGraph;
use crate::population::entity::{EntityRegistry, PopulationEntity};

/// Apply all pending transfers across `graph`, then clear them
///
/// Undirected graphs are symmetrized so each edge is applied both ways.
/// Returns the number of individuals moved.
pub fn apply_travelers<G, R>(graph: &WeightedGraph, registry: &mut G, rng: &mut R) -> Result<u64>
where
    G: EntityRegistry + ?Sized,
    R: Rng + ?Sized,
{
    let mut edges = graph.directed_edges();
    edges.shuffle(rng);

    let mut moved = 0.0;
    for (origin, destination) in edges {
        let transfer = {
            let entity = registry.entity(origin).ok_or(SimError::UnknownEntity(origin))?;
            let pending = entity
                .pending_travelers()
                .ok_or_else(|| SimError::MissingTravelers(entity.name().to_string()))?;
            pending.transfer_to(destination).ok_or_else(|| {
                SimError::MissingTravelers(format!("{} -> {}", entity.name(), destination))
            })?
        };
        if registry.entity(destination).is_none() {
            return Err(SimError::UnknownEntity(destination));
        }

        if let Some(from) = registry.entity_mut(origin) {
            let state = from.compartment_state_mut();
            for compartment in Compartment::ALL {
                *state.get_mut(compartment) -= transfer.get(compartment);
            }
        }
        if let Some(to) = registry.entity_mut(destination) {
            let state = to.compartment_state_mut();
            for compartment in Compartment::ALL {
                *state.get_mut(compartment) += transfer.get(compartment);
            }
        }
        moved += transfer.total();
    }

    for node in graph.nodes() {
        if let Some(entity) = registry.entity_mut(node) {
            entity.clear_pending_travelers();
            entity.compartment_state().validate(entity.name())?;
        }
    }

    Ok(moved as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CompartmentState, EpidemicParams};
    use crate::population::{City, Connections, PendingTravelers};
    use crate::transport::compute::compute_travelers;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_cities() -> (WeightedGraph, Vec<City>) {
        let mut graph = WeightedGraph::undirected();
        graph.add_edge(0, 1, 10.0);
        let mut cities = vec![
            City::new("A0".into(), 0, CompartmentState::susceptible(100.0), EpidemicParams::default()),
            City::new("A1".into(), 1, CompartmentState::susceptible(50.0), EpidemicParams::default()),
        ];
        cities[0].set_connections(Connections::from([(1, 10.0)]));
        cities[1].set_connections(Connections::from([(0, 10.0)]));
        (graph, cities)
    }

    #[test]
    fn test_two_city_exchange_conserves_total() {
        let (graph, mut cities) = two_cities();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for city in cities.iter_mut() {
            compute_travelers(city, 0.1, &mut rng).unwrap();
        }
        apply_travelers(&graph, cities.as_mut_slice(), &mut rng).unwrap();
        let total: f64 = cities.iter().map(|c| c.compute_population()).sum();
        assert_eq!(total, 150.0);
        assert!(cities.iter().all(|c| c.pending_travelers().is_none()));
    }

    #[test]
    fn test_exact_transfer_applied() {
        let (graph, mut cities) = two_cities();
        let mut out = PendingTravelers::default();
        out.susceptible.insert(1, 7);
        out.infected.insert(1, 0);
        out.recovered.insert(1, 0);
        cities[0].set_pending_travelers(out);
        let mut back = PendingTravelers::default();
        back.susceptible.insert(0, 2);
        back.infected.insert(0, 0);
        back.recovered.insert(0, 0);
        cities[1].set_pending_travelers(back);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let moved = apply_travelers(&graph, cities.as_mut_slice(), &mut rng).unwrap();
        assert_eq!(moved, 9);
        assert_eq!(cities[0].compartment_state().s, 95.0);
        assert_eq!(cities[1].compartment_state().s, 55.0);
        // population cache untouched until the engine refreshes it
        assert_eq!(cities[0].current_population(), 100.0);
    }

    #[test]
    fn test_missing_compute_is_an_error() {
        let (graph, mut cities) = two_cities();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = apply_travelers(&graph, cities.as_mut_slice(), &mut rng).unwrap_err();
        assert!(matches!(err, SimError::MissingTravelers(_)));
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let (mut graph, mut cities) = two_cities();
        graph.add_edge(1, 4, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for city in cities.iter_mut() {
            city.set_pending_travelers(PendingTravelers::default());
        }
        let err = apply_travelers(&graph, cities.as_mut_slice(), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SimError::UnknownEntity(4) | SimError::MissingTravelers(_)
        ));
    }
}
