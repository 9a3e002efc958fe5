//! Compute phase: per-compartment departures for one entity

use rand::Rng;

use crate::core::error::{Result, SimError};
use crate::core::types::Compartment;
use crate::population::entity::{PendingTravelers, PopulationEntity};
use crate::transport::multinomial;

/// Slack allowed on the outgoing probability sum before it counts as > 1
pub const PROBABILITY_TOLERANCE: f64 = 1e-12;

/// Per-neighbor departure probabilities plus the implicit stay outcome
#[derive(Debug, Clone, PartialEq)]
pub struct TravelProbabilities {
    /// (neighbor index, probability), in connection order
    pub neighbors: Vec<(usize, f64)>,
    pub stay: f64,
}

impl TravelProbabilities {
    pub fn outgoing(&self) -> f64 {
        self.neighbors.iter().map(|(_, p)| p).sum()
    }
}

/// `p[neighbor] = weight * dt / current_population`, `p[stay] = 1 - sum`
pub fn travel_probabilities<E>(entity: &E, dt: f64) -> Result<TravelProbabilities>
where
    E: PopulationEntity + ?Sized,
{
    if entity.connections().is_empty() {
        return Ok(TravelProbabilities {
            neighbors: Vec::new(),
            stay: 1.0,
        });
    }

    let population = entity.current_population();
    if population.is_nan() || population <= 0.0 {
        return Err(SimError::InvalidPopulationState {
            entity: entity.name().to_string(),
            reason: format!("travel needs a positive population, cached value is {}", population),
        });
    }

    let neighbors: Vec<(usize, f64)> = entity
        .connections()
        .iter()
        .map(|(&neighbor, &weight)| (neighbor, weight * dt / population))
        .collect();
    let outgoing: f64 = neighbors.iter().map(|(_, p)| p).sum();

    if outgoing > 1.0 + PROBABILITY_TOLERANCE {
        return Err(SimError::InvalidProbabilityState {
            entity: entity.name().to_string(),
            outgoing,
        });
    }

    tracing::debug!("Travel probabilities for {}: {:?}", entity.name(), neighbors);

    Ok(TravelProbabilities {
        neighbors,
        stay: (1.0 - outgoing).max(0.0),
    })
}

/// Sample departures for every compartment and store them on the entity
///
/// Each compartment draws `floor(count)` trials independently over the same
/// probability vector. Returns the total number of departures.
pub fn compute_travelers<E, R>(entity: &mut E, dt: f64, rng: &mut R) -> Result<u64>
where
    E: PopulationEntity + ?Sized,
    R: Rng + ?Sized,
{
    entity.compartment_state().validate(entity.name())?;
    let probabilities = travel_probabilities(&*entity, dt)?;
    let weights: Vec<f64> = probabilities.neighbors.iter().map(|(_, p)| *p).collect();

    let mut travelers = PendingTravelers::default();
    for compartment in Compartment::ALL {
        let trials = entity.compartment_state().get(compartment).floor() as u64;
        let counts = multinomial::sample(trials, &weights, rng);
        let by_destination = travelers.for_label_mut(compartment);
        for ((neighbor, _), count) in probabilities.neighbors.iter().zip(counts) {
            by_destination.insert(*neighbor, count);
        }
    }

    let total = travelers.total();
    tracing::debug!("The travelers from {} are {:?}", entity.name(), travelers);
    entity.set_pending_travelers(travelers);
    Ok(total)
}
