//! Traveler operator
//!
//! Two strictly separated phases. `compute_travelers` samples each entity's
//! departures against its cached population; `apply_travelers` then moves
//! all of them along a graph's edges. Nothing is recomputed mid-application.

pub mod apply;
pub mod compute;
pub mod multinomial;

pub use apply::apply_travelers;
pub use compute::{compute_travelers, travel_probabilities, TravelProbabilities};
