//! Explicit Euler step of the SIR equations

use crate::core::error::{Result, SimError};
use crate::population::{City, PopulationEntity};

/// Advance one City by `dt`, in place
///
/// `N` is the cached population. No clamping: a step that drives any
/// compartment negative fails with `InvalidPopulationState` and the state is
/// left as computed for diagnostics.
pub fn euler_step(city: &mut City, dt: f64) -> Result<()> {
    let population = city.current_population();
    if population.is_nan() || population <= 0.0 {
        return Err(SimError::InvalidPopulationState {
            entity: city.name.clone(),
            reason: format!("infection rate needs a positive population, cached value is {}", population),
        });
    }

    let beta = city.params.infection_rate;
    let gamma = city.params.recovery_rate;
    let state = city.compartment_state_mut();

    let new_infections = beta * state.s * state.i / population;
    let new_recoveries = gamma * state.i;

    state.s -= new_infections * dt;
    state.i += (new_infections - new_recoveries) * dt;
    state.r += new_recoveries * dt;

    city.compartment_state().validate(&city.name)
}
