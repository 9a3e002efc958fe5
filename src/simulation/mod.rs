//! Running the model: time stepping, randomness, scenarios and output

pub mod engine;
pub mod epidemic;
pub mod output;
pub mod rng;
pub mod scenario;

pub use engine::{from_networks_to_populations, Simulation};
pub use output::{SimulationOutput, SimulationStats};
pub use scenario::{BuiltNetworks, Scenario};
