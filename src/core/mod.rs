pub mod config;
pub mod error;
pub mod types;

pub use config::{SeedLocation, SimulationConfig};
pub use error::{Result, SimError};
pub use types::{CityIndex, Compartment, CompartmentState, Day, EpidemicParams, MetroIndex};
