//! Metro Epidemic - SIR spread over cities, metropolitan areas and airports

pub mod core;
pub mod network;
pub mod population;
pub mod simulation;
pub mod transport;
