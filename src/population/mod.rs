//! Epidemic units
//!
//! Cities are the leaves that carry compartments. A MetroArea groups a
//! fixed set of Cities and exposes its hub city's compartments as its own,
//! so the same traveler operator moves people at both scales.

pub mod city;
pub mod entity;
pub mod metro;

pub use city::City;
pub use entity::{Connections, EntityRegistry, PendingTravelers, PopulationEntity};
pub use metro::{HubPolicy, MetroArea};
