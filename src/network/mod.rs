//! Transport networks
//!
//! City graphs inside each metropolitan area (undirected, gravity-weighted)
//! and the airport graph between metro hubs (directed, route-weighted).

pub mod builder;
pub mod graph;
pub mod topology;

pub use builder::{
    gravity_weight, BuildReport, CityNode, ClampedEdge, MetroDescriptor, MetroNetwork,
    NetworkBuilder, Route, DEFAULT_AIRPORT_MULTIPLIER, MIN_EDGE_WEIGHT,
};
pub use graph::WeightedGraph;
pub use topology::{EdgeList, TopologyKind};
