//! Builds the weighted city graphs and the airport graph handed to the engine
//!
//! City edges follow a gravity model scaled by the largest city of the metro:
//! `round(pop(u) * pop(v) * 0.25 / max_pop)`, rounded half-to-even. Weights
//! that round to zero are clamped to 1 and reported, never dropped.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{EpidemicParams, MetroIndex};
use crate::network::graph::WeightedGraph;
use crate::network::topology::EdgeList;

/// Share of the population product that travels along a city edge
pub const GRAVITY_FACTOR: f64 = 0.25;

/// Scale applied to raw route weights of the airport graph
pub const DEFAULT_AIRPORT_MULTIPLIER: f64 = 180.0;

/// Minimum weight of any edge
pub const MIN_EDGE_WEIGHT: f64 = 1.0;

/// Input description of one metropolitan area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetroDescriptor {
    pub index: MetroIndex,
    pub name: String,
    /// Population of each city, by node index
    pub populations: Vec<f64>,
    /// Rates for this metro's cities; falls back to the run default
    #[serde(default)]
    pub epidemic: Option<EpidemicParams>,
}

/// Weighted inter-metro route before scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub origin: MetroIndex,
    pub destination: MetroIndex,
    pub raw_weight: f64,
}

/// Node attributes of a city graph
#[derive(Debug, Clone, PartialEq)]
pub struct CityNode {
    pub population: f64,
    pub name: String,
}

/// One metro's city graph plus its node attributes
#[derive(Debug, Clone)]
pub struct MetroNetwork {
    pub index: MetroIndex,
    pub name: String,
    pub epidemic: Option<EpidemicParams>,
    /// Indexed by node index
    pub cities: Vec<CityNode>,
    pub graph: WeightedGraph,
}

impl MetroNetwork {
    pub fn total_population(&self) -> f64 {
        self.cities.iter().map(|c| c.population).sum()
    }
}

/// An edge that was raised to the minimum weight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClampedEdge {
    pub network: String,
    pub from: usize,
    pub to: usize,
}

/// Recoverable issues collected while building
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub clamped_edges: Vec<ClampedEdge>,
    pub dropped_self_loops: Vec<MetroIndex>,
}

/// Gravity-model weight before clamping
pub fn gravity_weight(population_a: f64, population_b: f64, max_population: f64) -> f64 {
    if max_population <= 0.0 {
        return 0.0;
    }
    (population_a * population_b * GRAVITY_FACTOR / max_population).round_ties_even()
}

#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    airport_multiplier: f64,
    report: BuildReport,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self {
            airport_multiplier: DEFAULT_AIRPORT_MULTIPLIER,
            report: BuildReport::default(),
        }
    }

    pub fn with_airport_multiplier(mut self, multiplier: f64) -> Self {
        self.airport_multiplier = multiplier;
        self
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Build one city graph per descriptor from a shared topology generator
    pub fn build_metro_networks<G>(
        &mut self,
        descriptors: &[MetroDescriptor],
        generator: G,
    ) -> Result<Vec<MetroNetwork>>
    where
        G: Fn(usize) -> EdgeList,
    {
        descriptors
            .iter()
            .map(|descriptor| self.build_metro_network(descriptor, &generator))
            .collect()
    }

    fn build_metro_network<G>(&mut self, descriptor: &MetroDescriptor, generator: &G) -> Result<MetroNetwork>
    where
        G: Fn(usize) -> EdgeList,
    {
        let node_count = descriptor.populations.len();

        let cities: Vec<CityNode> = descriptor
            .populations
            .iter()
            .enumerate()
            .map(|(node, &population)| CityNode {
                population,
                name: format!("{}{}", descriptor.name, node),
            })
            .collect();

        let highest_population = cities
            .iter()
            .map(|c| c.population)
            .fold(0.0_f64, f64::max);

        let mut graph = WeightedGraph::undirected();
        for node in 0..node_count {
            graph.add_node(node);
        }

        for (a, b) in generator(node_count) {
            if a >= node_count || b >= node_count {
                return Err(SimError::ConfigurationError(format!(
                    "topology for metro {} references node {} of {}",
                    descriptor.name,
                    a.max(b),
                    node_count
                )));
            }
            let raw = gravity_weight(cities[a].population, cities[b].population, highest_population);
            let weight = self.clamp_weight(&descriptor.name, a, b, raw);
            graph.add_edge(a, b, weight);
        }

        tracing::debug!(
            "Built metro network {} with {} cities and {} edges",
            descriptor.name,
            node_count,
            graph.edge_count()
        );

        Ok(MetroNetwork {
            index: descriptor.index,
            name: descriptor.name.clone(),
            epidemic: descriptor.epidemic,
            cities,
            graph,
        })
    }

    /// Directed airport graph over metro indices from raw routes
    ///
    /// Raw weights are truncated to whole passengers before scaling. A route
    /// listed twice keeps its last weight.
    pub fn build_airport_network(&mut self, routes: &[Route]) -> WeightedGraph {
        let mut graph = WeightedGraph::directed();

        for route in routes {
            if route.origin == route.destination {
                tracing::warn!("Dropping self-loop route at metro {}", route.origin);
                self.report.dropped_self_loops.push(route.origin);
                continue;
            }
            let raw = route.raw_weight.trunc() * self.airport_multiplier;
            let weight = self.clamp_weight("airport network", route.origin, route.destination, raw);
            graph.add_edge(route.origin, route.destination, weight);
        }

        graph
    }

    fn clamp_weight(&mut self, network: &str, from: usize, to: usize, weight: f64) -> f64 {
        if weight >= MIN_EDGE_WEIGHT {
            return weight;
        }

        let underflow = SimError::EdgeWeightUnderflow {
            network: network.to_string(),
            from,
            to,
        };
        tracing::warn!("{}", underflow);
        self.report.clamped_edges.push(ClampedEdge {
            network: network.to_string(),
            from,
            to,
        });
        MIN_EDGE_WEIGHT
    }
}
