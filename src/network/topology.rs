//! Topology generators: node count -> undirected edge list over `0..n`
//!
//! Every metro is built from the same generator, so a generator is a pure
//! function of the node count (the random one carries its own seed).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Undirected edge list over nodes `0..n`
pub type EdgeList = Vec<(usize, usize)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologyKind {
    /// Full r-ary tree: node i is the parent of r*i+1 ..= r*i+r
    RaryTree { arity: usize },
    /// Every pair of cities connected
    Complete,
    /// Chain 0 - 1 - ... - (n-1)
    Path,
    /// Each pair connected independently with the given probability
    ErdosRenyi { probability: f64, seed: u64 },
}

impl Default for TopologyKind {
    fn default() -> Self {
        TopologyKind::RaryTree { arity: 2 }
    }
}

impl TopologyKind {
    pub fn generate(&self, node_count: usize) -> EdgeList {
        match *self {
            TopologyKind::RaryTree { arity } => rary_tree(arity, node_count),
            TopologyKind::Complete => complete(node_count),
            TopologyKind::Path => (1..node_count).map(|n| (n - 1, n)).collect(),
            TopologyKind::ErdosRenyi { probability, seed } => {
                erdos_renyi(node_count, probability, seed)
            }
        }
    }
}

fn rary_tree(arity: usize, node_count: usize) -> EdgeList {
    if arity == 0 {
        return Vec::new();
    }
    (0..node_count)
        .flat_map(|parent| {
            (1..=arity)
                .map(move |k| arity * parent + k)
                .filter(move |&child| child < node_count)
                .map(move |child| (parent, child))
        })
        .collect()
}

fn complete(node_count: usize) -> EdgeList {
    (0..node_count)
        .flat_map(|a| ((a + 1)..node_count).map(move |b| (a, b)))
        .collect()
}

fn erdos_renyi(node_count: usize, probability: f64, seed: u64) -> EdgeList {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    complete(node_count)
        .into_iter()
        .filter(|_| rng.gen::<f64>() < probability)
        .collect()
}
