use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// A compartment went negative, or a rate needed a positive population.
    #[error("Invalid population state in {entity}: {reason}")]
    InvalidPopulationState { entity: String, reason: String },

    /// Outgoing travel probabilities sum past 1 (negative stay probability).
    #[error("Invalid travel probabilities for {entity}: outgoing sum {outgoing} exceeds 1")]
    InvalidProbabilityState { entity: String, outgoing: f64 },

    /// Recoverable: the edge is clamped to weight 1 and the build continues.
    #[error("Edge weight underflow in {network} between {from} and {to}, set to 1")]
    EdgeWeightUnderflow {
        network: String,
        from: usize,
        to: usize,
    },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("No pending travelers computed for {0}")]
    MissingTravelers(String),

    #[error("Entity not found for graph node {0}")]
    UnknownEntity(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl SimError {
    /// Whether the run may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SimError::EdgeWeightUnderflow { .. })
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
