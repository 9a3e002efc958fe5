//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Simulated day counter (one Euler step per day)
pub type Day = usize;

/// Stable index of a City inside its MetroArea (the node index of the city graph)
pub type CityIndex = usize;

/// Stable index of a MetroArea (the node index of the inter-metro graph)
pub type MetroIndex = usize;

/// SIR compartment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Compartment {
    Susceptible,
    Infected,
    Recovered,
}

impl Compartment {
    pub const ALL: [Compartment; 3] = [
        Compartment::Susceptible,
        Compartment::Infected,
        Compartment::Recovered,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Compartment::Susceptible => "S",
            Compartment::Infected => "I",
            Compartment::Recovered => "R",
        }
    }
}

/// Ordered (S, I, R) triple of real-valued counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompartmentState {
    pub s: f64,
    pub i: f64,
    pub r: f64,
}

impl CompartmentState {
    pub fn new(s: f64, i: f64, r: f64) -> Self {
        Self { s, i, r }
    }

    /// A fully susceptible population
    pub fn susceptible(population: f64) -> Self {
        Self::new(population, 0.0, 0.0)
    }

    pub fn get(&self, compartment: Compartment) -> f64 {
        match compartment {
            Compartment::Susceptible => self.s,
            Compartment::Infected => self.i,
            Compartment::Recovered => self.r,
        }
    }

    pub fn get_mut(&mut self, compartment: Compartment) -> &mut f64 {
        match compartment {
            Compartment::Susceptible => &mut self.s,
            Compartment::Infected => &mut self.i,
            Compartment::Recovered => &mut self.r,
        }
    }

    pub fn total(&self) -> f64 {
        self.s + self.i + self.r
    }

    /// Component-wise sum, used for metro-level aggregation
    pub fn combined(&self, other: &Self) -> Self {
        Self::new(self.s + other.s, self.i + other.i, self.r + other.r)
    }

    /// Fails with `InvalidPopulationState` if any compartment is negative or NaN
    pub fn validate(&self, entity: &str) -> Result<()> {
        for compartment in Compartment::ALL {
            let value = self.get(compartment);
            if value.is_nan() || value < 0.0 {
                return Err(SimError::InvalidPopulationState {
                    entity: entity.to_string(),
                    reason: format!("{} = {}", compartment.label(), value),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for CompartmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S={:.2} I={:.2} R={:.2}", self.s, self.i, self.r)
    }
}

/// Per-City epidemic rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpidemicParams {
    /// beta: new infections per unit time are beta * S * I / N
    pub infection_rate: f64,
    /// gamma: recoveries per unit time are gamma * I
    pub recovery_rate: f64,
}

impl Default for EpidemicParams {
    fn default() -> Self {
        Self {
            infection_rate: 0.3,
            recovery_rate: 0.035,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compartment_accessors() {
        let mut state = CompartmentState::new(90.0, 7.0, 3.0);
        assert_eq!(state.get(Compartment::Infected), 7.0);
        *state.get_mut(Compartment::Recovered) += 2.0;
        assert_eq!(state.r, 5.0);
        assert_eq!(state.total(), 102.0);
    }

    #[test]
    fn test_validate_rejects_negative() {
        let state = CompartmentState::new(-0.5, 1.0, 0.0);
        let err = state.validate("Oslo1").unwrap_err();
        assert!(matches!(err, SimError::InvalidPopulationState { .. }));
        assert!(CompartmentState::susceptible(10.0).validate("Oslo1").is_ok());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let state = CompartmentState::new(f64::NAN, 0.0, 0.0);
        assert!(state.validate("Oslo1").is_err());
    }

    #[test]
    fn test_labels_in_order() {
        let labels: Vec<_> = Compartment::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["S", "I", "R"]);
    }
}
