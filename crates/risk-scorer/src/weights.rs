//! Risk pillar weights and normalization

use serde::{Deserialize, Serialize};

/// Default weights (sum = 1.0)
pub const W_INFRASTRUCTURE: f64 = 0.35;
pub const W_PREPAREDNESS: f64 = 0.25;
pub const W_ECONOMIC: f64 = 0.20;
pub const W_POPULATION: f64 = 0.20;

/// Weight each pillar falls back to when all raw weights are zero
const EQUAL_WEIGHT: f64 = 0.25;

/// Raw, user-adjustable weights controlling the influence of each risk pillar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    /// Weight for infrastructure condition gap
    pub infrastructure: f64,
    /// Weight for disaster preparedness gap
    pub preparedness: f64,
    /// Weight for economic vulnerability
    pub economic: f64,
    /// Weight for population pressure
    pub population: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            infrastructure: W_INFRASTRUCTURE,
            preparedness: W_PREPAREDNESS,
            economic: W_ECONOMIC,
            population: W_POPULATION,
        }
    }
}

impl RiskWeights {
    pub fn new(infrastructure: f64, preparedness: f64, economic: f64, population: f64) -> Self {
        Self {
            infrastructure,
            preparedness,
            economic,
            population,
        }
    }

    pub fn sum(&self) -> f64 {
        self.infrastructure + self.preparedness + self.economic + self.population
    }

    /// Rescale to sum to 1.0, or fall back to equal weights if the sum is zero
    pub fn normalized(&self) -> NormalizedWeights {
        let total = self.sum();
        let largest = self.largest_magnitude();
        if total.is_infinite() && largest.is_finite() {
            // Finite weights whose sum overflows: bring them down to at most 1 first
            return RiskWeights::new(
                self.infrastructure / largest,
                self.preparedness / largest,
                self.economic / largest,
                self.population / largest,
            )
            .normalized();
        }
        if total == 0.0 {
            return NormalizedWeights {
                infrastructure: EQUAL_WEIGHT,
                preparedness: EQUAL_WEIGHT,
                economic: EQUAL_WEIGHT,
                population: EQUAL_WEIGHT,
            };
        }
        NormalizedWeights {
            infrastructure: self.infrastructure / total,
            preparedness: self.preparedness / total,
            economic: self.economic / total,
            population: self.population / total,
        }
    }

    fn largest_magnitude(&self) -> f64 {
        self.components()
            .iter()
            .fold(0.0_f64, |acc, (_, v)| acc.max(v.abs()))
    }

    /// Named components, in column order
    pub fn components(&self) -> [(&'static str, f64); 4] {
        [
            ("infrastructure", self.infrastructure),
            ("preparedness", self.preparedness),
            ("economic", self.economic),
            ("population", self.population),
        ]
    }
}

/// Weights rescaled to sum to 1.0. Only obtainable through [`RiskWeights::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedWeights {
    infrastructure: f64,
    preparedness: f64,
    economic: f64,
    population: f64,
}

impl NormalizedWeights {
    pub fn infrastructure(&self) -> f64 {
        self.infrastructure
    }

    pub fn preparedness(&self) -> f64 {
        self.preparedness
    }

    pub fn economic(&self) -> f64 {
        self.economic
    }

    pub fn population(&self) -> f64 {
        self.population
    }

    pub fn sum(&self) -> f64 {
        self.infrastructure + self.preparedness + self.economic + self.population
    }
}
