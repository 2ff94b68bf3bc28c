//! Weights for the combined candidate score.

use serde::{Deserialize, Serialize};

/// `combined = feasibility · w1 + scientific_support · w2`.
/// Weights sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Manufacturing feasibility from the biochemical profile
    #[serde(default = "default_half")]
    pub feasibility: f64,
    /// Noisy-OR support from linked evidence
    #[serde(default = "default_half")]
    pub scientific_support: f64,
}

fn default_half() -> f64 { 0.5 }

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            feasibility:        0.5,
            scientific_support: 0.5,
        }
    }
}

impl ScoreWeights {
    pub fn new(feasibility: f64, scientific_support: f64) -> Self {
        Self { feasibility, scientific_support }
    }

    /// Validate that both weights are non-negative and sum to ~1.0
    pub fn validate(&self) -> bool {
        self.feasibility >= 0.0
            && self.scientific_support >= 0.0
            && (self.feasibility + self.scientific_support - 1.0).abs() < 1e-6
    }

    /// Renormalise weights so they sum to 1.0. Negative weights are zeroed;
    /// a zero sum falls back to the defaults.
    pub fn normalise(&mut self) {
        self.feasibility = self.feasibility.max(0.0);
        self.scientific_support = self.scientific_support.max(0.0);
        let sum = self.feasibility + self.scientific_support;
        if sum > 0.0 && sum.is_finite() {
            self.feasibility        /= sum;
            self.scientific_support /= sum;
        } else {
            *self = Self::default();
        }
    }

    pub fn combine(&self, feasibility: f64, scientific_support: f64) -> f64 {
        self.feasibility * feasibility + self.scientific_support * scientific_support
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ScoreWeights::default();
        assert!(w.validate(), "Default weights must sum to 1.0");
    }

    #[test]
    fn test_normalise_restores_sum() {
        let mut w = ScoreWeights::new(3.0, 1.0);
        assert!(!w.validate());
        w.normalise();
        assert!(w.validate());
        assert!((w.feasibility - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_weights_fall_back() {
        let mut w = ScoreWeights::new(0.0, -1.0);
        w.normalise();
        assert_eq!(w, ScoreWeights::default());
    }

    #[test]
    fn test_combine() {
        let w = ScoreWeights::new(0.7, 0.3);
        assert!((w.combine(1.0, 0.0) - 0.7).abs() < 1e-12);
    }
}
