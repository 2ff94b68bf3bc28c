//! Manufacturing feasibility from a biochemical profile.
//!
//! F = (0.45·stability + 0.30·pI + 0.25·aromaticity) × 0.95^risks
//!
//! Each term is 1.0 inside its comfortable window and falls linearly to 0
//! outside it.

use resistaid_common::confidence::clamp_unit;
use resistaid_common::{BiochemicalProfile, FeasibilityCategory};

const STABILITY_WEIGHT: f64 = 0.45;
const PI_WEIGHT: f64 = 0.30;
const AROMATICITY_WEIGHT: f64 = 0.25;

/// Multiplier applied once per manufacturing risk flag.
pub const RISK_DISCOUNT: f64 = 0.95;

/// 1.0 up to an instability index of 30, 0 from 70.
pub fn stability_term(instability_index: f64) -> f64 {
    1.0 - clamp_unit((instability_index - 30.0) / 40.0)
}

/// 1.0 inside pI [5, 9], 0 two units outside.
pub fn pi_term(isoelectric_point: f64) -> f64 {
    let distance = (5.0 - isoelectric_point).max(isoelectric_point - 9.0).max(0.0);
    1.0 - clamp_unit(distance / 2.0)
}

/// 1.0 up to 10% aromatic residues, 0 from 20%.
pub fn aromaticity_term(aromaticity: f64) -> f64 {
    1.0 - clamp_unit((aromaticity - 0.10) / 0.10)
}

pub fn feasibility_score(profile: &BiochemicalProfile) -> f64 {
    let p = &profile.properties;
    let base = STABILITY_WEIGHT * stability_term(p.instability_index)
        + PI_WEIGHT * pi_term(p.isoelectric_point)
        + AROMATICITY_WEIGHT * aromaticity_term(p.aromaticity);
    let discount = RISK_DISCOUNT.powi(profile.manufacturing_risks.len() as i32);
    clamp_unit(base * discount)
}

pub fn categorize(score: f64) -> FeasibilityCategory {
    FeasibilityCategory::from_score(score)
}
