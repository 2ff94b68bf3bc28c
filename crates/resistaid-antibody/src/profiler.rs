//! Biochemical profiler.
//!
//! Pure and stateless: a sequence maps to exactly one [`BiochemicalProfile`]
//! or to a [`ProfileError`] naming the first offending residue.

use resistaid_common::{BiochemicalProfile, BiochemicalProperties};

use crate::error::ProfileError;
use crate::residues::{
    average_mass, c_terminal_pka, diwv, is_standard, kyte_doolittle, n_terminal_pka, AROMATIC,
    NEGATIVE_PKA, POSITIVE_PKA, WATER_MASS,
};
use crate::risks::assess_risks;

const PI_TOLERANCE: f64 = 1e-4;

/// Trim, upper-case and check every residue against the standard alphabet.
pub fn normalise_sequence(sequence: &str) -> Result<Vec<u8>, ProfileError> {
    let trimmed = sequence.trim();
    if trimmed.is_empty() {
        return Err(ProfileError::Empty);
    }
    trimmed
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let up = c.to_ascii_uppercase();
            if up.is_ascii() && is_standard(up as u8) {
                Ok(up as u8)
            } else {
                Err(ProfileError::InvalidResidue { residue: c, position: i + 1 })
            }
        })
        .collect()
}

/// Compute the full profile, risk flags included.
pub fn profile(sequence: &str) -> Result<BiochemicalProfile, ProfileError> {
    let seq = normalise_sequence(sequence)?;
    let properties = BiochemicalProperties {
        isoelectric_point: isoelectric_point(&seq),
        gravy: gravy(&seq),
        instability_index: instability_index(&seq),
        aromaticity: aromaticity(&seq),
        molecular_weight: molecular_weight(&seq),
        net_charge_ph7: net_charge(&seq, 7.0),
    };
    let manufacturing_risks = assess_risks(&seq, &properties);
    Ok(BiochemicalProfile { properties, manufacturing_risks })
}

/// Net charge at `ph` from Henderson-Hasselbalch partial charges.
pub fn net_charge(seq: &[u8], ph: f64) -> f64 {
    let (Some(&first), Some(&last)) = (seq.first(), seq.last()) else {
        return 0.0;
    };
    let positive = |pka: f64| {
        let r = 10f64.powf(pka - ph);
        r / (r + 1.0)
    };
    let negative = |pka: f64| {
        let r = 10f64.powf(ph - pka);
        r / (r + 1.0)
    };

    let mut charge = positive(n_terminal_pka(first)) - negative(c_terminal_pka(last));
    for &(residue, pka) in POSITIVE_PKA {
        charge += count(seq, residue) as f64 * positive(pka);
    }
    for &(residue, pka) in NEGATIVE_PKA {
        charge -= count(seq, residue) as f64 * negative(pka);
    }
    charge
}

/// pH at which the net charge crosses zero, by bisection over [0, 14].
pub fn isoelectric_point(seq: &[u8]) -> f64 {
    let (mut lo, mut hi) = (0.0f64, 14.0f64);
    while hi - lo > PI_TOLERANCE {
        let mid = (lo + hi) / 2.0;
        if net_charge(seq, mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}

/// Grand average of hydropathy.
pub fn gravy(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    seq.iter().map(|&r| kyte_doolittle(r)).sum::<f64>() / seq.len() as f64
}

/// Guruprasad instability index: (10 / L) · Σ DIWV(x_i, x_{i+1}).
pub fn instability_index(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let sum: f64 = seq.windows(2).map(|w| diwv(w[0], w[1])).sum();
    10.0 / seq.len() as f64 * sum
}

/// Fraction of F, W and Y.
pub fn aromaticity(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    seq.iter().filter(|r| AROMATIC.contains(r)).count() as f64 / seq.len() as f64
}

/// Average mass in Daltons, one water lost per peptide bond.
pub fn molecular_weight(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let residues: f64 = seq.iter().map(|&r| average_mass(r)).sum();
    residues - (seq.len() - 1) as f64 * WATER_MASS
}

fn count(seq: &[u8], residue: u8) -> usize {
    seq.iter().filter(|&&r| r == residue).count()
}
