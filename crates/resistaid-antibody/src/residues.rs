//! Per-residue constant tables.
//!
//! Hydropathy: Kyte & Doolittle (1982). pKa: EMBOSS/Biopython set with
//! terminal-residue overrides. Dipeptide instability weights: Guruprasad,
//! Reddy & Pandit (1990). Masses: average free amino-acid weights.

/// The twenty standard residues.
pub const STANDARD_RESIDUES: &[u8; 20] = b"ACDEFGHIKLMNPQRSTVWY";

pub const AROMATIC: &[u8] = b"FWY";

pub const WATER_MASS: f64 = 18.0153;

pub fn is_standard(residue: u8) -> bool {
    STANDARD_RESIDUES.contains(&residue)
}

pub fn kyte_doolittle(residue: u8) -> f64 {
    match residue {
        b'A' => 1.8,
        b'R' => -4.5,
        b'N' => -3.5,
        b'D' => -3.5,
        b'C' => 2.5,
        b'Q' => -3.5,
        b'E' => -3.5,
        b'G' => -0.4,
        b'H' => -3.2,
        b'I' => 4.5,
        b'L' => 3.8,
        b'K' => -3.9,
        b'M' => 1.9,
        b'F' => 2.8,
        b'P' => -1.6,
        b'S' => -0.8,
        b'T' => -0.7,
        b'W' => -0.9,
        b'Y' => -1.3,
        b'V' => 4.2,
        _ => 0.0,
    }
}

pub fn average_mass(residue: u8) -> f64 {
    match residue {
        b'A' => 89.0932,
        b'C' => 121.1582,
        b'D' => 133.1027,
        b'E' => 147.1293,
        b'F' => 165.1891,
        b'G' => 75.0666,
        b'H' => 155.1546,
        b'I' => 131.1729,
        b'K' => 146.1876,
        b'L' => 131.1729,
        b'M' => 149.2113,
        b'N' => 132.1179,
        b'P' => 115.1305,
        b'Q' => 146.1445,
        b'R' => 174.2010,
        b'S' => 105.0926,
        b'T' => 119.1192,
        b'V' => 117.1463,
        b'W' => 204.2252,
        b'Y' => 181.1885,
        _ => 0.0,
    }
}

// ── Ionisable groups ──────────────────────────────────────────────────────────

/// Side chains carrying positive charge when protonated.
pub const POSITIVE_PKA: &[(u8, f64)] = &[(b'K', 10.0), (b'R', 12.0), (b'H', 5.98)];

/// Side chains carrying negative charge when deprotonated.
pub const NEGATIVE_PKA: &[(u8, f64)] = &[(b'D', 4.05), (b'E', 4.45), (b'C', 9.0), (b'Y', 10.0)];

pub fn n_terminal_pka(first: u8) -> f64 {
    match first {
        b'A' => 7.59,
        b'M' => 7.0,
        b'S' => 6.93,
        b'P' => 8.36,
        b'T' => 6.82,
        b'V' => 7.44,
        b'E' => 7.7,
        _ => 9.0,
    }
}

pub fn c_terminal_pka(last: u8) -> f64 {
    match last {
        b'D' => 4.55,
        b'E' => 4.75,
        _ => 2.0,
    }
}

// ── Dipeptide instability weight values ───────────────────────────────────────

fn diwv_row(first: u8) -> &'static [(u8, f64)] {
    match first {
        b'A' => &[(b'C', 44.94), (b'D', -7.49), (b'H', -7.49), (b'P', 20.26)],
        b'C' => &[(b'D', 20.26), (b'H', 33.6), (b'M', 33.6), (b'L', 20.26), (b'Q', -6.54), (b'P', 20.26), (b'T', 33.6), (b'W', 24.68), (b'V', -6.54)],
        b'D' => &[(b'F', -6.54), (b'K', -7.49), (b'S', 20.26), (b'R', -6.54), (b'T', -14.03)],
        b'E' => &[(b'C', 44.94), (b'E', 33.6), (b'D', 20.26), (b'I', 20.26), (b'H', -6.54), (b'Q', 20.26), (b'P', 20.26), (b'S', 20.26), (b'W', -14.03)],
        b'F' => &[(b'D', 13.34), (b'K', -14.03), (b'P', 20.26), (b'Y', 33.601)],
        b'G' => &[(b'A', -7.49), (b'E', -6.54), (b'G', 13.34), (b'I', -7.49), (b'K', -7.49), (b'N', -7.49), (b'T', -7.49), (b'W', 13.34), (b'Y', -7.49)],
        b'H' => &[(b'G', -9.37), (b'F', -9.37), (b'I', 44.94), (b'K', 24.68), (b'N', 24.68), (b'P', -1.88), (b'T', -6.54), (b'W', -1.88), (b'Y', 44.94)],
        b'I' => &[(b'E', 44.94), (b'H', 13.34), (b'K', -7.49), (b'L', 20.26), (b'P', -1.88), (b'V', -7.49)],
        b'K' => &[(b'G', -7.49), (b'I', -7.49), (b'M', 33.6), (b'L', -7.49), (b'Q', 24.64), (b'P', -6.54), (b'R', 33.6), (b'V', -7.49)],
        b'L' => &[(b'K', -7.49), (b'Q', 33.6), (b'P', 20.26), (b'R', 20.26), (b'W', 24.68)],
        b'M' => &[(b'A', 13.34), (b'H', 58.28), (b'M', -1.88), (b'Q', -6.54), (b'P', 44.94), (b'S', 44.94), (b'R', -6.54), (b'T', -1.88), (b'Y', 24.68)],
        b'N' => &[(b'C', -1.88), (b'G', -14.03), (b'F', -14.03), (b'I', 44.94), (b'K', 24.68), (b'Q', -6.54), (b'P', -1.88), (b'T', -7.49), (b'W', -9.37)],
        b'P' => &[(b'A', 20.26), (b'C', -6.54), (b'E', 18.38), (b'D', -6.54), (b'F', 20.26), (b'M', -6.54), (b'Q', 20.26), (b'P', 20.26), (b'S', 20.26), (b'R', -6.54), (b'W', -1.88), (b'V', 20.26)],
        b'Q' => &[(b'C', -6.54), (b'E', 20.26), (b'D', 20.26), (b'F', -6.54), (b'Q', 20.26), (b'P', 20.26), (b'S', 44.94), (b'V', -6.54), (b'Y', -6.54)],
        b'R' => &[(b'G', -7.49), (b'H', 20.26), (b'N', 13.34), (b'Q', 20.26), (b'P', 20.26), (b'S', 44.94), (b'R', 58.28), (b'W', 58.28), (b'Y', -6.54)],
        b'S' => &[(b'C', 33.6), (b'E', 20.26), (b'Q', 20.26), (b'P', 44.94), (b'S', 20.26), (b'R', 20.26)],
        b'T' => &[(b'E', 20.26), (b'G', -7.49), (b'F', 13.34), (b'N', -14.03), (b'Q', -6.54), (b'W', -14.03)],
        b'V' => &[(b'D', -14.03), (b'G', -7.49), (b'K', -1.88), (b'P', 20.26), (b'T', -7.49), (b'Y', -6.54)],
        b'W' => &[(b'A', -14.03), (b'G', -9.37), (b'H', 24.68), (b'M', 24.68), (b'L', 13.34), (b'N', 13.34), (b'T', -14.03), (b'V', -7.49)],
        b'Y' => &[(b'A', 24.68), (b'E', -6.54), (b'D', 24.68), (b'G', -7.49), (b'H', 13.34), (b'M', 44.94), (b'P', 13.34), (b'R', -15.91), (b'T', -7.49), (b'W', -9.37), (b'Y', 13.34)],
        _ => &[],
    }
}

/// DIWV(x, y) for the dipeptide `xy`. Pairs absent from the table weigh 1.0.
pub fn diwv(first: u8, second: u8) -> f64 {
    diwv_row(first)
        .iter()
        .find(|(b, _)| *b == second)
        .map(|(_, w)| *w)
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diwv_lookup() {
        assert_eq!(diwv(b'A', b'C'), 44.94);
        assert_eq!(diwv(b'Y', b'R'), -15.91);
        assert_eq!(diwv(b'A', b'A'), 1.0);
        assert_eq!(diwv(b'W', b'W'), 1.0);
    }

    #[test]
    fn test_tables_cover_standard_residues() {
        for &r in STANDARD_RESIDUES {
            assert!(average_mass(r) > 0.0, "missing mass for {}", r as char);
            assert!(kyte_doolittle(r) != 0.0, "missing hydropathy for {}", r as char);
        }
        assert!(!is_standard(b'X'));
        assert!(!is_standard(b'B'));
    }
}
