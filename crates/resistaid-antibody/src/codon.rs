//! Protein → DNA back-translation with one preferred codon per residue.

fn codon(residue: u8) -> &'static str {
    match residue {
        b'A' => "GCT",
        b'C' => "TGC",
        b'D' => "GAC",
        b'E' => "GAG",
        b'F' => "TTC",
        b'G' => "GGC",
        b'H' => "CAC",
        b'I' => "ATC",
        b'K' => "AAG",
        b'L' => "CTG",
        b'M' => "ATG",
        b'N' => "AAC",
        b'P' => "CCC",
        b'Q' => "CAG",
        b'R' => "CGC",
        b'S' => "TCC",
        b'T' => "ACC",
        b'V' => "GTG",
        b'W' => "TGG",
        b'Y' => "TAC",
        _ => "NNN",
    }
}

/// Coding sequence for `protein`. Unknown residues become `NNN`.
pub fn back_translate(protein: &str) -> String {
    protein
        .bytes()
        .map(|r| codon(r.to_ascii_uppercase()))
        .collect()
}
