use phf::{Map, Set, phf_map, phf_set};

static BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "H", "HN", "CA", "HA", "C", "O", "OXT", "H1", "H2", "H3",
    "HA2", "HA3", "OT1", "OT2",
};

/// Per-residue reference values used when scoring membrane candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AminoAcidProperties {
    /// One-letter sequence code.
    pub one_letter: char,
    /// Whether the side chain is counted as apolar surface.
    pub apolar: bool,
    /// Hydrophobicity scale value; the most polar residue (ARG) sits at -12.3.
    pub hydrophobicity: f64,
    /// Expected number of side-chain heavy atoms in a complete residue.
    pub side_chain_atoms: usize,
}

const fn props(
    one_letter: char,
    apolar: bool,
    hydrophobicity: f64,
    side_chain_atoms: usize,
) -> AminoAcidProperties {
    AminoAcidProperties {
        one_letter,
        apolar,
        hydrophobicity,
        side_chain_atoms,
    }
}

static AMINO_ACIDS: Map<&'static str, AminoAcidProperties> = phf_map! {
    "ALA" => props('A', false, 1.6, 1),
    "CYS" => props('C', false, 2.0, 2),
    "ASP" => props('D', false, -9.2, 4),
    "GLU" => props('E', false, -8.2, 5),
    "PHE" => props('F', true, 3.7, 7),
    "GLY" => props('G', true, 1.0, 0),
    "HIS" => props('H', false, -3.0, 6),
    "ILE" => props('I', true, 3.1, 4),
    "LYS" => props('K', false, -8.8, 5),
    "LEU" => props('L', true, 2.8, 4),
    "MET" => props('M', true, 3.4, 4),
    "MSE" => props('M', true, 3.4, 4),
    "ASN" => props('N', false, -4.8, 4),
    "PRO" => props('P', false, -0.2, 3),
    "GLN" => props('Q', false, -4.1, 5),
    "ARG" => props('R', false, -12.3, 7),
    "SER" => props('S', false, 0.6, 2),
    "THR" => props('T', false, 1.2, 3),
    "VAL" => props('V', true, 2.6, 3),
    "TRP" => props('W', true, 1.9, 10),
    "TYR" => props('Y', true, -0.7, 8),
};

static UNKNOWN_AMINO_ACID: AminoAcidProperties = props('X', false, 0.0, 5);

/// Looks up a standard amino acid by its three-letter residue name.
pub fn amino_acid_properties(residue_name: &str) -> Option<&'static AminoAcidProperties> {
    AMINO_ACIDS.get(residue_name.trim())
}

/// Like [`amino_acid_properties`], falling back to a neutral `UNK` entry.
pub fn amino_acid_properties_or_unknown(residue_name: &str) -> &'static AminoAcidProperties {
    amino_acid_properties(residue_name).unwrap_or(&UNKNOWN_AMINO_ACID)
}

pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

pub fn is_heavy_atom(atom_name: &str) -> bool {
    let first_char = atom_name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase());
    !matches!(first_char, Some('H') | Some('D'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_backbone_atom_recognizes_standard_backbone_atoms() {
        assert!(is_backbone_atom("N"));
        assert!(is_backbone_atom("CA"));
        assert!(is_backbone_atom("C"));
        assert!(is_backbone_atom("O"));
        assert!(is_backbone_atom(" OXT "));
    }

    #[test]
    fn is_backbone_atom_returns_false_for_side_chain_atoms() {
        assert!(!is_backbone_atom("CB"));
        assert!(!is_backbone_atom("SG"));
        assert!(!is_backbone_atom(""));
    }

    #[test]
    fn is_heavy_atom_rejects_hydrogens_and_deuteriums() {
        assert!(is_heavy_atom("CA"));
        assert!(is_heavy_atom("OG1"));
        assert!(!is_heavy_atom("HB2"));
        assert!(!is_heavy_atom("D1"));
    }

    #[test]
    fn amino_acid_table_holds_reference_values() {
        let leu = amino_acid_properties("LEU").unwrap();
        assert_eq!(leu.one_letter, 'L');
        assert!(leu.apolar);
        assert_eq!(leu.side_chain_atoms, 4);

        let arg = amino_acid_properties("ARG").unwrap();
        assert!(!arg.apolar);
        assert_eq!(arg.hydrophobicity, -12.3);

        assert_eq!(amino_acid_properties("GLY").unwrap().side_chain_atoms, 0);
    }

    #[test]
    fn unknown_residue_names_fall_back_to_neutral_entry() {
        assert!(amino_acid_properties("HOH").is_none());
        let unk = amino_acid_properties_or_unknown("HOH");
        assert_eq!(unk.one_letter, 'X');
        assert_eq!(unk.hydrophobicity, 0.0);
        assert!(!unk.apolar);
    }
}
