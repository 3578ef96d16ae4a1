use super::ids::{AtomId, ChainId};
use super::region::RegionType;
use super::secondary::SecondaryStructure;
use crate::core::utils::identifiers::{AminoAcidProperties, amino_acid_properties};
use std::collections::HashMap;

/// Atom names tried in order when picking the point that stands for a residue.
pub const REPRESENTATIVE_ATOM_NAMES: [&str; 4] = ["CA", "CB", "C", "N"];

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub label_seq: isize,                   // Sequential (label) residue number
    pub auth_seq: isize,                    // Author residue number from the source file
    pub icode: Option<char>,                // Insertion code
    pub name: String,                       // Three-letter residue name (e.g., "LEU")
    pub chain_id: ChainId,                  // ID of the parent chain
    pub secondary: SecondaryStructure,      // Secondary-structure class
    pub selected: bool,                     // Participates in the membrane search
    pub region: RegionType,                 // Assigned topological region
    pub(crate) atoms: Vec<AtomId>,          // Atoms in input order
    atom_name_map: HashMap<String, AtomId>, // Map from atom name to its stable ID
}

impl Residue {
    pub(crate) fn new(label_seq: isize, auth_seq: isize, name: &str, chain_id: ChainId) -> Self {
        Self {
            label_seq,
            auth_seq,
            icode: None,
            name: name.trim().to_string(),
            chain_id,
            secondary: SecondaryStructure::Coil,
            selected: true,
            region: RegionType::Unknown,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map.insert(atom_name.to_string(), atom_id);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }

    /// Reference values for standard amino acids, `None` otherwise.
    pub fn properties(&self) -> Option<&'static AminoAcidProperties> {
        amino_acid_properties(&self.name)
    }

    pub fn is_standard_amino_acid(&self) -> bool {
        self.properties().is_some()
    }

    /// The atom standing for this residue: CA, else CB, else C, else N.
    pub fn representative_atom(&self) -> Option<AtomId> {
        REPRESENTATIVE_ATOM_NAMES
            .iter()
            .find_map(|name| self.get_atom_id_by_name(name))
    }
}
