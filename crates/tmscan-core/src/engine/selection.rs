use crate::core::models::chain::ChainType;
use crate::core::models::ids::ChainId;
use crate::core::models::structure::Structure;
use crate::core::utils::identifiers::{amino_acid_properties_or_unknown, is_backbone_atom, is_heavy_atom};
use tracing::{debug, instrument};

/// Residue completeness counts of one chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainCompleteness {
    /// Residues carrying every expected side-chain heavy atom.
    pub complete: usize,
    /// Residues with no side-chain heavy atom at all.
    pub backbone_only: usize,
}

pub fn chain_completeness(structure: &Structure, chain_id: ChainId) -> ChainCompleteness {
    let mut counts = ChainCompleteness::default();
    let Some(chain) = structure.chain(chain_id) else {
        return counts;
    };
    for residue in chain.residues().iter().filter_map(|&id| structure.residue(id)) {
        let side_chain_atoms = residue
            .atoms()
            .iter()
            .filter_map(|&atom_id| structure.atom(atom_id))
            .filter(|atom| is_heavy_atom(&atom.name) && !is_backbone_atom(&atom.name))
            .count();
        let expected = amino_acid_properties_or_unknown(&residue.name).side_chain_atoms;
        if side_chain_atoms >= expected {
            counts.complete += 1;
        }
        if side_chain_atoms == 0 {
            counts.backbone_only += 1;
        }
    }
    counts
}

/// Decides which chains and residues take part in the membrane search.
///
/// Non-protein chains are dropped. A chain dominated by backbone-only
/// residues becomes [`ChainType::LowResolution`]; a chain with fewer than
/// `min_residues` usable residues is dropped. Residues without a
/// representative atom are dropped. Selections already switched off by the
/// caller stay off.
///
/// # Return
///
/// The number of chains left selected.
#[instrument(skip_all, name = "chain_selection")]
pub fn select_chains(structure: &mut Structure, min_residues: usize) -> usize {
    let chain_ids: Vec<ChainId> = structure.chain_ids().to_vec();
    for chain_id in chain_ids {
        let Some(chain) = structure.chain(chain_id) else {
            continue;
        };
        if !chain.chain_type.is_protein() {
            if let Some(chain) = structure.chain_mut(chain_id) {
                chain.selected = false;
            }
            continue;
        }

        let counts = chain_completeness(structure, chain_id);
        let residue_ids = chain.residues().to_vec();
        let located: Vec<bool> = residue_ids
            .iter()
            .map(|&id| structure.representative_point(id).is_some())
            .collect();
        for (&residue_id, located) in residue_ids.iter().zip(located) {
            if !located {
                if let Some(residue) = structure.residue_mut(residue_id) {
                    residue.selected = false;
                }
            }
        }

        if let Some(chain) = structure.chain_mut(chain_id) {
            if counts.backbone_only > counts.complete && chain.chain_type == ChainType::Protein {
                chain.chain_type = ChainType::LowResolution;
            }
            if counts.complete + counts.backbone_only < min_residues {
                chain.selected = false;
            }
            debug!(
                chain = %chain.id,
                complete = counts.complete,
                backbone_only = counts.backbone_only,
                chain_type = %chain.chain_type,
                selected = chain.selected,
                "Chain screened."
            );
        }
    }
    structure.selected_chain_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::engine::fixtures;
    use nalgebra::Point3;

    fn add_residue(structure: &mut Structure, chain: ChainId, seq: isize, name: &str, atoms: &[&str]) {
        let residue_id = structure.add_residue(chain, seq, seq, name).unwrap();
        for (i, atom_name) in atoms.iter().enumerate() {
            let atom = Atom::new(atom_name, residue_id, Point3::new(seq as f64, i as f64, 0.0));
            structure.add_atom_to_residue(residue_id, atom).unwrap();
        }
    }

    #[test]
    fn completeness_counts_full_and_backbone_only_residues() {
        let mut structure = Structure::new("t");
        let chain = structure.add_chain("A", ChainType::Protein);
        add_residue(&mut structure, chain, 1, "SER", &["N", "CA", "C", "O", "CB", "OG"]);
        add_residue(&mut structure, chain, 2, "LEU", &["N", "CA", "C", "O", "CB"]);
        add_residue(&mut structure, chain, 3, "ALA", &["N", "CA", "C", "O"]);
        add_residue(&mut structure, chain, 4, "GLY", &["N", "CA", "C", "O", "H"]);

        let counts = chain_completeness(&structure, chain);
        assert_eq!(counts.complete, 2);
        assert_eq!(counts.backbone_only, 2);
    }

    #[test]
    fn ca_only_chains_become_low_resolution() {
        let mut structure = fixtures::helix_bundle();
        assert_eq!(select_chains(&mut structure, 15), 6);
        assert!(
            structure
                .chains_iter()
                .all(|(_, chain)| chain.chain_type == ChainType::LowResolution)
        );
    }

    #[test]
    fn short_and_non_protein_chains_are_dropped() {
        let mut structure = Structure::new("t");
        let short = structure.add_chain("A", ChainType::Protein);
        for seq in 1..=5 {
            add_residue(&mut structure, short, seq, "ALA", &["N", "CA", "C", "O", "CB"]);
        }
        let ligand = structure.add_chain("B", ChainType::NonPolymer);
        add_residue(&mut structure, ligand, 1, "HEM", &["FE"]);

        assert_eq!(select_chains(&mut structure, 15), 0);
        assert!(!structure.chain(short).unwrap().selected);
        assert!(!structure.chain(ligand).unwrap().selected);
    }

    #[test]
    fn residues_without_representative_atom_are_dropped() {
        let mut structure = Structure::new("t");
        let chain = structure.add_chain("A", ChainType::Protein);
        for seq in 1..=20 {
            add_residue(&mut structure, chain, seq, "ALA", &["N", "CA", "C", "O", "CB"]);
        }
        add_residue(&mut structure, chain, 21, "ALA", &["O"]);

        assert_eq!(select_chains(&mut structure, 15), 1);
        let last = structure.find_residue_by_id(chain, 21).unwrap();
        assert!(!structure.residue(last).unwrap().selected);
        assert_eq!(structure.chain(chain).unwrap().chain_type, ChainType::Protein);
    }
}
