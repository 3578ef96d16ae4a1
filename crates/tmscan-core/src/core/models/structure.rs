use super::atom::Atom;
use super::chain::{Chain, ChainType};
use super::ids::{AtomId, ChainId, ResidueId};
use super::membrane::{Membrane, MembraneFrame};
use super::residue::Residue;
use super::secondary::{ElementKind, SecondaryElement};
use crate::core::utils::geometry::mean_point;
use nalgebra::Point3;
use serde::Serialize;
use slotmap::SlotMap;
use std::collections::HashMap;

/// Number of representative points averaged at each end of a helix element.
const HELIX_END_WINDOW: usize = 4;

/// Overall membrane classification of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProteinType {
    NoProtein,
    #[default]
    Soluble,
    AlphaHelical,
    BetaBarrel,
    Mixed,
}

/// A protein structure annotated with exposure and secondary structure.
///
/// Atoms, residues and chains live in slot-map arenas and are addressed by
/// stable IDs; chains keep their insertion order. The search engine reads
/// this model and writes back the committed membranes, the membrane frame
/// and the per-residue region labels.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    /// Identifier of the entry (e.g., a PDB code or file stem).
    pub name: String,
    /// Primary storage for atoms.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains.
    chains: SlotMap<ChainId, Chain>,
    /// Chains in insertion order.
    chain_order: Vec<ChainId>,
    /// Lookup map for finding chains by their author identifier.
    chain_id_map: HashMap<String, ChainId>,
    /// Lookup map for finding residues by chain ID and label sequence number.
    residue_id_map: HashMap<(ChainId, isize), ResidueId>,
    /// Straight secondary-structure segments.
    elements: Vec<SecondaryElement>,
    /// Committed membranes (zero, one or two).
    pub membranes: Vec<Membrane>,
    /// Quality value of the committed membrane search.
    pub q_value: f64,
    /// Whether the structure was found to span a membrane.
    pub transmembrane: bool,
    pub protein_type: ProteinType,
    /// Transform into the membrane frame, set once a membrane is committed.
    pub frame: Option<MembraneFrame>,
}

impl Structure {
    /// Creates a new, empty structure with the given entry name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn residue_mut(&mut self, id: ResidueId) -> Option<&mut Residue> {
        self.residues.get_mut(id)
    }

    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.residues.iter()
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn chain_mut(&mut self, id: ChainId) -> Option<&mut Chain> {
        self.chains.get_mut(id)
    }

    /// Returns an iterator over all chains in insertion order.
    ///
    /// # Return
    ///
    /// An iterator yielding `(ChainId, &Chain)` pairs.
    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chain_order
            .iter()
            .filter_map(|&id| self.chains.get(id).map(|chain| (id, chain)))
    }

    /// Chain IDs in insertion order.
    pub fn chain_ids(&self) -> &[ChainId] {
        &self.chain_order
    }

    /// Finds a chain ID by its author identifier.
    ///
    /// # Arguments
    ///
    /// * `id` - The author chain identifier.
    ///
    /// # Return
    ///
    /// Returns `Some(ChainId)` if the chain exists, otherwise `None`.
    pub fn find_chain_by_id(&self, id: &str) -> Option<ChainId> {
        self.chain_id_map.get(id).copied()
    }

    /// Finds a residue ID by its chain and label sequence number.
    ///
    /// # Arguments
    ///
    /// * `chain_id` - The ID of the chain containing the residue.
    /// * `label_seq` - The label sequence number of the residue.
    ///
    /// # Return
    ///
    /// Returns `Some(ResidueId)` if the residue exists, otherwise `None`.
    pub fn find_residue_by_id(&self, chain_id: ChainId, label_seq: isize) -> Option<ResidueId> {
        self.residue_id_map.get(&(chain_id, label_seq)).copied()
    }

    /// Adds a new chain to the structure or returns the existing one.
    ///
    /// This method is idempotent; if a chain with the given identifier already
    /// exists, its ID is returned and its type is left untouched.
    ///
    /// # Arguments
    ///
    /// * `id` - The author chain identifier.
    /// * `chain_type` - The type of the chain.
    ///
    /// # Return
    ///
    /// The ID of the chain (new or existing).
    pub fn add_chain(&mut self, id: &str, chain_type: ChainType) -> ChainId {
        if let Some(&existing) = self.chain_id_map.get(id) {
            return existing;
        }
        let chain_id = self.chains.insert(Chain::new(id, chain_type));
        self.chain_id_map.insert(id.to_string(), chain_id);
        self.chain_order.push(chain_id);
        chain_id
    }

    /// Adds a new residue to a chain or returns the existing one.
    ///
    /// Residues are keyed by `(chain, label_seq)`; a repeated key returns the
    /// residue already stored.
    ///
    /// # Arguments
    ///
    /// * `chain_id` - The ID of the chain to add the residue to.
    /// * `label_seq` - The label sequence number.
    /// * `auth_seq` - The author sequence number.
    /// * `name` - The three-letter residue name.
    ///
    /// # Return
    ///
    /// Returns `Some(ResidueId)` if successful, otherwise `None` (the chain doesn't exist).
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        label_seq: isize,
        auth_seq: isize,
        name: &str,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        let key = (chain_id, label_seq);

        if let Some(&existing) = self.residue_id_map.get(&key) {
            return Some(existing);
        }

        let residue_id = self
            .residues
            .insert(Residue::new(label_seq, auth_seq, name, chain_id));
        self.residue_id_map.insert(key, residue_id);
        chain.residues.push(residue_id);
        Some(residue_id)
    }

    /// Adds an atom to a specific residue.
    ///
    /// # Arguments
    ///
    /// * `residue_id` - The ID of the residue to add the atom to.
    /// * `atom` - The atom to add.
    ///
    /// # Return
    ///
    /// Returns `Some(AtomId)` if successful, otherwise `None` (the residue doesn't exist).
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, mut atom: Atom) -> Option<AtomId> {
        let residue = self.residues.get_mut(residue_id)?;
        atom.residue_id = residue_id;
        let name = atom.name.clone();
        let atom_id = self.atoms.insert(atom);
        residue.add_atom(&name, atom_id);
        Some(atom_id)
    }

    /// Position of the residue's representative atom (CA, CB, C or N).
    pub fn representative_point(&self, residue_id: ResidueId) -> Option<Point3<f64>> {
        let residue = self.residues.get(residue_id)?;
        let atom_id = residue.representative_atom()?;
        self.atoms.get(atom_id).map(|atom| atom.position)
    }

    /// Whether a residue takes part in the search: it and its chain are selected.
    pub fn is_residue_selected(&self, residue_id: ResidueId) -> bool {
        self.residues
            .get(residue_id)
            .and_then(|residue| {
                self.chains
                    .get(residue.chain_id)
                    .map(|chain| chain.selected && residue.selected)
            })
            .unwrap_or(false)
    }

    /// Iterates the selected residues of selected chains, in chain order.
    pub fn selected_residues(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.chains_iter()
            .filter(|(_, chain)| chain.selected)
            .flat_map(move |(_, chain)| {
                chain
                    .residues
                    .iter()
                    .filter_map(move |&id| self.residues.get(id).map(|residue| (id, residue)))
            })
            .filter(|(_, residue)| residue.selected)
    }

    pub fn selected_chain_count(&self) -> usize {
        self.chains_iter().filter(|(_, chain)| chain.selected).count()
    }

    /// Mean position of all atoms of selected residues.
    ///
    /// # Return
    ///
    /// Returns `None` when nothing is selected.
    pub fn mass_centre(&self) -> Option<Point3<f64>> {
        let positions: Vec<Point3<f64>> = self
            .selected_residues()
            .flat_map(|(_, residue)| residue.atoms.iter())
            .filter_map(|&atom_id| self.atoms.get(atom_id).map(|atom| atom.position))
            .collect();
        mean_point(positions.iter())
    }

    pub fn secondary_elements(&self) -> &[SecondaryElement] {
        &self.elements
    }

    pub fn set_secondary_elements(&mut self, elements: Vec<SecondaryElement>) {
        self.elements = elements;
    }

    /// Rebuilds the secondary-structure elements from residue classes.
    ///
    /// Each maximal run of residues sharing a straight element kind becomes one
    /// element when it is long enough; a residue without a representative atom
    /// breaks the run. Helix ends are averaged over four residues so that the
    /// element follows the helix axis instead of the CA spiral.
    ///
    /// # Return
    ///
    /// The number of elements derived.
    pub fn derive_secondary_elements(&mut self) -> usize {
        let mut elements = Vec::new();
        for (chain_id, chain) in self.chains_iter() {
            if !chain.chain_type.is_protein() {
                continue;
            }
            let mut run: Vec<(usize, Point3<f64>)> = Vec::new();
            let mut run_kind: Option<ElementKind> = None;

            for (index, &residue_id) in chain.residues.iter().enumerate() {
                let kind = self
                    .residues
                    .get(residue_id)
                    .and_then(|residue| residue.secondary.element_kind());
                let point = self.representative_point(residue_id);

                match (kind, point) {
                    (Some(kind), Some(point)) if run_kind == Some(kind) => run.push((index, point)),
                    (Some(kind), Some(point)) => {
                        push_element(&mut elements, chain_id, run_kind, &run);
                        run.clear();
                        run.push((index, point));
                        run_kind = Some(kind);
                    }
                    _ => {
                        push_element(&mut elements, chain_id, run_kind, &run);
                        run.clear();
                        run_kind = None;
                    }
                }
            }
            push_element(&mut elements, chain_id, run_kind, &run);
        }
        let count = elements.len();
        self.elements = elements;
        count
    }

    /// Drops every committed membrane, region annotation and the protein type.
    pub fn reset_membranes(&mut self) {
        self.membranes.clear();
        self.q_value = 0.0;
        self.transmembrane = false;
        self.protein_type = ProteinType::default();
        self.frame = None;
        for (_, chain) in self.chains.iter_mut() {
            chain.clear_annotation();
        }
        for (_, residue) in self.residues.iter_mut() {
            residue.region = Default::default();
        }
    }

    /// Selects every chain and residue again and turns low-resolution chains
    /// back into plain protein chains.
    pub fn reset_selection(&mut self) {
        for (_, chain) in self.chains.iter_mut() {
            chain.selected = true;
            if chain.chain_type == ChainType::LowResolution {
                chain.chain_type = ChainType::Protein;
            }
        }
        for (_, residue) in self.residues.iter_mut() {
            residue.selected = true;
        }
    }
}

fn push_element(
    elements: &mut Vec<SecondaryElement>,
    chain_id: ChainId,
    kind: Option<ElementKind>,
    run: &[(usize, Point3<f64>)],
) {
    let Some(kind) = kind else {
        return;
    };
    if run.len() < kind.min_length() {
        return;
    }
    let (first, last) = (run[0].0, run[run.len() - 1].0);
    let (begin, end) = match kind {
        ElementKind::Helix => {
            let window = HELIX_END_WINDOW.min(run.len());
            let head = mean_point(run[..window].iter().map(|(_, p)| p));
            let tail = mean_point(run[run.len() - window..].iter().map(|(_, p)| p));
            match (head, tail) {
                (Some(head), Some(tail)) => (head, tail),
                _ => return,
            }
        }
        ElementKind::Strand => (run[0].1, run[run.len() - 1].1),
    };
    elements.push(SecondaryElement {
        kind,
        chain_id,
        first,
        last,
        begin,
        end,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::secondary::SecondaryStructure;

    fn add_ca_residue(
        structure: &mut Structure,
        chain_id: ChainId,
        seq: isize,
        name: &str,
        position: Point3<f64>,
        ss: SecondaryStructure,
    ) -> ResidueId {
        let residue_id = structure.add_residue(chain_id, seq, seq, name).unwrap();
        structure.residue_mut(residue_id).unwrap().secondary = ss;
        let atom = Atom::new("CA", residue_id, position);
        structure.add_atom_to_residue(residue_id, atom).unwrap();
        residue_id
    }

    #[test]
    fn add_chain_is_idempotent_and_keeps_order() {
        let mut structure = Structure::new("test");
        let b = structure.add_chain("B", ChainType::Protein);
        let a = structure.add_chain("A", ChainType::Protein);
        assert_eq!(structure.add_chain("B", ChainType::NonPolymer), b);
        assert_eq!(structure.chain_ids(), &[b, a]);
        assert_eq!(structure.chain(b).unwrap().chain_type, ChainType::Protein);
        assert_eq!(structure.find_chain_by_id("A"), Some(a));
    }

    #[test]
    fn add_residue_is_idempotent_per_label_seq() {
        let mut structure = Structure::new("test");
        let chain_id = structure.add_chain("A", ChainType::Protein);
        let r1 = structure.add_residue(chain_id, 1, 101, "ALA").unwrap();
        let again = structure.add_residue(chain_id, 1, 999, "GLY").unwrap();
        assert_eq!(r1, again);
        assert_eq!(structure.residue(r1).unwrap().auth_seq, 101);
        assert_eq!(structure.chain(chain_id).unwrap().residues().len(), 1);
        assert_eq!(structure.find_residue_by_id(chain_id, 1), Some(r1));
    }

    #[test]
    fn add_residue_to_missing_chain_returns_none() {
        let mut structure = Structure::new("test");
        let chain_id = structure.add_chain("A", ChainType::Protein);
        let mut other = Structure::new("other");
        assert!(other.add_residue(chain_id, 1, 1, "ALA").is_none());
        assert!(structure.add_residue(chain_id, 1, 1, "ALA").is_some());
    }

    #[test]
    fn add_atom_rewrites_residue_id_and_registers_name() {
        let mut structure = Structure::new("test");
        let chain_id = structure.add_chain("A", ChainType::Protein);
        let residue_id = structure.add_residue(chain_id, 1, 1, "ALA").unwrap();
        let stray = structure.add_residue(chain_id, 2, 2, "ALA").unwrap();
        let atom_id = structure
            .add_atom_to_residue(residue_id, Atom::new("CB", stray, Point3::new(1.0, 0.0, 0.0)))
            .unwrap();
        assert_eq!(structure.atom(atom_id).unwrap().residue_id, residue_id);
        assert_eq!(
            structure.residue(residue_id).unwrap().get_atom_id_by_name("CB"),
            Some(atom_id)
        );
        assert_eq!(
            structure.representative_point(residue_id),
            Some(Point3::new(1.0, 0.0, 0.0))
        );
    }

    #[test]
    fn mass_centre_ignores_unselected_chains_and_residues() {
        let mut structure = Structure::new("test");
        let a = structure.add_chain("A", ChainType::Protein);
        let b = structure.add_chain("B", ChainType::Protein);
        add_ca_residue(&mut structure, a, 1, "ALA", Point3::new(0.0, 0.0, 0.0), SecondaryStructure::Coil);
        add_ca_residue(&mut structure, a, 2, "ALA", Point3::new(2.0, 0.0, 0.0), SecondaryStructure::Coil);
        let dropped =
            add_ca_residue(&mut structure, a, 3, "ALA", Point3::new(100.0, 0.0, 0.0), SecondaryStructure::Coil);
        add_ca_residue(&mut structure, b, 1, "ALA", Point3::new(-50.0, 0.0, 0.0), SecondaryStructure::Coil);

        structure.residue_mut(dropped).unwrap().selected = false;
        structure.chain_mut(b).unwrap().selected = false;

        assert_eq!(structure.mass_centre(), Some(Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(structure.selected_residues().count(), 2);
        assert_eq!(structure.selected_chain_count(), 1);
        assert!(!structure.is_residue_selected(dropped));
    }

    #[test]
    fn mass_centre_of_empty_structure_is_none() {
        assert!(Structure::new("empty").mass_centre().is_none());
    }

    #[test]
    fn derive_secondary_elements_finds_helix_and_strand_runs() {
        let mut structure = Structure::new("test");
        let chain_id = structure.add_chain("A", ChainType::Protein);
        let mut seq = 1;
        let mut add = |structure: &mut Structure, ss: SecondaryStructure, count: usize| {
            for _ in 0..count {
                let z = seq as f64 * 1.5;
                add_ca_residue(structure, chain_id, seq, "LEU", Point3::new(0.0, 0.0, z), ss);
                seq += 1;
            }
        };
        add(&mut structure, SecondaryStructure::Coil, 2);
        add(&mut structure, SecondaryStructure::AlphaHelix, 6);
        add(&mut structure, SecondaryStructure::Turn, 1);
        add(&mut structure, SecondaryStructure::Strand, 2);
        add(&mut structure, SecondaryStructure::Coil, 1);
        add(&mut structure, SecondaryStructure::Strand, 3);

        assert_eq!(structure.derive_secondary_elements(), 2);
        let elements = structure.secondary_elements();

        let helix = &elements[0];
        assert_eq!(helix.kind, ElementKind::Helix);
        assert_eq!((helix.first, helix.last), (2, 7));
        // Residues 3..=6 sit at z = 4.5..9.0, residues 5..=8 at z = 7.5..12.0.
        assert!((helix.begin.z - 6.75).abs() < 1e-9);
        assert!((helix.end.z - 9.75).abs() < 1e-9);

        let strand = &elements[1];
        assert_eq!(strand.kind, ElementKind::Strand);
        assert_eq!((strand.first, strand.last), (12, 14));
        assert!((strand.begin.z - 19.5).abs() < 1e-9);
        assert!((strand.end.z - 22.5).abs() < 1e-9);
    }

    #[test]
    fn reset_membranes_clears_committed_state() {
        let mut structure = Structure::new("test");
        let chain_id = structure.add_chain("A", ChainType::Protein);
        let residue_id =
            add_ca_residue(&mut structure, chain_id, 1, "ALA", Point3::origin(), SecondaryStructure::Coil);
        structure.q_value = 80.0;
        structure.transmembrane = true;
        structure.protein_type = ProteinType::AlphaHelical;
        structure.chain_mut(chain_id).unwrap().num_tm = 3;
        structure.residue_mut(residue_id).unwrap().region = crate::core::models::region::RegionType::Membrane;

        structure.reset_membranes();

        assert_eq!(structure.q_value, 0.0);
        assert!(!structure.transmembrane);
        assert_eq!(structure.protein_type, ProteinType::Soluble);
        assert_eq!(structure.chain(chain_id).unwrap().num_tm, 0);
        assert_eq!(
            structure.residue(residue_id).unwrap().region,
            crate::core::models::region::RegionType::Unknown
        );
    }

    #[test]
    fn reset_selection_restores_every_chain_and_residue() {
        let mut structure = Structure::new("test");
        let a = structure.add_chain("A", ChainType::Protein);
        let b = structure.add_chain("B", ChainType::NonPolymer);
        let residue_id =
            add_ca_residue(&mut structure, a, 1, "ALA", Point3::origin(), SecondaryStructure::Coil);
        structure.residue_mut(residue_id).unwrap().selected = false;
        let chain = structure.chain_mut(a).unwrap();
        chain.selected = false;
        chain.chain_type = ChainType::LowResolution;
        structure.chain_mut(b).unwrap().selected = false;

        structure.reset_selection();

        assert!(structure.is_residue_selected(residue_id));
        assert_eq!(structure.chain(a).unwrap().chain_type, ChainType::Protein);
        assert_eq!(structure.chain(b).unwrap().chain_type, ChainType::NonPolymer);
        assert_eq!(structure.selected_chain_count(), 2);
    }
}
