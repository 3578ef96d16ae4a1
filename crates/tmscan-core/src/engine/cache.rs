use super::error::EngineError;
use crate::core::models::chain::ChainType;
use crate::core::models::ids::ResidueId;
use crate::core::models::membrane::CandidateGeometry;
use crate::core::models::secondary::ElementKind;
use crate::core::models::structure::Structure;
use crate::core::utils::identifiers::amino_acid_properties_or_unknown;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

/// Shift that maps the hydrophobicity scale onto non-negative values.
const HYDROPHOBICITY_OFFSET: f64 = 12.3;
/// Span of the shifted hydrophobicity scale.
const HYDROPHOBICITY_RANGE: f64 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ResidueSample {
    pub residue_id: ResidueId,
    pub point: Point3<f64>,
    /// Outward exposed surface.
    pub surface: f64,
    /// Part of `surface` contributed by apolar residues.
    pub apolar: f64,
    /// Index into [`SearchSpace::elements`] of the element covering this residue.
    pub element: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementSample {
    pub begin: Point3<f64>,
    pub end: Point3<f64>,
    pub direction: Vector3<f64>,
    pub midpoint: Point3<f64>,
    pub kind: ElementKind,
}

/// Geometry-independent per-residue inputs of the scorer.
///
/// Built once per optimizer from the selected residues; every candidate
/// evaluation reads it without modification.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    pub mass_centre: Point3<f64>,
    pub residues: Vec<ResidueSample>,
    pub elements: Vec<ElementSample>,
}

impl SearchSpace {
    pub fn build(structure: &Structure) -> Result<Self, EngineError> {
        let mass_centre = structure
            .mass_centre()
            .ok_or(EngineError::NoSelectedResidues)?;

        let mut elements = Vec::new();
        let mut element_of: HashMap<ResidueId, usize> = HashMap::new();
        for element in structure.secondary_elements() {
            let Some(chain) = structure.chain(element.chain_id) else {
                continue;
            };
            if !chain.selected {
                continue;
            }
            let index = elements.len();
            for &residue_id in chain
                .residues()
                .iter()
                .skip(element.first)
                .take(element.residue_count())
            {
                element_of.insert(residue_id, index);
            }
            elements.push(ElementSample {
                begin: element.begin,
                end: element.end,
                direction: element.direction(),
                midpoint: element.midpoint(),
                kind: element.kind,
            });
        }

        let mut residues = Vec::new();
        for (residue_id, residue) in structure.selected_residues() {
            let Some(point) = structure.representative_point(residue_id) else {
                continue;
            };
            let low_resolution = structure
                .chain(residue.chain_id)
                .is_some_and(|chain| chain.chain_type == ChainType::LowResolution);
            let properties = amino_acid_properties_or_unknown(&residue.name);

            let (surface, apolar) = if low_resolution {
                (
                    1.0,
                    (properties.hydrophobicity + HYDROPHOBICITY_OFFSET) / HYDROPHOBICITY_RANGE,
                )
            } else {
                let surface: f64 = residue
                    .atoms()
                    .iter()
                    .filter_map(|&atom_id| structure.atom(atom_id))
                    .map(|atom| atom.out_surface)
                    .sum();
                (surface, if properties.apolar { surface } else { 0.0 })
            };

            residues.push(ResidueSample {
                residue_id,
                point,
                surface,
                apolar,
                element: element_of.get(&residue_id).copied(),
            });
        }

        if residues.is_empty() {
            return Err(EngineError::NoSelectedResidues);
        }

        Ok(Self {
            mass_centre,
            residues,
            elements,
        })
    }
}

/// Per-candidate distances, discarded once the candidate is scored.
#[derive(Debug, Clone, Default)]
pub struct DistanceCache {
    /// Raw distance of each residue along the candidate axis.
    pub distances: Vec<f64>,
    /// |cos| between each element and the local membrane axis.
    pub straightness: Vec<f64>,
    /// Raw distances of each element's begin and end points.
    pub element_ends: Vec<(f64, f64)>,
}

impl DistanceCache {
    pub fn compute(space: &SearchSpace, geometry: &CandidateGeometry) -> Self {
        Self {
            distances: space
                .residues
                .iter()
                .map(|residue| geometry.raw_distance(&residue.point))
                .collect(),
            straightness: space
                .elements
                .iter()
                .map(|element| geometry.angle_to_membrane_axis(&element.direction, &element.midpoint))
                .collect(),
            element_ends: space
                .elements
                .iter()
                .map(|element| {
                    (
                        geometry.raw_distance(&element.begin),
                        geometry.raw_distance(&element.end),
                    )
                })
                .collect(),
        }
    }

    /// Straightness of the element covering residue `index`, zero outside elements.
    pub fn residue_straightness(&self, space: &SearchSpace, index: usize) -> f64 {
        space.residues[index]
            .element
            .and_then(|element| self.straightness.get(element).copied())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::engine::fixtures;
    use nalgebra::Unit;

    #[test]
    fn build_fails_without_selected_residues() {
        let mut structure = fixtures::helix_bundle();
        let ids: Vec<_> = structure.chain_ids().to_vec();
        for id in ids {
            structure.chain_mut(id).unwrap().selected = false;
        }
        assert!(matches!(
            SearchSpace::build(&structure),
            Err(EngineError::NoSelectedResidues)
        ));
    }

    #[test]
    fn low_resolution_residues_use_hydrophobicity_scale() {
        let mut structure = fixtures::helix_bundle();
        let ids: Vec<_> = structure.chain_ids().to_vec();
        for id in ids {
            structure.chain_mut(id).unwrap().chain_type = ChainType::LowResolution;
        }
        let space = SearchSpace::build(&structure).unwrap();
        let first = &space.residues[0];
        assert_eq!(first.surface, 1.0);
        assert!((first.apolar - (-8.8 + 12.3) / 16.0).abs() < 1e-12);
        let helix = &space.residues[fixtures::HELIX_FIRST];
        assert!((helix.apolar - (2.8 + 12.3) / 16.0).abs() < 1e-12);
    }

    #[test]
    fn full_atom_residues_sum_outward_surface() {
        let mut structure = Structure::new("atoms");
        let chain_id = structure.add_chain("A", ChainType::Protein);
        let leu = structure.add_residue(chain_id, 1, 1, "LEU").unwrap();
        let ser = structure.add_residue(chain_id, 2, 2, "SER").unwrap();
        for (residue_id, x) in [(leu, 0.0), (ser, 3.8)] {
            for (name, out) in [("CA", 1.5), ("CB", 2.5)] {
                let atom = Atom::new(name, residue_id, Point3::new(x, 0.0, 0.0)).with_surface(4.0, out);
                structure.add_atom_to_residue(residue_id, atom).unwrap();
            }
        }
        let space = SearchSpace::build(&structure).unwrap();
        assert_eq!(space.residues[0].surface, 4.0);
        assert_eq!(space.residues[0].apolar, 4.0);
        assert_eq!(space.residues[1].surface, 4.0);
        assert_eq!(space.residues[1].apolar, 0.0);
    }

    #[test]
    fn residues_are_mapped_to_their_elements() {
        let mut structure = fixtures::helix_bundle();
        structure.derive_secondary_elements();
        let space = SearchSpace::build(&structure).unwrap();
        assert_eq!(space.elements.len(), 6);
        assert_eq!(space.residues[fixtures::HELIX_FIRST - 1].element, None);
        assert_eq!(space.residues[fixtures::HELIX_FIRST].element, Some(0));
        assert_eq!(space.residues[fixtures::HELIX_LAST].element, Some(0));
        assert_eq!(
            space.residues[fixtures::CHAIN_RESIDUES + fixtures::HELIX_FIRST].element,
            Some(1)
        );
        assert!(space.elements.iter().all(|e| e.kind == ElementKind::Helix));
    }

    #[test]
    fn distance_cache_follows_the_candidate_axis() {
        let mut structure = fixtures::helix_bundle();
        structure.derive_secondary_elements();
        let space = SearchSpace::build(&structure).unwrap();

        let along_z = CandidateGeometry::planar(Vector3::z_axis(), space.mass_centre);
        let cache = DistanceCache::compute(&space, &along_z);
        assert_eq!(cache.distances.len(), space.residues.len());
        assert!((cache.distances[0] + 27.0).abs() < 1e-9);
        assert!((cache.residue_straightness(&space, fixtures::HELIX_FIRST) - 1.0).abs() < 1e-9);
        assert_eq!(cache.residue_straightness(&space, 0), 0.0);
        let (begin, end) = cache.element_ends[0];
        assert!((begin + 12.75).abs() < 1e-9);
        assert!((end - 12.75).abs() < 1e-9);

        let along_x = CandidateGeometry::planar(Unit::new_normalize(Vector3::x()), space.mass_centre);
        let cache = DistanceCache::compute(&space, &along_x);
        assert!(cache.straightness.iter().all(|s| s.abs() < 1e-9));
    }
}
