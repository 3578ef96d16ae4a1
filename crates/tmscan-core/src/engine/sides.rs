use super::config::RegionConfig;
use super::error::EngineError;
use super::regions::{RegionRule, RuleContext, build_rules, merge_segments};
use crate::core::models::ids::ChainId;
use crate::core::models::membrane::{CandidateGeometry, Membrane};
use crate::core::models::region::RegionType;
use crate::core::models::structure::{ProteinType, Structure};
use tracing::{debug, info, instrument};

/// Fraction of membrane residues in one secondary-structure class that
/// decides the protein type.
const PROTEIN_TYPE_FRACTION: f64 = 0.8;

/// Ordered distance boundaries of the committed membranes, outermost first.
///
/// `z1 ≥ z2 ≥ z3 ≥ z4` always holds. For one membrane `z2 == z3` is its
/// mid-surface; for two, `[z2, z1]` is the outer band, `[z4, z3]` the inner
/// band and `(z3, z2)` the inter-membrane space. `o1 ≥ o2` are the
/// mid-surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundaries {
    pub z1: f64,
    pub z2: f64,
    pub z3: f64,
    pub z4: f64,
    pub o1: f64,
    pub o2: f64,
}

impl Boundaries {
    pub fn derive(membranes: &[Membrane]) -> Option<Self> {
        match membranes {
            [] => None,
            [single] => {
                let (s, h) = (single.geometry.shift(), single.half_thickness);
                Some(Self {
                    z1: s + h,
                    z2: s,
                    z3: s,
                    z4: s - h,
                    o1: s,
                    o2: s,
                })
            }
            [a, b, ..] => {
                let (outer, inner) = if a.geometry.shift() >= b.geometry.shift() {
                    (a, b)
                } else {
                    (b, a)
                };
                let (so, ho) = (outer.geometry.shift(), outer.half_thickness);
                let (si, hi) = (inner.geometry.shift(), inner.half_thickness);
                let mut bounds = Self {
                    z1: so + ho,
                    z2: so - ho,
                    z3: si + hi,
                    z4: si - hi,
                    o1: so,
                    o2: si,
                };
                if bounds.z2 < bounds.z3 {
                    let middle = 0.5 * (bounds.z2 + bounds.z3);
                    bounds.z2 = middle;
                    bounds.z3 = middle;
                }
                Some(bounds)
            }
        }
    }

    pub fn classify(&self, distance: f64) -> RegionType {
        if distance > self.z1 {
            RegionType::Side1
        } else if distance >= self.z2 {
            RegionType::Membrane
        } else if distance > self.z3 {
            RegionType::InterMembrane
        } else if distance >= self.z4 {
            RegionType::Membrane
        } else {
            RegionType::Side2
        }
    }

    /// Side of a point when the membranes are treated as infinitely thin.
    pub fn side_by_sign(&self, distance: f64) -> RegionType {
        if distance >= self.o1 {
            RegionType::Side1
        } else if distance < self.o2 {
            RegionType::Side2
        } else {
            RegionType::InterMembrane
        }
    }

    /// Signed distance to the closest mid-surface.
    pub fn mid_distance(&self, distance: f64) -> f64 {
        let (a, b) = (distance - self.o1, distance - self.o2);
        if a.abs() <= b.abs() { a } else { b }
    }

    /// Distance to the closest membrane face.
    pub fn face_distance(&self, distance: f64) -> f64 {
        let faces = if self.o1 == self.o2 {
            vec![self.z1, self.z4]
        } else {
            vec![self.z1, self.z2, self.z3, self.z4]
        };
        faces
            .iter()
            .map(|z| (distance - z).abs())
            .fold(f64::INFINITY, f64::min)
    }
}

/// Per-residue outcome of side detection, before and after region rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueLabel {
    pub region: RegionType,
    pub side_by_sign: RegionType,
    pub mid_distance: Option<f64>,
    pub face_distance: Option<f64>,
}

impl ResidueLabel {
    fn unlocated(region: RegionType) -> Self {
        Self {
            region,
            side_by_sign: region,
            mid_distance: None,
            face_distance: None,
        }
    }
}

/// Labels of one selected chain, index-aligned with its residues.
#[derive(Debug, Clone)]
pub struct ChainLabels {
    pub chain_id: ChainId,
    pub residues: Vec<ResidueLabel>,
}

#[derive(Debug, Clone)]
pub struct SideAssignment {
    pub boundaries: Boundaries,
    /// Frame geometry shared by every committed membrane.
    pub geometry: CandidateGeometry,
    pub chains: Vec<ChainLabels>,
}

/// Labels residues by their position relative to the committed membranes.
pub struct SideDetector;

impl SideDetector {
    /// Computes raw labels for every residue of every selected chain.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] when no membrane is committed.
    #[instrument(skip_all, name = "side_detection")]
    pub fn assign(structure: &Structure) -> Result<SideAssignment, EngineError> {
        let boundaries = Boundaries::derive(&structure.membranes).ok_or_else(|| {
            EngineError::InvalidInput("side detection needs a committed membrane".to_string())
        })?;
        let geometry = structure.membranes[0].geometry.clone();
        debug!(?boundaries, "Membrane boundaries derived.");

        let mut chains = Vec::new();
        for (chain_id, chain) in structure.chains_iter().filter(|(_, chain)| chain.selected) {
            let points: Vec<_> = chain
                .residues()
                .iter()
                .map(|&id| {
                    structure
                        .representative_point(id)
                        .filter(|_| structure.is_residue_selected(id))
                })
                .collect();
            let first = points.iter().position(Option::is_some);
            let last = points.iter().rposition(Option::is_some);

            let residues = points
                .iter()
                .enumerate()
                .map(|(index, point)| match point {
                    Some(point) => {
                        let distance = geometry.raw_distance(point);
                        ResidueLabel {
                            region: boundaries.classify(distance),
                            side_by_sign: boundaries.side_by_sign(distance),
                            mid_distance: Some(boundaries.mid_distance(distance)),
                            face_distance: Some(boundaries.face_distance(distance)),
                        }
                    }
                    None => {
                        let inside = first.zip(last).is_some_and(|(f, l)| (f..=l).contains(&index));
                        ResidueLabel::unlocated(if inside {
                            RegionType::Unknown
                        } else {
                            RegionType::ChainTerminus
                        })
                    }
                })
                .collect();
            chains.push(ChainLabels { chain_id, residues });
        }

        Ok(SideAssignment {
            boundaries,
            geometry,
            chains,
        })
    }

    /// Applies the region rules, writes labels and segments back and sets
    /// the protein type.
    ///
    /// When no chain keeps a membrane-spanning segment the committed
    /// membranes are dropped and the structure becomes soluble, keeping its Q.
    #[instrument(skip_all, name = "region_annotation")]
    pub fn annotate(structure: &mut Structure, mut assignment: SideAssignment, config: &RegionConfig) {
        let rules: Vec<Box<dyn RegionRule>> = build_rules(config);

        for labels in &mut assignment.chains {
            let Some(chain) = structure.chain(labels.chain_id) else {
                continue;
            };
            let context = RuleContext {
                structure: &*structure,
                chain_id: labels.chain_id,
                chain,
                geometry: &assignment.geometry,
                config,
            };
            for rule in &rules {
                let changed = rule.apply(&context, &mut labels.residues);
                if changed > 0 {
                    debug!(chain = %chain.id, rule = rule.name(), changed, "Region rule applied.");
                }
            }
        }

        for labels in &assignment.chains {
            let Some(chain) = structure.chain(labels.chain_id) else {
                continue;
            };
            let residue_ids = chain.residues().to_vec();
            let segments = merge_segments(structure, chain, &labels.residues);
            let num_tm = segments
                .iter()
                .filter(|segment| segment.region == RegionType::Membrane)
                .count();

            for (&residue_id, label) in residue_ids.iter().zip(&labels.residues) {
                if let Some(residue) = structure.residue_mut(residue_id) {
                    residue.region = label.region;
                }
            }
            if let Some(chain) = structure.chain_mut(labels.chain_id) {
                chain.regions = segments;
                chain.num_tm = num_tm;
                chain.transmembrane = num_tm > 0;
            }
        }

        if !structure.chains_iter().any(|(_, chain)| chain.transmembrane) {
            info!("No membrane-spanning segment survived the region rules; structure is soluble.");
            let q_value = structure.q_value;
            structure.reset_membranes();
            structure.q_value = q_value;
            structure.protein_type = ProteinType::Soluble;
            return;
        }

        structure.protein_type = protein_type(structure);
        debug!(protein_type = ?structure.protein_type, "Protein type assigned.");
    }
}

fn protein_type(structure: &Structure) -> ProteinType {
    let (mut total, mut helix, mut strand) = (0usize, 0usize, 0usize);
    for (_, residue) in structure.residues_iter() {
        if residue.region != RegionType::Membrane {
            continue;
        }
        total += 1;
        if residue.secondary.is_helix() {
            helix += 1;
        } else if residue.secondary.is_strand() {
            strand += 1;
        }
    }
    if total == 0 {
        return ProteinType::Mixed;
    }
    let total = total as f64;
    if helix as f64 >= PROTEIN_TYPE_FRACTION * total {
        ProteinType::AlphaHelical
    } else if strand as f64 >= PROTEIN_TYPE_FRACTION * total {
        ProteinType::BetaBarrel
    } else {
        ProteinType::Mixed
    }
}
