use super::config::{RegionConfig, RegionRuleKind};
use super::sides::ResidueLabel;
use crate::core::models::chain::Chain;
use crate::core::models::ids::ChainId;
use crate::core::models::membrane::CandidateGeometry;
use crate::core::models::region::{RegionSegment, RegionType, ResidueRef};
use crate::core::models::secondary::{ElementKind, SecondaryElement, SecondaryStructure};
use crate::core::models::structure::Structure;

/// Read-only view of one chain handed to every [`RegionRule`].
pub struct RuleContext<'a> {
    pub structure: &'a Structure,
    pub chain_id: ChainId,
    pub chain: &'a Chain,
    pub geometry: &'a CandidateGeometry,
    pub config: &'a RegionConfig,
}

impl RuleContext<'_> {
    fn secondary(&self, index: usize) -> SecondaryStructure {
        self.chain
            .residues()
            .get(index)
            .and_then(|&id| self.structure.residue(id))
            .map_or(SecondaryStructure::Coil, |residue| residue.secondary)
    }

    fn elements(&self) -> impl Iterator<Item = &SecondaryElement> {
        let chain_id = self.chain_id;
        self.structure
            .secondary_elements()
            .iter()
            .filter(move |element| element.chain_id == chain_id)
    }
}

/// A post-processing step over the raw side labels of one chain.
pub trait RegionRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rewrites labels in place.
    ///
    /// # Return
    ///
    /// The number of residues whose region changed.
    fn apply(&self, context: &RuleContext, labels: &mut [ResidueLabel]) -> usize;
}

/// Instantiates the configured rules in order.
pub fn build_rules(config: &RegionConfig) -> Vec<Box<dyn RegionRule>> {
    config
        .rules
        .iter()
        .map(|kind| -> Box<dyn RegionRule> {
            match kind {
                RegionRuleKind::BoundaryNoise => Box::new(BoundaryNoise),
                RegionRuleKind::ReentrantLoop => Box::new(ReentrantLoop),
                RegionRuleKind::TerminalStub => Box::new(TerminalStub),
                RegionRuleKind::InterfacialHelix => Box::new(InterfacialHelix),
            }
        })
        .collect()
}

/// Maximal runs of membrane-spanning labels, as inclusive index pairs.
fn membrane_runs(labels: &[ResidueLabel]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, label) in labels.iter().enumerate() {
        match (label.region == RegionType::Membrane, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, labels.len() - 1));
    }
    runs
}

/// A single located residue between two membrane residues joins the membrane.
pub struct BoundaryNoise;

impl RegionRule for BoundaryNoise {
    fn name(&self) -> &'static str {
        "boundary-noise"
    }

    fn apply(&self, _context: &RuleContext, labels: &mut [ResidueLabel]) -> usize {
        let mut changed = 0;
        for i in 1..labels.len().saturating_sub(1) {
            let region = labels[i].region;
            if region != RegionType::Membrane
                && region.is_located()
                && labels[i - 1].region == RegionType::Membrane
                && labels[i + 1].region == RegionType::Membrane
            {
                labels[i].region = RegionType::Membrane;
                changed += 1;
            }
        }
        changed
    }
}

/// A membrane run entered and left from the same side is a re-entrant loop.
///
/// Flanks are the nearest located residues on each side of the run; runs
/// at a chain end have no flank there and are left alone.
pub struct ReentrantLoop;

impl RegionRule for ReentrantLoop {
    fn name(&self) -> &'static str {
        "reentrant-loop"
    }

    fn apply(&self, _context: &RuleContext, labels: &mut [ResidueLabel]) -> usize {
        let mut changed = 0;
        for (start, end) in membrane_runs(labels) {
            let before = labels[..start]
                .iter()
                .rev()
                .map(|label| label.region)
                .find(|region| region.is_located());
            let after = labels[end + 1..]
                .iter()
                .map(|label| label.region)
                .find(|region| region.is_located());
            let same_side = match (before, after) {
                (Some(b), Some(a)) => b == a && (b.is_side() || b == RegionType::InterMembrane),
                _ => false,
            };
            if same_side {
                for label in &mut labels[start..=end] {
                    label.region = RegionType::ReentrantLoop;
                }
                changed += end + 1 - start;
            }
        }
        changed
    }
}

/// A short membrane run touching a chain end falls back to its side by sign.
pub struct TerminalStub;

impl RegionRule for TerminalStub {
    fn name(&self) -> &'static str {
        "terminal-stub"
    }

    fn apply(&self, context: &RuleContext, labels: &mut [ResidueLabel]) -> usize {
        let first = labels.iter().position(|label| label.region.is_located());
        let last = labels.iter().rposition(|label| label.region.is_located());
        let mut changed = 0;
        for (start, end) in membrane_runs(labels) {
            if Some(start) != first && Some(end) != last {
                continue;
            }
            let length = end + 1 - start;
            let strands = (start..=end)
                .filter(|&i| context.secondary(i).is_strand())
                .count();
            let limit = if 2 * strands > length {
                context.config.terminal_stub_length_beta
            } else {
                context.config.terminal_stub_length
            };
            if length < limit {
                for label in &mut labels[start..=end] {
                    label.region = label.side_by_sign;
                }
                changed += length;
            }
        }
        changed
    }
}

/// A long helix lying flat on a membrane face is an interfacial helix.
pub struct InterfacialHelix;

impl RegionRule for InterfacialHelix {
    fn name(&self) -> &'static str {
        "interfacial-helix"
    }

    fn apply(&self, context: &RuleContext, labels: &mut [ResidueLabel]) -> usize {
        let config = context.config;
        let mut changed = 0;
        for element in context.elements() {
            if element.kind != ElementKind::Helix
                || element.residue_count() < config.interfacial_min_length
                || element.last >= labels.len()
            {
                continue;
            }
            let range = element.first..=element.last;
            let near_face = labels[range.clone()].iter().all(|label| {
                label
                    .face_distance
                    .is_some_and(|d| d <= config.interfacial_max_face_distance)
            });
            let flat = context
                .geometry
                .angle_to_membrane_axis(&element.direction(), &element.midpoint())
                < config.interfacial_max_axis_cos;
            if !(near_face && flat) {
                continue;
            }
            for label in &mut labels[range] {
                if label.region.is_side() || label.region == RegionType::InterMembrane {
                    label.region = RegionType::InterfacialHelix;
                    changed += 1;
                }
            }
        }
        changed
    }
}

/// Merges consecutive equal labels of a chain into region segments.
pub fn merge_segments(structure: &Structure, chain: &Chain, labels: &[ResidueLabel]) -> Vec<RegionSegment> {
    let reference = |index: usize| -> Option<ResidueRef> {
        let residue = structure.residue(*chain.residues().get(index)?)?;
        Some(ResidueRef {
            index,
            label_seq: residue.label_seq,
            auth_seq: residue.auth_seq,
            icode: residue.icode,
        })
    };

    let mut segments = Vec::new();
    let mut start = 0;
    for i in 1..=labels.len() {
        if i < labels.len() && labels[i].region == labels[start].region {
            continue;
        }
        if let (Some(first), Some(last)) = (reference(start), reference(i - 1)) {
            segments.push(RegionSegment {
                chain: chain.id.clone(),
                start: first,
                end: last,
                region: labels[start].region,
            });
        }
        start = i;
    }
    segments
}
