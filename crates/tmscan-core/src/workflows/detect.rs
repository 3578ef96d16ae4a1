use crate::core::models::membrane::{CandidateGeometry, Membrane, MembraneFrame, MembraneKind};
use crate::core::models::region::RegionSegment;
use crate::core::models::structure::{ProteinType, Structure};
use crate::engine::config::{MembraneSearchConfig, RegionConfig};
use crate::engine::error::EngineError;
use crate::engine::optimizer::Optimizer;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::selection::select_chains;
use crate::engine::sides::SideDetector;
use nalgebra::{Unit, Vector3};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Branch switches of a detection run.
#[derive(Debug, Clone, Default)]
pub struct DetectionOptions {
    /// Search spherical shells instead of flat slabs.
    pub force_curved: bool,
    /// Commit at most one membrane; with a known normal, skip the sweep.
    pub force_single_membrane: bool,
    pub skip_symmetry: bool,
    pub skip_annotation: bool,
    /// Candidate rotational axes from an external symmetry analysis.
    pub symmetry_axes: Vec<Vector3<f64>>,
    /// A membrane normal already known to the caller.
    pub membrane_normal: Option<Vector3<f64>>,
}

#[derive(Debug, Clone, Default)]
pub struct DetectionConfig {
    pub search: MembraneSearchConfig,
    pub regions: RegionConfig,
    pub options: DetectionOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub name: String,
    pub transmembrane: bool,
    pub protein_type: ProteinType,
    pub q_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameReport>,
    pub membranes: Vec<MembraneReport>,
    pub chains: Vec<ChainReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MembraneReport {
    pub kind: MembraneKind,
    pub normal: [f64; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    pub half_thickness: f64,
    pub q_value: f64,
}

/// Row-major rotation and the translation applied before it.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub rotation: [[f64; 3]; 3],
    pub translation: [f64; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub id: String,
    pub num_tm: usize,
    pub transmembrane: bool,
    pub segments: Vec<RegionSegment>,
}

impl DetectionReport {
    pub fn from_structure(structure: &Structure) -> Self {
        Self {
            name: structure.name.clone(),
            transmembrane: structure.transmembrane,
            protein_type: structure.protein_type,
            q_value: structure.q_value,
            frame: structure.frame.as_ref().map(FrameReport::from),
            membranes: structure.membranes.iter().map(MembraneReport::from).collect(),
            chains: structure
                .chains_iter()
                .map(|(_, chain)| ChainReport {
                    id: chain.id.clone(),
                    num_tm: chain.num_tm,
                    transmembrane: chain.transmembrane,
                    segments: chain.regions.clone(),
                })
                .collect(),
        }
    }
}

impl From<&Membrane> for MembraneReport {
    fn from(membrane: &Membrane) -> Self {
        let normal = membrane.geometry.normal();
        let mut report = Self {
            kind: membrane.kind(),
            normal: [normal.x, normal.y, normal.z],
            origin: None,
            offset: None,
            center: None,
            radius: None,
            half_thickness: membrane.half_thickness,
            q_value: membrane.q_value,
        };
        match &membrane.geometry {
            CandidateGeometry::Planar { origin, offset, .. } => {
                report.origin = Some([origin.x, origin.y, origin.z]);
                report.offset = Some(*offset);
            }
            CandidateGeometry::Curved { center, radius, .. } => {
                report.center = Some([center.x, center.y, center.z]);
                report.radius = Some(*radius);
            }
        }
        report
    }
}

impl From<&MembraneFrame> for FrameReport {
    fn from(frame: &MembraneFrame) -> Self {
        let m = frame.rotation.matrix();
        Self {
            rotation: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
            translation: [frame.translation.x, frame.translation.y, frame.translation.z],
        }
    }
}

/// Runs membrane detection on `structure` and writes the result back onto it.
///
/// Prior membranes, region labels and chain selection are discarded first,
/// so a structure can be run again with another configuration. A structure with
/// no usable protein chain ends as [`ProteinType::NoProtein`]; one where no
/// candidate succeeds ends as [`ProteinType::Soluble`]. Neither is an error.
///
/// # Errors
///
/// Returns [`EngineError::Config`] for an invalid search configuration and
/// [`EngineError::InvalidInput`] for a zero-length known membrane normal.
#[instrument(skip_all, name = "detection_workflow", fields(structure = %structure.name))]
pub fn run(
    structure: &mut Structure,
    config: &DetectionConfig,
    reporter: &ProgressReporter,
) -> Result<DetectionReport, EngineError> {
    config.search.validate()?;
    let options = &config.options;
    let known_normal = options
        .membrane_normal
        .map(|normal| {
            Unit::try_new(normal, 1e-8).ok_or_else(|| {
                EngineError::InvalidInput("known membrane normal has zero length".to_string())
            })
        })
        .transpose()?;
    structure.reset_membranes();
    structure.reset_selection();

    // === Phase 1: Chain selection ===
    reporter.report(Progress::PhaseStart { name: "Selection" });
    let selected = select_chains(structure, config.search.min_residues_in_chain);
    reporter.report(Progress::PhaseFinish);

    if selected == 0 || structure.selected_residues().next().is_none() {
        info!("No protein chain passed selection; structure is not a membrane protein.");
        structure.protein_type = ProteinType::NoProtein;
        return Ok(DetectionReport::from_structure(structure));
    }
    if structure.secondary_elements().is_empty() {
        let derived = structure.derive_secondary_elements();
        debug!(elements = derived, "Secondary-structure elements derived from residue classes.");
    }

    let kind = if options.force_curved {
        MembraneKind::Curved
    } else {
        MembraneKind::Planar
    };
    let mut optimizer = Optimizer::new(structure, kind, &config.search)?;
    info!(chains = selected, kind = ?kind, "Starting membrane search.");

    // === Phase 2: Symmetry-seeded pass ===
    if !options.skip_symmetry && !options.symmetry_axes.is_empty() {
        reporter.report(Progress::PhaseStart { name: "Symmetry Axes" });
        optimizer.clear();
        for axis in &options.symmetry_axes {
            match Unit::try_new(*axis, 1e-8) {
                Some(normal) => {
                    optimizer.set_normal(normal);
                    optimizer.test_membrane_normal();
                }
                None => warn!(?axis, "Skipping zero-length symmetry axis."),
            }
        }
        reporter.report(Progress::PhaseFinish);
        if optimizer.is_transmembrane() {
            info!(q = optimizer.best_q(), "Symmetry axis accepted as membrane normal.");
        }
    }

    // === Phase 3: Known normal or exhaustive sweep ===
    if !optimizer.is_transmembrane() {
        optimizer.clear();
        match known_normal.filter(|_| options.force_single_membrane) {
            Some(normal) => {
                reporter.report(Progress::PhaseStart { name: "Known Normal" });
                optimizer.set_normal(normal);
                optimizer.test_membrane_normal();
            }
            None => {
                reporter.report(Progress::PhaseStart { name: "Normal Search" });
                optimizer.search_for_membrane_normal(reporter);
            }
        }
        reporter.report(Progress::PhaseFinish);
    }

    // === Phase 4: Commit and annotate ===
    if optimizer.set_membranes_to_structure(structure, options.force_single_membrane) {
        if options.skip_annotation {
            structure.protein_type = ProteinType::Mixed;
        } else {
            reporter.report(Progress::PhaseStart { name: "Annotation" });
            let assignment = SideDetector::assign(structure)?;
            SideDetector::annotate(structure, assignment, &config.regions);
            reporter.report(Progress::PhaseFinish);
        }
    } else {
        structure.protein_type = ProteinType::Soluble;
        structure.q_value = optimizer.best_q();
        info!("No membrane-like placement found; structure is soluble.");
    }

    info!(
        transmembrane = structure.transmembrane,
        membranes = structure.membranes.len(),
        q = structure.q_value,
        protein_type = ?structure.protein_type,
        "Detection complete."
    );
    Ok(DetectionReport::from_structure(structure))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::region::RegionType;
    use crate::engine::config::ConfigError;
    use crate::engine::fixtures;
    use std::sync::Mutex;

    fn config() -> DetectionConfig {
        DetectionConfig {
            search: MembraneSearchConfig::builder()
                .angular_resolution(0.3)
                .build()
                .unwrap(),
            ..DetectionConfig::default()
        }
    }

    fn seeded(axis: Vector3<f64>) -> DetectionConfig {
        let mut config = config();
        config.options.symmetry_axes = vec![axis];
        config
    }

    #[test]
    fn helix_bundle_is_alpha_helical_with_one_membrane() {
        let mut structure = fixtures::helix_bundle();
        let report = run(&mut structure, &config(), &ProgressReporter::new()).unwrap();

        assert!(report.transmembrane);
        assert_eq!(report.protein_type, ProteinType::AlphaHelical);
        assert_eq!(report.membranes.len(), 1);
        let membrane = &report.membranes[0];
        assert_eq!(membrane.kind, MembraneKind::Planar);
        let normal = Vector3::from(membrane.normal);
        assert!(normal.angle(&Vector3::z()) < 0.2);
        assert!((membrane.half_thickness - 15.0).abs() <= 2.0);
        assert!(report.q_value >= 60.0);
        assert!(report.frame.is_some());
        assert_eq!(report.chains.len(), 6);
        assert!(report.chains.iter().all(|chain| chain.num_tm == 1 && chain.transmembrane));
    }

    #[test]
    fn globular_structure_is_soluble() {
        let mut structure = fixtures::globular_coil();
        let report = run(&mut structure, &config(), &ProgressReporter::new()).unwrap();

        assert!(!report.transmembrane);
        assert_eq!(report.protein_type, ProteinType::Soluble);
        assert!(report.membranes.is_empty());
        assert!(report.frame.is_none());
        assert!(report.chains.iter().all(|chain| chain.segments.is_empty()));
    }

    #[test]
    fn curved_shell_recovers_finite_radius_from_symmetry_axis() {
        let mut structure = fixtures::curved_cap();
        let mut config = seeded(Vector3::z());
        config.options.force_curved = true;
        let report = run(&mut structure, &config, &ProgressReporter::new()).unwrap();

        assert!(report.transmembrane);
        let membrane = &report.membranes[0];
        assert_eq!(membrane.kind, MembraneKind::Curved);
        let radius = membrane.radius.unwrap();
        assert!((70.0..=130.0).contains(&radius), "radius {radius}");
        assert!(membrane.offset.is_none());

        assert_eq!(report.protein_type, ProteinType::AlphaHelical);
        assert_eq!(report.chains.len(), 61);
        for chain in &report.chains {
            assert_eq!(chain.num_tm, 1);
            let regions: Vec<RegionType> = chain.segments.iter().map(|s| s.region).collect();
            assert_eq!(
                regions,
                vec![RegionType::Side2, RegionType::Membrane, RegionType::Side1]
            );
        }
    }

    #[test]
    fn double_membrane_yields_inter_membrane_segments() {
        let mut structure = fixtures::double_bundle();
        let report = run(&mut structure, &seeded(Vector3::z()), &ProgressReporter::new()).unwrap();

        assert_eq!(report.membranes.len(), 2);
        assert!(report.chains.iter().all(|chain| chain.num_tm == 1));
        assert!(
            report
                .chains
                .iter()
                .flat_map(|chain| &chain.segments)
                .any(|segment| segment.region == RegionType::InterMembrane)
        );
    }

    #[test]
    fn forced_single_with_known_normal_skips_the_sweep() {
        let mut structure = fixtures::double_bundle();
        let mut config = config();
        config.options.force_single_membrane = true;
        config.options.membrane_normal = Some(Vector3::new(0.0, 0.0, 2.0));
        let phases = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::PhaseStart { name } = event {
                phases.lock().unwrap().push(name);
            }
        }));

        let report = run(&mut structure, &config, &reporter).unwrap();
        drop(reporter);

        assert_eq!(report.membranes.len(), 1);
        let phases = phases.into_inner().unwrap();
        assert!(phases.contains(&"Known Normal"));
        assert!(!phases.contains(&"Normal Search"));
    }

    #[test]
    fn skipped_annotation_leaves_regions_empty() {
        let mut structure = fixtures::helix_bundle();
        let mut config = seeded(Vector3::z());
        config.options.skip_annotation = true;
        let report = run(&mut structure, &config, &ProgressReporter::new()).unwrap();

        assert!(report.transmembrane);
        assert_eq!(report.protein_type, ProteinType::Mixed);
        assert!(report.chains.iter().all(|chain| chain.segments.is_empty() && chain.num_tm == 0));
    }

    #[test]
    fn structure_without_protein_chains_short_circuits() {
        let mut structure = fixtures::helix_bundle();
        let mut config = config();
        config.search.min_residues_in_chain = 1000;
        let report = run(&mut structure, &config, &ProgressReporter::new()).unwrap();

        assert_eq!(report.protein_type, ProteinType::NoProtein);
        assert!(!report.transmembrane);
        assert_eq!(report.q_value, 0.0);
    }

    #[test]
    fn rerun_discards_previous_result() {
        let mut structure = fixtures::helix_bundle();
        let config = seeded(Vector3::z());
        let first = run(&mut structure, &config, &ProgressReporter::new()).unwrap();
        let second = run(&mut structure, &config, &ProgressReporter::new()).unwrap();
        assert_eq!(first.membranes.len(), second.membranes.len());
        assert_eq!(first.q_value, second.q_value);
        assert_eq!(structure.membranes.len(), 1);
    }

    #[test]
    fn rerun_starts_from_a_full_selection() {
        let mut structure = fixtures::helix_bundle();
        let mut strict = config();
        strict.search.min_residues_in_chain = 1000;
        let first = run(&mut structure, &strict, &ProgressReporter::new()).unwrap();
        assert_eq!(first.protein_type, ProteinType::NoProtein);

        let second = run(&mut structure, &seeded(Vector3::z()), &ProgressReporter::new()).unwrap();
        assert!(second.transmembrane);
        assert_eq!(second.protein_type, ProteinType::AlphaHelical);
        assert_eq!(second.chains.len(), 6);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let mut structure = fixtures::helix_bundle();
        let mut config = config();
        config.options.membrane_normal = Some(Vector3::zeros());
        assert!(matches!(
            run(&mut structure, &config, &ProgressReporter::new()),
            Err(EngineError::InvalidInput(_))
        ));

        let mut config = DetectionConfig::default();
        config.search.slice_width = 0.0;
        assert!(matches!(
            run(&mut structure, &config, &ProgressReporter::new()),
            Err(EngineError::Config {
                source: ConfigError::InvalidParameter { name: "slice_width", .. }
            })
        ));
    }

    #[test]
    fn report_serializes_segments_with_region_names() {
        let mut structure = fixtures::helix_bundle();
        let report = run(&mut structure, &seeded(Vector3::z()), &ProgressReporter::new()).unwrap();
        let segment = &report.chains[0].segments[1];
        assert_eq!(segment.region, RegionType::Membrane);
        assert_eq!(segment.len(), 21);
    }
}
