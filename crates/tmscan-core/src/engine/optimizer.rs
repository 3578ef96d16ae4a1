use super::cache::SearchSpace;
use super::config::MembraneSearchConfig;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::sampler::{Coverage, NormalSampler};
use super::scorer::{CandidateScore, SliceScorer};
use super::state::{BestCandidate, OptimizerState};
use crate::core::models::membrane::{CandidateGeometry, Membrane, MembraneFrame, MembraneKind};
use crate::core::models::structure::Structure;
use nalgebra::{Unit, Vector3};
use tracing::{debug, info, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Searches candidate normals for the best-fitting membrane of one shape.
pub struct Optimizer<'a> {
    config: &'a MembraneSearchConfig,
    kind: MembraneKind,
    space: SearchSpace,
    seeds: Vec<Unit<Vector3<f64>>>,
    state: OptimizerState,
    best: Option<BestCandidate>,
}

impl<'a> Optimizer<'a> {
    pub fn new(
        structure: &Structure,
        kind: MembraneKind,
        config: &'a MembraneSearchConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            kind,
            space: SearchSpace::build(structure)?,
            seeds: Vec::new(),
            state: OptimizerState::Idle,
            best: None,
        })
    }

    pub fn clear(&mut self) {
        self.seeds.clear();
        self.best = None;
        self.state = OptimizerState::Idle;
    }

    /// Seeds a single candidate normal; curved search also tries its negation.
    pub fn set_normal(&mut self, normal: Unit<Vector3<f64>>) {
        self.seeds.clear();
        self.seeds.push(normal);
        if self.kind == MembraneKind::Curved {
            self.seeds.push(-normal);
        }
        self.state = OptimizerState::Sweeping;
    }

    #[instrument(skip_all, name = "test_membrane_normal", fields(kind = ?self.kind))]
    pub fn test_membrane_normal(&mut self) -> bool {
        self.state = OptimizerState::Sweeping;
        let seeds = std::mem::take(&mut self.seeds);
        for normal in seeds {
            let score = self.evaluate(&normal);
            trace!(normal = ?normal.into_inner(), q = score.q_value, "Seeded candidate evaluated.");
            self.consider(normal, score, None);
        }
        self.finish()
    }

    #[instrument(skip_all, name = "membrane_normal_search", fields(kind = ?self.kind))]
    pub fn search_for_membrane_normal(&mut self, reporter: &ProgressReporter) -> bool {
        self.state = OptimizerState::Sweeping;
        let coverage = match self.kind {
            MembraneKind::Planar => Coverage::Hemisphere,
            MembraneKind::Curved => Coverage::Sphere,
        };
        let normals: Vec<_> = NormalSampler::new(self.config.angular_resolution, coverage).collect();
        debug!(candidates = normals.len(), "Starting exhaustive normal sweep.");

        reporter.report(Progress::TaskStart {
            total_steps: normals.len() as u64,
        });

        #[cfg(not(feature = "parallel"))]
        let iterator = normals.iter();

        #[cfg(feature = "parallel")]
        let iterator = normals.par_iter();

        let scores: Vec<CandidateScore> = iterator
            .map(|normal| {
                let score = self.evaluate(normal);
                reporter.report(Progress::TaskIncrement);
                score
            })
            .collect();

        reporter.report(Progress::TaskFinish);

        for (normal, score) in normals.into_iter().zip(scores) {
            self.consider(normal, score, Some(reporter));
        }
        self.finish()
    }

    pub fn kind(&self) -> MembraneKind {
        self.kind
    }

    pub fn state(&self) -> OptimizerState {
        self.state
    }

    pub fn best(&self) -> Option<&BestCandidate> {
        self.best.as_ref()
    }

    pub fn best_normal(&self) -> Option<Unit<Vector3<f64>>> {
        self.best.as_ref().map(|best| best.normal)
    }

    pub fn best_q(&self) -> f64 {
        self.best.as_ref().map_or(0.0, |best| best.score.q_value)
    }

    pub fn is_transmembrane(&self) -> bool {
        self.state == OptimizerState::Converged
    }

    /// Writes the best candidate into the structure as one or two membranes.
    #[instrument(skip_all, name = "commit_membranes")]
    pub fn set_membranes_to_structure(&self, structure: &mut Structure, force_single: bool) -> bool {
        let Some(best) = self.best.as_ref().filter(|_| self.is_transmembrane()) else {
            return false;
        };
        let score = &best.score;

        structure.membranes.clear();
        structure.membranes.push(Membrane {
            geometry: score.geometry.clone(),
            half_thickness: score.half_thickness,
            q_value: score.q_value,
        });

        if !force_single && self.config.max_membranes > 1 {
            let scorer = SliceScorer::new(self.config);
            if let Some(run) = scorer.residual_run(score, &self.space) {
                debug!(
                    centre = run.centre,
                    half_thickness = run.half_thickness,
                    q = run.q_value,
                    "Second membrane found in residual profile."
                );
                structure.membranes.push(Membrane {
                    geometry: score.geometry.with_shift(run.centre),
                    half_thickness: run.half_thickness,
                    q_value: run.q_value,
                });
            }
        }

        structure.q_value = score.q_value;
        structure.transmembrane = true;
        structure.frame = Some(MembraneFrame::new(&best.normal, &score.geometry.anchor()));
        info!(
            membranes = structure.membranes.len(),
            q = score.q_value,
            kind = ?self.kind,
            "Membrane committed."
        );
        true
    }

    fn evaluate(&self, normal: &Unit<Vector3<f64>>) -> CandidateScore {
        let scorer = SliceScorer::new(self.config);
        let centre = self.space.mass_centre;
        match self.kind {
            MembraneKind::Planar => {
                scorer.score(&CandidateGeometry::planar(*normal, centre), &self.space)
            }
            MembraneKind::Curved => {
                let mut best: Option<CandidateScore> = None;
                for &distance in &self.config.radius_ladder {
                    let geometry = CandidateGeometry::curved(*normal, centre, distance);
                    let score = scorer.score(&geometry, &self.space);
                    let better = match &best {
                        None => true,
                        Some(current) => score.success && (!current.success || score.q_value > current.q_value),
                    };
                    if better {
                        best = Some(score);
                    }
                }
                best.unwrap_or_else(|| {
                    scorer.score(&CandidateGeometry::curved(*normal, centre, 0.0), &self.space)
                })
            }
        }
    }

    fn consider(
        &mut self,
        normal: Unit<Vector3<f64>>,
        score: CandidateScore,
        reporter: Option<&ProgressReporter>,
    ) {
        if BestCandidate::improves_on(&score, self.best.as_ref()) {
            if let Some(reporter) = reporter {
                reporter.report(Progress::BestImproved {
                    q_value: score.q_value,
                });
            }
            self.best = Some(BestCandidate { normal, score });
        }
    }

    fn finish(&mut self) -> bool {
        self.state = if self.best.is_some() {
            OptimizerState::Converged
        } else {
            OptimizerState::Failed
        };
        debug!(state = ?self.state, q = self.best_q(), "Optimizer pass finished.");
        self.is_transmembrane()
    }
}
