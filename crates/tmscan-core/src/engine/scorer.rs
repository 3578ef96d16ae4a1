use super::cache::{DistanceCache, SearchSpace};
use super::config::MembraneSearchConfig;
use crate::core::models::membrane::CandidateGeometry;
use tracing::trace;

/// Denominators below this value make a slice ratio zero.
const RATIO_EPSILON: f64 = 1e-5;

/// Smoothed fitness along the distance axis of one candidate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceProfile {
    /// Raw distance of the lower edge of slice 0.
    pub lower: f64,
    pub width: f64,
    pub fitness: Vec<f64>,
}

impl SliceProfile {
    pub fn len(&self) -> usize {
        self.fitness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fitness.is_empty()
    }

    /// Raw distance of the upper edge of the last slice.
    pub fn upper(&self) -> f64 {
        self.lower + self.fitness.len() as f64 * self.width
    }

    fn slice_of(&self, distance: f64) -> usize {
        let index = ((distance - self.lower) / self.width).floor();
        (index.max(0.0) as usize).min(self.fitness.len().saturating_sub(1))
    }
}

/// A fitted membrane band inside a slice profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunFit {
    /// First and last slice (inclusive) of the qualifying run.
    pub start: usize,
    pub end: usize,
    /// Raw distance of the band's mid-surface.
    pub centre: f64,
    pub half_thickness: f64,
    /// Mean smoothed fitness over the slices inside the fitted band.
    pub q_value: f64,
}

/// Outcome of scoring one candidate geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    /// The candidate with its shift moved to the fitted mid-surface.
    pub geometry: CandidateGeometry,
    pub half_thickness: f64,
    /// Mean fitness of the run; zero unless `success`.
    pub q_value: f64,
    pub success: bool,
    pub profile: SliceProfile,
    pub run: Option<RunFit>,
}

impl CandidateScore {
    fn failure(geometry: &CandidateGeometry, config: &MembraneSearchConfig) -> Self {
        Self {
            geometry: geometry.clone(),
            half_thickness: config.default_half_thickness,
            q_value: 0.0,
            success: false,
            profile: SliceProfile::default(),
            run: None,
        }
    }
}

/// Buckets residues into slices along a candidate axis and rates how
/// membrane-like each slice looks.
#[derive(Debug, Clone, Copy)]
pub struct SliceScorer<'a> {
    config: &'a MembraneSearchConfig,
}

impl<'a> SliceScorer<'a> {
    pub fn new(config: &'a MembraneSearchConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, geometry: &CandidateGeometry, space: &SearchSpace) -> CandidateScore {
        let cache = DistanceCache::compute(space, geometry);
        let Some(profile) = self.profile(space, &cache) else {
            return CandidateScore::failure(geometry, self.config);
        };

        let fit = longest_run(&profile.fitness, self.threshold(&profile.fitness))
            .and_then(|(start, end)| self.fit_boundaries(&profile, start, end, &cache.distances));

        match fit {
            Some(run) => {
                trace!(
                    centre = run.centre,
                    half_thickness = run.half_thickness,
                    q = run.q_value,
                    "Candidate accepted."
                );
                CandidateScore {
                    geometry: geometry.with_shift(run.centre),
                    half_thickness: run.half_thickness,
                    q_value: run.q_value,
                    success: true,
                    profile,
                    run: Some(run),
                }
            }
            None => CandidateScore {
                profile,
                ..CandidateScore::failure(geometry, self.config)
            },
        }
    }

    /// Looks for a further membrane band in a successful candidate's profile.
    ///
    /// The committed run and `second_membrane_exclusion` on each side are
    /// blanked; the longest remaining run must pass the usual acceptance rules
    /// and keep its centre `edge_margin` away from both profile ends.
    pub fn residual_run(&self, score: &CandidateScore, space: &SearchSpace) -> Option<RunFit> {
        let committed = score.run?;
        let profile = &score.profile;
        let margin = (self.config.second_membrane_exclusion / profile.width).ceil() as usize;
        let blank_from = committed.start.saturating_sub(margin);
        let blank_to = (committed.end + margin).min(profile.len().saturating_sub(1));

        let mut fitness = profile.fitness.clone();
        for value in &mut fitness[blank_from..=blank_to] {
            *value = 0.0;
        }

        let (start, end) = longest_run(&fitness, self.threshold(&fitness))?;
        let cache = DistanceCache::compute(space, &score.geometry);
        let run = self.fit_boundaries(profile, start, end, &cache.distances)?;

        let edge = self.config.edge_margin;
        if run.centre - profile.lower < edge || profile.upper() - run.centre < edge {
            trace!(centre = run.centre, "Residual run rejected at profile edge.");
            return None;
        }
        Some(run)
    }

    fn profile(&self, space: &SearchSpace, cache: &DistanceCache) -> Option<SliceProfile> {
        let config = self.config;
        let (min, max) = cache
            .distances
            .iter()
            .fold(None, |range: Option<(f64, f64)>, &d| match range {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })?;
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }

        let width = config.slice_width;
        let lower = min - config.slice_padding;
        let count = ((max + config.slice_padding - lower) / width).floor() as usize + 1;
        let mut profile = SliceProfile {
            lower,
            width,
            fitness: vec![0.0; count],
        };

        let mut ca = vec![0.0; count];
        let mut straight = vec![0.0; count];
        let mut surface = vec![0.0; count];
        let mut apolar = vec![0.0; count];
        let mut ends = vec![0.0; count];

        for (index, (residue, &distance)) in space.residues.iter().zip(&cache.distances).enumerate() {
            let slice = profile.slice_of(distance);
            ca[slice] += 1.0;
            straight[slice] += cache.residue_straightness(space, index);
            surface[slice] += residue.surface;
            apolar[slice] += residue.apolar;
        }
        for &(begin, end) in &cache.element_ends {
            ends[profile.slice_of(begin)] += 1.0;
            ends[profile.slice_of(end)] += 1.0;
        }

        let half = config.component_smoothing;
        let (ca, straight, surface, apolar, ends) = (
            window_sum(&ca, half),
            window_sum(&straight, half),
            window_sum(&surface, half),
            window_sum(&apolar, half),
            window_sum(&ends, half),
        );

        let raw: Vec<f64> = (0..count)
            .map(|i| {
                let straight_ratio = ratio(straight[i], ca[i]);
                let apolar_ratio = ratio(apolar[i], surface[i]);
                let end_ratio = ratio(ends[i], ca[i]);
                config.fitness_scale
                    * (config.straight_weight * straight_ratio + config.apolar_weight * apolar_ratio)
                    * (1.0 - config.ss_end_penalty * end_ratio).max(0.0)
            })
            .collect();
        profile.fitness = moving_average(&raw, config.fitness_smoothing);
        Some(profile)
    }

    fn threshold(&self, fitness: &[f64]) -> f64 {
        let peak = fitness.iter().copied().fold(0.0, f64::max);
        self.config
            .membrane_q_floor
            .max(self.config.run_relative_threshold * peak)
    }

    /// Turns a qualifying run into a mid-surface and half thickness.
    ///
    /// Runs wider than `max_half_thickness` are trimmed symmetrically around
    /// their centre and Q is the mean over the slices left inside the band.
    /// The fit fails when the band is too thin, its Q is below `minimum_q`,
    /// or too few residues fall inside it.
    fn fit_boundaries(
        &self,
        profile: &SliceProfile,
        start: usize,
        end: usize,
        distances: &[f64],
    ) -> Option<RunFit> {
        let config = self.config;
        let lower = profile.lower + start as f64 * profile.width;
        let upper = profile.lower + (end + 1) as f64 * profile.width;
        let centre = 0.5 * (lower + upper);
        let half_thickness = (0.5 * (upper - lower)).min(config.max_half_thickness);

        let run_width = (end + 1 - start) as f64 * profile.width;
        let trim = (((run_width - 2.0 * half_thickness) / (2.0 * profile.width)).floor() as usize)
            .min((end - start) / 2);
        let band = &profile.fitness[start + trim..=end - trim];
        let q_value = band.iter().sum::<f64>() / band.len() as f64;

        let in_range = distances
            .iter()
            .filter(|&&d| (d - centre).abs() <= half_thickness)
            .count();

        if half_thickness < config.min_half_thickness
            || q_value < config.minimum_q
            || in_range < config.min_residues_in_range
        {
            trace!(half_thickness, q_value, in_range, "Run rejected.");
            return None;
        }

        Some(RunFit {
            start,
            end,
            centre,
            half_thickness,
            q_value,
        })
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator < RATIO_EPSILON {
        0.0
    } else {
        (numerator / denominator).min(1.0)
    }
}

fn window_sum(values: &[f64], half: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let from = i.saturating_sub(half);
            let to = (i + half).min(values.len() - 1);
            values[from..=to].iter().sum()
        })
        .collect()
}

fn moving_average(values: &[f64], half: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let from = i.saturating_sub(half);
            let to = (i + half).min(values.len() - 1);
            values[from..=to].iter().sum::<f64>() / (to + 1 - from) as f64
        })
        .collect()
}

/// Longest run of values strictly above `threshold`; the earliest wins ties.
fn longest_run(values: &[f64], threshold: f64) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut start = None;
    for (i, &value) in values.iter().enumerate() {
        match (value > threshold, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if best.is_none_or(|(bs, be)| i - s > be + 1 - bs) {
                    best = Some((s, i - 1));
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        let end = values.len() - 1;
        if best.is_none_or(|(bs, be)| end + 1 - s > be + 1 - bs) {
            best = Some((s, end));
        }
    }
    best
}
