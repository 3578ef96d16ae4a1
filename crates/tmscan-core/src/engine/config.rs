use crate::core::models::membrane::DEFAULT_HALF_THICKNESS;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Sphere-centre distances tried for every curved candidate normal, in Å.
pub const DEFAULT_RADIUS_LADDER: [f64; 17] = [
    50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 120.0, 140.0, 160.0, 200.0, 250.0, 300.0, 400.0,
    500.0, 750.0, 1000.0, 2000.0,
];

/// Parameters of the candidate search and slice scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct MembraneSearchConfig {
    /// Angular step of the normal sampler, in radians.
    pub angular_resolution: f64,
    /// Width of one distance slice, in Å.
    pub slice_width: f64,
    /// Empty margin added below the lowest and above the highest residue, in Å.
    pub slice_padding: f64,
    /// Half-window (in slices) of the moving average over raw slice sums.
    pub component_smoothing: usize,
    /// Half-window (in slices) of the moving average over slice fitness.
    pub fitness_smoothing: usize,
    pub straight_weight: f64,
    pub apolar_weight: f64,
    pub fitness_scale: f64,
    /// Weight of the secondary-structure-end ratio that damps slice fitness.
    pub ss_end_penalty: f64,
    /// Fraction of the peak fitness a slice must exceed to join a run.
    pub run_relative_threshold: f64,
    /// Absolute fitness floor for run membership.
    pub membrane_q_floor: f64,
    /// Minimum mean run fitness for a successful candidate.
    pub minimum_q: f64,
    pub min_half_thickness: f64,
    pub max_half_thickness: f64,
    /// Half thickness reported when no fit is available.
    pub default_half_thickness: f64,
    pub min_residues_in_range: usize,
    pub min_residues_in_chain: usize,
    /// Candidate sphere-centre distances for curved search, in Å.
    pub radius_ladder: Vec<f64>,
    /// Slices zeroed on both sides of a committed run before looking for another, in Å.
    pub second_membrane_exclusion: f64,
    /// Minimum distance of an extra membrane's centre from the profile ends, in Å.
    pub edge_margin: f64,
    pub max_membranes: usize,
}

impl Default for MembraneSearchConfig {
    fn default() -> Self {
        Self {
            angular_resolution: 0.15,
            slice_width: 1.0,
            slice_padding: 3.0,
            component_smoothing: 1,
            fitness_smoothing: 1,
            straight_weight: 0.5,
            apolar_weight: 0.5,
            fitness_scale: 100.0,
            ss_end_penalty: 0.5,
            run_relative_threshold: 0.5,
            membrane_q_floor: 50.0,
            minimum_q: 60.0,
            min_half_thickness: 6.5,
            max_half_thickness: 20.0,
            default_half_thickness: DEFAULT_HALF_THICKNESS,
            min_residues_in_range: 10,
            min_residues_in_chain: 15,
            radius_ladder: DEFAULT_RADIUS_LADDER.to_vec(),
            second_membrane_exclusion: 40.0,
            edge_margin: 12.0,
            max_membranes: 2,
        }
    }
}

impl MembraneSearchConfig {
    pub fn builder() -> MembraneSearchConfigBuilder {
        MembraneSearchConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name: &'static str, reason: &str| {
            Err(ConfigError::InvalidParameter {
                name,
                reason: reason.to_string(),
            })
        };
        let positive = [
            ("angular_resolution", self.angular_resolution),
            ("slice_width", self.slice_width),
            ("fitness_scale", self.fitness_scale),
            ("min_half_thickness", self.min_half_thickness),
            ("default_half_thickness", self.default_half_thickness),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return invalid(name, "must be a positive finite number");
            }
        }
        let non_negative = [
            ("slice_padding", self.slice_padding),
            ("straight_weight", self.straight_weight),
            ("apolar_weight", self.apolar_weight),
            ("ss_end_penalty", self.ss_end_penalty),
            ("membrane_q_floor", self.membrane_q_floor),
            ("minimum_q", self.minimum_q),
            ("second_membrane_exclusion", self.second_membrane_exclusion),
            ("edge_margin", self.edge_margin),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(name, "must be a non-negative finite number");
            }
        }
        if self.angular_resolution > std::f64::consts::FRAC_PI_2 {
            return invalid("angular_resolution", "must not exceed pi/2");
        }
        if self.straight_weight + self.apolar_weight <= 0.0 {
            return invalid("straight_weight", "straight and apolar weights cannot both be zero");
        }
        if !(0.0..=1.0).contains(&self.run_relative_threshold) {
            return invalid("run_relative_threshold", "must lie within [0, 1]");
        }
        if !(self.max_half_thickness.is_finite() && self.max_half_thickness >= self.min_half_thickness) {
            return invalid("max_half_thickness", "must be at least min_half_thickness");
        }
        if self.radius_ladder.is_empty() {
            return invalid("radius_ladder", "must contain at least one radius");
        }
        if self.radius_ladder.iter().any(|r| !(r.is_finite() && *r > 0.0)) {
            return invalid("radius_ladder", "radii must be positive finite numbers");
        }
        if self.max_membranes == 0 {
            return invalid("max_membranes", "must be at least 1");
        }
        Ok(())
    }
}

/// Which post-processing rules run after raw side labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionRuleKind {
    BoundaryNoise,
    ReentrantLoop,
    TerminalStub,
    InterfacialHelix,
}

/// Parameters of region post-processing.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionConfig {
    pub rules: Vec<RegionRuleKind>,
    /// Membrane runs touching a chain end and shorter than this lose their label.
    pub terminal_stub_length: usize,
    /// Same as `terminal_stub_length`, for strand-dominated runs.
    pub terminal_stub_length_beta: usize,
    pub interfacial_min_length: usize,
    /// Maximum distance from a membrane face for interfacial helix residues, in Å.
    pub interfacial_max_face_distance: f64,
    /// Maximum |cos| between an interfacial helix and the membrane axis.
    pub interfacial_max_axis_cos: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                RegionRuleKind::BoundaryNoise,
                RegionRuleKind::ReentrantLoop,
                RegionRuleKind::TerminalStub,
                RegionRuleKind::InterfacialHelix,
            ],
            terminal_stub_length: 10,
            terminal_stub_length_beta: 5,
            interfacial_min_length: 6,
            interfacial_max_face_distance: 5.0,
            interfacial_max_axis_cos: 0.5,
        }
    }
}

#[derive(Default)]
pub struct MembraneSearchConfigBuilder {
    angular_resolution: Option<f64>,
    slice_width: Option<f64>,
    slice_padding: Option<f64>,
    component_smoothing: Option<usize>,
    fitness_smoothing: Option<usize>,
    straight_weight: Option<f64>,
    apolar_weight: Option<f64>,
    fitness_scale: Option<f64>,
    ss_end_penalty: Option<f64>,
    run_relative_threshold: Option<f64>,
    membrane_q_floor: Option<f64>,
    minimum_q: Option<f64>,
    min_half_thickness: Option<f64>,
    max_half_thickness: Option<f64>,
    min_residues_in_range: Option<usize>,
    min_residues_in_chain: Option<usize>,
    radius_ladder: Option<Vec<f64>>,
    second_membrane_exclusion: Option<f64>,
    edge_margin: Option<f64>,
    max_membranes: Option<usize>,
}

impl MembraneSearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn angular_resolution(mut self, radians: f64) -> Self {
        self.angular_resolution = Some(radians);
        self
    }
    pub fn slice_width(mut self, width: f64) -> Self {
        self.slice_width = Some(width);
        self
    }
    pub fn slice_padding(mut self, padding: f64) -> Self {
        self.slice_padding = Some(padding);
        self
    }
    pub fn component_smoothing(mut self, half_window: usize) -> Self {
        self.component_smoothing = Some(half_window);
        self
    }
    pub fn fitness_smoothing(mut self, half_window: usize) -> Self {
        self.fitness_smoothing = Some(half_window);
        self
    }
    pub fn straight_weight(mut self, weight: f64) -> Self {
        self.straight_weight = Some(weight);
        self
    }
    pub fn apolar_weight(mut self, weight: f64) -> Self {
        self.apolar_weight = Some(weight);
        self
    }
    pub fn fitness_scale(mut self, scale: f64) -> Self {
        self.fitness_scale = Some(scale);
        self
    }
    pub fn ss_end_penalty(mut self, penalty: f64) -> Self {
        self.ss_end_penalty = Some(penalty);
        self
    }
    pub fn run_relative_threshold(mut self, fraction: f64) -> Self {
        self.run_relative_threshold = Some(fraction);
        self
    }
    pub fn membrane_q_floor(mut self, floor: f64) -> Self {
        self.membrane_q_floor = Some(floor);
        self
    }
    pub fn minimum_q(mut self, q: f64) -> Self {
        self.minimum_q = Some(q);
        self
    }
    pub fn min_half_thickness(mut self, value: f64) -> Self {
        self.min_half_thickness = Some(value);
        self
    }
    pub fn max_half_thickness(mut self, value: f64) -> Self {
        self.max_half_thickness = Some(value);
        self
    }
    pub fn min_residues_in_range(mut self, count: usize) -> Self {
        self.min_residues_in_range = Some(count);
        self
    }
    pub fn min_residues_in_chain(mut self, count: usize) -> Self {
        self.min_residues_in_chain = Some(count);
        self
    }
    pub fn radius_ladder(mut self, radii: Vec<f64>) -> Self {
        self.radius_ladder = Some(radii);
        self
    }
    pub fn second_membrane_exclusion(mut self, distance: f64) -> Self {
        self.second_membrane_exclusion = Some(distance);
        self
    }
    pub fn edge_margin(mut self, distance: f64) -> Self {
        self.edge_margin = Some(distance);
        self
    }
    pub fn max_membranes(mut self, count: usize) -> Self {
        self.max_membranes = Some(count);
        self
    }

    /// Fills unset fields from the defaults and validates the result.
    pub fn build(self) -> Result<MembraneSearchConfig, ConfigError> {
        let d = MembraneSearchConfig::default();
        let config = MembraneSearchConfig {
            angular_resolution: self.angular_resolution.unwrap_or(d.angular_resolution),
            slice_width: self.slice_width.unwrap_or(d.slice_width),
            slice_padding: self.slice_padding.unwrap_or(d.slice_padding),
            component_smoothing: self.component_smoothing.unwrap_or(d.component_smoothing),
            fitness_smoothing: self.fitness_smoothing.unwrap_or(d.fitness_smoothing),
            straight_weight: self.straight_weight.unwrap_or(d.straight_weight),
            apolar_weight: self.apolar_weight.unwrap_or(d.apolar_weight),
            fitness_scale: self.fitness_scale.unwrap_or(d.fitness_scale),
            ss_end_penalty: self.ss_end_penalty.unwrap_or(d.ss_end_penalty),
            run_relative_threshold: self
                .run_relative_threshold
                .unwrap_or(d.run_relative_threshold),
            membrane_q_floor: self.membrane_q_floor.unwrap_or(d.membrane_q_floor),
            minimum_q: self.minimum_q.unwrap_or(d.minimum_q),
            min_half_thickness: self.min_half_thickness.unwrap_or(d.min_half_thickness),
            max_half_thickness: self.max_half_thickness.unwrap_or(d.max_half_thickness),
            default_half_thickness: d.default_half_thickness,
            min_residues_in_range: self.min_residues_in_range.unwrap_or(d.min_residues_in_range),
            min_residues_in_chain: self.min_residues_in_chain.unwrap_or(d.min_residues_in_chain),
            radius_ladder: self.radius_ladder.unwrap_or(d.radius_ladder),
            second_membrane_exclusion: self
                .second_membrane_exclusion
                .unwrap_or(d.second_membrane_exclusion),
            edge_margin: self.edge_margin.unwrap_or(d.edge_margin),
            max_membranes: self.max_membranes.unwrap_or(d.max_membranes),
        };
        config.validate()?;
        Ok(config)
    }
}
