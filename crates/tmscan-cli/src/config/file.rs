use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tmscan::engine::config::RegionRuleKind;
use tracing::debug;

/// Contents of a `tmscan` TOML configuration file; every key is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub search: Option<FileSearchConfig>,
    pub scoring: Option<FileScoringConfig>,
    pub membrane: Option<FileMembraneConfig>,
    pub regions: Option<FileRegionConfig>,
    pub symmetry: Option<FileSymmetryConfig>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSearchConfig {
    pub angular_resolution: Option<f64>,
    pub slice_width: Option<f64>,
    pub slice_padding: Option<f64>,
    pub component_smoothing: Option<usize>,
    pub fitness_smoothing: Option<usize>,
    pub min_residues_in_chain: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileScoringConfig {
    pub straight_weight: Option<f64>,
    pub apolar_weight: Option<f64>,
    pub fitness_scale: Option<f64>,
    pub ss_end_penalty: Option<f64>,
    pub run_relative_threshold: Option<f64>,
    pub membrane_q_floor: Option<f64>,
    pub minimum_q: Option<f64>,
    pub min_residues_in_range: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileMembraneConfig {
    pub min_half_thickness: Option<f64>,
    pub max_half_thickness: Option<f64>,
    pub radius_ladder: Option<Vec<f64>>,
    pub second_membrane_exclusion: Option<f64>,
    pub edge_margin: Option<f64>,
    pub max_membranes: Option<usize>,
    pub force_curved: Option<bool>,
    pub force_single: Option<bool>,
    pub normal: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileRegionConfig {
    pub rules: Option<Vec<FileRegionRule>>,
    pub terminal_stub_length: Option<usize>,
    pub terminal_stub_length_beta: Option<usize>,
    pub interfacial_min_length: Option<usize>,
    pub interfacial_max_face_distance: Option<f64>,
    pub interfacial_max_axis_cos: Option<f64>,
    pub skip: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileRegionRule {
    BoundaryNoise,
    ReentrantLoop,
    TerminalStub,
    InterfacialHelix,
}

impl FromStr for FileRegionRule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "boundary-noise" => Ok(Self::BoundaryNoise),
            "reentrant-loop" => Ok(Self::ReentrantLoop),
            "terminal-stub" => Ok(Self::TerminalStub),
            "interfacial-helix" => Ok(Self::InterfacialHelix),
            _ => Err(format!("unknown region rule '{s}'")),
        }
    }
}

impl From<FileRegionRule> for RegionRuleKind {
    fn from(rule: FileRegionRule) -> Self {
        match rule {
            FileRegionRule::BoundaryNoise => RegionRuleKind::BoundaryNoise,
            FileRegionRule::ReentrantLoop => RegionRuleKind::ReentrantLoop,
            FileRegionRule::TerminalStub => RegionRuleKind::TerminalStub,
            FileRegionRule::InterfacialHelix => RegionRuleKind::InterfacialHelix,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSymmetryConfig {
    pub skip: Option<bool>,
    pub axes: Option<Vec<[f64; 3]>>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration file {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::file_parsing(path, e))?;
        toml::from_str(&content).map_err(|e| CliError::file_parsing(path, e))
    }
}
