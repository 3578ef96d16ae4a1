use super::file::{
    FileConfig, FileMembraneConfig, FileRegionConfig, FileRegionRule, FileScoringConfig,
    FileSearchConfig, FileSymmetryConfig,
};
use super::models::AppConfig;
use crate::cli::DetectArgs;
use crate::error::{CliError, Result};
use crate::utils::parser::{self, ParseError};
use nalgebra::Vector3;
use tmscan::engine::config::{MembraneSearchConfig, MembraneSearchConfigBuilder, RegionConfig};
use tmscan::workflows::detect::{DetectionConfig, DetectionOptions};
use tracing::debug;

/// Merges defaults, the config file, `-S` assignments and CLI flags, in
/// increasing order of precedence.
pub fn build_config(args: &DetectArgs) -> Result<AppConfig> {
    let file_config = match &args.config {
        Some(config_path) => FileConfig::from_file(config_path)?,
        None => FileConfig::default(),
    };
    let file_config = apply_set_values(file_config, &args.set_values)?;
    debug!(?file_config, "Configuration file merged with --set values.");

    let search_file = file_config.search.unwrap_or_default();
    let scoring_file = file_config.scoring.unwrap_or_default();
    let membrane_file = file_config.membrane.unwrap_or_default();
    let regions_file = file_config.regions.unwrap_or_default();
    let symmetry_file = file_config.symmetry.unwrap_or_default();

    let search = build_search_config(
        args.angular_resolution.or(search_file.angular_resolution),
        &search_file,
        &scoring_file,
        &membrane_file,
    )?;
    let regions = build_region_config(&regions_file);

    let mut symmetry_axes: Vec<Vector3<f64>> = symmetry_file
        .axes
        .unwrap_or_default()
        .into_iter()
        .map(Vector3::from)
        .collect();
    symmetry_axes.extend(args.axes.iter().copied());

    let options = DetectionOptions {
        force_curved: args.force_curved || membrane_file.force_curved.unwrap_or(false),
        force_single_membrane: args.force_single_membrane
            || membrane_file.force_single.unwrap_or(false),
        skip_symmetry: args.no_symmetry || symmetry_file.skip.unwrap_or(false),
        skip_annotation: args.no_annotation || regions_file.skip.unwrap_or(false),
        symmetry_axes,
        membrane_normal: args.normal.or(membrane_file.normal.map(Vector3::from)),
    };

    Ok(AppConfig {
        input_path: args.input.clone(),
        output_path: args.output.clone(),
        regions_path: args.regions_out.clone(),
        detection: DetectionConfig {
            search,
            regions,
            options,
        },
    })
}

fn with<T>(
    builder: MembraneSearchConfigBuilder,
    value: Option<T>,
    setter: fn(MembraneSearchConfigBuilder, T) -> MembraneSearchConfigBuilder,
) -> MembraneSearchConfigBuilder {
    match value {
        Some(value) => setter(builder, value),
        None => builder,
    }
}

fn build_search_config(
    angular_resolution: Option<f64>,
    search: &FileSearchConfig,
    scoring: &FileScoringConfig,
    membrane: &FileMembraneConfig,
) -> Result<MembraneSearchConfig> {
    use MembraneSearchConfigBuilder as B;

    let builder = MembraneSearchConfig::builder();
    let builder = with(builder, angular_resolution, B::angular_resolution);
    let builder = with(builder, search.slice_width, B::slice_width);
    let builder = with(builder, search.slice_padding, B::slice_padding);
    let builder = with(builder, search.component_smoothing, B::component_smoothing);
    let builder = with(builder, search.fitness_smoothing, B::fitness_smoothing);
    let builder = with(builder, search.min_residues_in_chain, B::min_residues_in_chain);

    let builder = with(builder, scoring.straight_weight, B::straight_weight);
    let builder = with(builder, scoring.apolar_weight, B::apolar_weight);
    let builder = with(builder, scoring.fitness_scale, B::fitness_scale);
    let builder = with(builder, scoring.ss_end_penalty, B::ss_end_penalty);
    let builder = with(builder, scoring.run_relative_threshold, B::run_relative_threshold);
    let builder = with(builder, scoring.membrane_q_floor, B::membrane_q_floor);
    let builder = with(builder, scoring.minimum_q, B::minimum_q);
    let builder = with(builder, scoring.min_residues_in_range, B::min_residues_in_range);

    let builder = with(builder, membrane.min_half_thickness, B::min_half_thickness);
    let builder = with(builder, membrane.max_half_thickness, B::max_half_thickness);
    let builder = with(builder, membrane.radius_ladder.clone(), B::radius_ladder);
    let builder = with(builder, membrane.second_membrane_exclusion, B::second_membrane_exclusion);
    let builder = with(builder, membrane.edge_margin, B::edge_margin);
    let builder = with(builder, membrane.max_membranes, B::max_membranes);

    Ok(builder.build()?)
}

fn build_region_config(file: &FileRegionConfig) -> RegionConfig {
    let defaults = RegionConfig::default();
    RegionConfig {
        rules: file
            .rules
            .as_ref()
            .map(|rules| rules.iter().copied().map(Into::into).collect())
            .unwrap_or(defaults.rules),
        terminal_stub_length: file
            .terminal_stub_length
            .unwrap_or(defaults.terminal_stub_length),
        terminal_stub_length_beta: file
            .terminal_stub_length_beta
            .unwrap_or(defaults.terminal_stub_length_beta),
        interfacial_min_length: file
            .interfacial_min_length
            .unwrap_or(defaults.interfacial_min_length),
        interfacial_max_face_distance: file
            .interfacial_max_face_distance
            .unwrap_or(defaults.interfacial_max_face_distance),
        interfacial_max_axis_cos: file
            .interfacial_max_axis_cos
            .unwrap_or(defaults.interfacial_max_axis_cos),
    }
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for assignment in set_values {
        let (key, value) = parser::parse_assignment(assignment)?;
        let Some((table, field)) = key.split_once('.') else {
            return Err(unsupported(key));
        };
        match table {
            "search" => set_search(config.search.get_or_insert_with(Default::default), key, field, value)?,
            "scoring" => set_scoring(config.scoring.get_or_insert_with(Default::default), key, field, value)?,
            "membrane" => set_membrane(config.membrane.get_or_insert_with(Default::default), key, field, value)?,
            "regions" => set_regions(config.regions.get_or_insert_with(Default::default), key, field, value)?,
            "symmetry" => set_symmetry(config.symmetry.get_or_insert_with(Default::default), key, field, value)?,
            _ => return Err(unsupported(key)),
        }
    }
    Ok(config)
}

fn unsupported(key: &str) -> CliError {
    CliError::Config(format!("Unsupported configuration key for --set: '{}'", key))
}

fn set_search(table: &mut FileSearchConfig, key: &str, field: &str, value: &str) -> Result<()> {
    match field {
        "angular-resolution" => table.angular_resolution = Some(parser::parse_value(key, value)?),
        "slice-width" => table.slice_width = Some(parser::parse_value(key, value)?),
        "slice-padding" => table.slice_padding = Some(parser::parse_value(key, value)?),
        "component-smoothing" => table.component_smoothing = Some(parser::parse_value(key, value)?),
        "fitness-smoothing" => table.fitness_smoothing = Some(parser::parse_value(key, value)?),
        "min-residues-in-chain" => table.min_residues_in_chain = Some(parser::parse_value(key, value)?),
        _ => return Err(unsupported(key)),
    }
    Ok(())
}

fn set_scoring(table: &mut FileScoringConfig, key: &str, field: &str, value: &str) -> Result<()> {
    match field {
        "straight-weight" => table.straight_weight = Some(parser::parse_value(key, value)?),
        "apolar-weight" => table.apolar_weight = Some(parser::parse_value(key, value)?),
        "fitness-scale" => table.fitness_scale = Some(parser::parse_value(key, value)?),
        "ss-end-penalty" => table.ss_end_penalty = Some(parser::parse_value(key, value)?),
        "run-relative-threshold" => table.run_relative_threshold = Some(parser::parse_value(key, value)?),
        "membrane-q-floor" => table.membrane_q_floor = Some(parser::parse_value(key, value)?),
        "minimum-q" => table.minimum_q = Some(parser::parse_value(key, value)?),
        "min-residues-in-range" => table.min_residues_in_range = Some(parser::parse_value(key, value)?),
        _ => return Err(unsupported(key)),
    }
    Ok(())
}

fn set_membrane(table: &mut FileMembraneConfig, key: &str, field: &str, value: &str) -> Result<()> {
    match field {
        "min-half-thickness" => table.min_half_thickness = Some(parser::parse_value(key, value)?),
        "max-half-thickness" => table.max_half_thickness = Some(parser::parse_value(key, value)?),
        "radius-ladder" => {
            let radii = value
                .split(',')
                .map(|radius| parser::parse_value(key, radius.trim()))
                .collect::<std::result::Result<Vec<f64>, ParseError>>()?;
            table.radius_ladder = Some(radii);
        }
        "second-membrane-exclusion" => {
            table.second_membrane_exclusion = Some(parser::parse_value(key, value)?)
        }
        "edge-margin" => table.edge_margin = Some(parser::parse_value(key, value)?),
        "max-membranes" => table.max_membranes = Some(parser::parse_value(key, value)?),
        "force-curved" => table.force_curved = Some(parser::parse_value(key, value)?),
        "force-single" => table.force_single = Some(parser::parse_value(key, value)?),
        "normal" => table.normal = Some(parser::parse_vector(value)?.into()),
        _ => return Err(unsupported(key)),
    }
    Ok(())
}

fn set_regions(table: &mut FileRegionConfig, key: &str, field: &str, value: &str) -> Result<()> {
    match field {
        "rules" => {
            let rules = value
                .split(',')
                .map(|rule| parser::parse_value::<FileRegionRule>(key, rule.trim()))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            table.rules = Some(rules);
        }
        "terminal-stub-length" => table.terminal_stub_length = Some(parser::parse_value(key, value)?),
        "terminal-stub-length-beta" => {
            table.terminal_stub_length_beta = Some(parser::parse_value(key, value)?)
        }
        "interfacial-min-length" => table.interfacial_min_length = Some(parser::parse_value(key, value)?),
        "interfacial-max-face-distance" => {
            table.interfacial_max_face_distance = Some(parser::parse_value(key, value)?)
        }
        "interfacial-max-axis-cos" => {
            table.interfacial_max_axis_cos = Some(parser::parse_value(key, value)?)
        }
        "skip" => table.skip = Some(parser::parse_value(key, value)?),
        _ => return Err(unsupported(key)),
    }
    Ok(())
}

fn set_symmetry(table: &mut FileSymmetryConfig, key: &str, field: &str, value: &str) -> Result<()> {
    match field {
        "skip" => table.skip = Some(parser::parse_value(key, value)?),
        _ => return Err(unsupported(key)),
    }
    Ok(())
}
