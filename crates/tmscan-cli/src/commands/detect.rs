use crate::cli::DetectArgs;
use crate::config::{build_config, models::AppConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tmscan::{
    core::io::{atom_table::AtomTableFile, region_table::write_region_segments, traits::StructureFile},
    core::models::structure::Structure,
    engine::progress::ProgressReporter,
    workflows::{self, detect::DetectionReport},
};
use tracing::{info, warn};

pub fn run(args: DetectArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_config(&args)?;
    execute(&app_config, &CliProgressHandler::new())
}

fn execute(app_config: &AppConfig, progress_handler: &CliProgressHandler) -> Result<()> {
    info!("Loading input structure from {:?}", &app_config.input_path);
    let mut structure = AtomTableFile::read_from_path(&app_config.input_path)
        .map_err(|e| CliError::file_parsing(&app_config.input_path, e))?;
    info!(
        chains = structure.chain_ids().len(),
        residues = structure.residue_count(),
        "Structure loaded."
    );

    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    println!("Searching for membrane placement of '{}'...", structure.name);
    let report = workflows::detect::run(&mut structure, &app_config.detection, &reporter)?;

    if report.transmembrane {
        println!(
            "✓ Transmembrane ({:?}), Q = {:.2}, {} membrane(s).",
            report.protein_type,
            report.q_value,
            report.membranes.len()
        );
    } else {
        warn!("No membrane placement passed the quality threshold.");
        println!("Not transmembrane ({:?}), Q = {:.2}.", report.protein_type, report.q_value);
    }

    write_report(&report, &app_config.output_path)?;
    println!("Report written to: {}", app_config.output_path.display());

    if let Some(regions_path) = &app_config.regions_path {
        write_regions(&structure, regions_path)?;
        println!("Region segments written to: {}", regions_path.display());
    }
    Ok(())
}

fn write_report(report: &DetectionReport, path: &Path) -> Result<()> {
    let text = toml::to_string_pretty(report).map_err(|e| CliError::output(path, e))?;
    std::fs::write(path, text).map_err(|e| CliError::output(path, e))
}

fn write_regions(structure: &Structure, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| CliError::output(path, e))?;
    let mut writer = BufWriter::new(file);
    write_region_segments(structure, &mut writer).map_err(|e| CliError::output(path, e))?;
    writer.flush().map_err(|e| CliError::output(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;
    use std::path::PathBuf;
    use tmscan::workflows::detect::DetectionConfig;

    /// Six vertical CA-only chains of a helix bundle spanning z = -27..27.
    fn bundle_table() -> String {
        let mut table = String::from("chain,label_seq,auth_seq,icode,residue,atom,x,y,z,surface,out_surface,ss\n");
        for (c, chain) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
            let angle = c as f64 * std::f64::consts::FRAC_PI_3;
            let (x, y) = (10.0 * angle.cos(), 10.0 * angle.sin());
            for k in 0..37 {
                let helix = (8..=28).contains(&k);
                let (name, ss) = if helix { ("LEU", "H") } else { ("LYS", "-") };
                let z = -27.0 + 1.5 * k as f64;
                writeln!(table, "{chain},{},{},,{name},CA,{x:.3},{y:.3},{z:.3},0,0,{ss}", k + 1, k + 101).unwrap();
            }
        }
        table
    }

    fn app_config(dir: &Path, regions: bool) -> AppConfig {
        let input_path = dir.join("bundle.csv");
        std::fs::write(&input_path, bundle_table()).unwrap();
        let mut detection = DetectionConfig::default();
        detection.options.symmetry_axes = vec![nalgebra::Vector3::z()];
        AppConfig {
            input_path,
            output_path: dir.join("report.toml"),
            regions_path: regions.then(|| dir.join("regions.csv")),
            detection,
        }
    }

    #[test]
    fn detect_writes_report_and_regions() {
        let dir = tempfile::tempdir().unwrap();
        let config = app_config(dir.path(), true);
        execute(&config, &CliProgressHandler::hidden()).expect("detect ok");

        let report = std::fs::read_to_string(&config.output_path).unwrap();
        let value: toml::Value = toml::from_str(&report).unwrap();
        assert_eq!(value["name"].as_str(), Some("bundle"));
        assert_eq!(value["transmembrane"].as_bool(), Some(true));
        assert_eq!(value["protein_type"].as_str(), Some("alpha-helical"));
        assert_eq!(value["membranes"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["membranes"][0]["kind"].as_str(), Some("planar"));
        assert_eq!(value["chains"].as_array().map(Vec::len), Some(6));

        let regions = std::fs::read_to_string(config.regions_path.unwrap()).unwrap();
        let rows: Vec<&str> = regions.lines().collect();
        assert_eq!(rows.len(), 1 + 6 * 3);
        assert!(rows.iter().any(|row| row.starts_with("A,") && row.ends_with(",M")));
    }

    #[test]
    fn missing_input_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = app_config(dir.path(), false);
        config.input_path = PathBuf::from(dir.path().join("missing.csv"));
        assert!(matches!(
            execute(&config, &CliProgressHandler::hidden()),
            Err(CliError::FileParsing { .. })
        ));
        assert!(!config.output_path.exists());
    }

    #[test]
    fn unwritable_output_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = app_config(dir.path(), false);
        config.output_path = dir.path().join("no-such-dir").join("report.toml");
        assert!(matches!(
            execute(&config, &CliProgressHandler::hidden()),
            Err(CliError::Output { .. })
        ));
    }
}
