use crate::utils::parser::parse_vector;
use clap::{Args, Parser, Subcommand};
use nalgebra::Vector3;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The tmscan developers",
    version,
    about = "tmscan - Locate the membrane around a protein structure and classify residue topology.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for the candidate sweep.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for the membrane placement of an annotated structure and label its residues.
    Detect(DetectArgs),
}

/// Arguments for the `detect` subcommand.
#[derive(Args, Debug)]
pub struct DetectArgs {
    // --- Core Arguments ---
    /// Path to the annotated per-atom structure table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the detection report (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also write the per-chain region segments to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub regions_out: Option<PathBuf>,

    // --- Search Overrides ---
    /// Override the angular resolution of the normal sweep, in radians.
    #[arg(short = 'r', long, value_name = "FLOAT")]
    pub angular_resolution: Option<f64>,

    /// Search spherical shells instead of flat membranes.
    #[arg(long)]
    pub force_curved: bool,

    /// Commit at most one membrane.
    #[arg(long)]
    pub force_single_membrane: bool,

    /// Ignore symmetry axes from the command line and the config file.
    #[arg(long)]
    pub no_symmetry: bool,

    /// Skip residue side detection and region rules.
    #[arg(long)]
    pub no_annotation: bool,

    /// Candidate symmetry axis, tried before the exhaustive sweep.
    /// Can be used multiple times. Example: --axis 0,0,1
    #[arg(long = "axis", value_name = "X,Y,Z", value_parser = parse_vector)]
    pub axes: Vec<Vector3<f64>>,

    /// Known membrane normal, evaluated alone in forced single-membrane mode.
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_vector)]
    pub normal: Option<Vector3<f64>>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S scoring.minimum-q=55
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
