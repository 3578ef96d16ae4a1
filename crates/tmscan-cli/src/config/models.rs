use std::path::PathBuf;
use tmscan::workflows::detect::DetectionConfig;

/// Fully merged settings of one `detect` invocation.
pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub regions_path: Option<PathBuf>,
    pub detection: DetectionConfig,
}
