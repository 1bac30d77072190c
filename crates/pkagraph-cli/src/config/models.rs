use pkagraph::pipeline::config::PipelineConfig;
use std::path::PathBuf;

pub struct AppConfig {
    pub output_dir: Option<PathBuf>,
    pub folds: Option<usize>,
    pub pipeline: PipelineConfig,
}
