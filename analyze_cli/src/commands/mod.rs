pub mod eval;
pub mod list;
pub mod report;
pub mod validate;

use analyze_config::{load_config_from_file, AnalyzeConfig};
use std::path::Path;

/// Loads `path` when given, otherwise the built-in presets.
pub async fn load_config(path: Option<&Path>) -> anyhow::Result<AnalyzeConfig> {
    match path {
        Some(path) => load_config_from_file(path).await,
        None => Ok(AnalyzeConfig::default()),
    }
}
