pub mod config;
pub mod parser;

pub use config::{AnalyzeConfig, ConfigFile, PrometheusConfig};
pub use parser::{load_config_from_file, parse_config_from_str};
