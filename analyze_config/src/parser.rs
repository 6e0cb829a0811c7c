use crate::config::{AnalyzeConfig, ConfigFile};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

pub async fn load_config_from_file(path: impl AsRef<Path>) -> Result<AnalyzeConfig> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config {}", path.display()))?;

    let extension = path.extension().and_then(|s| s.to_str());
    debug!("Loading config {} ({:?})", path.display(), extension);

    match extension {
        Some("yaml") | Some("yml") => parse_yaml(&contents),
        Some("toml") => parse_toml(&contents),
        Some("json") => parse_json(&contents),
        _ => Err(anyhow::anyhow!(
            "Unsupported file format. Use .yaml, .yml, .toml, or .json"
        )),
    }
}

pub fn parse_config_from_str(content: &str, format: &str) -> Result<AnalyzeConfig> {
    match format.to_lowercase().as_str() {
        "yaml" | "yml" => parse_yaml(content),
        "toml" => parse_toml(content),
        "json" => parse_json(content),
        _ => Err(anyhow::anyhow!("Unsupported format: {}", format)),
    }
}

fn parse_yaml(content: &str) -> Result<AnalyzeConfig> {
    let config: AnalyzeConfig = serde_yaml::from_str(content)?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(config)
}

fn parse_toml(content: &str) -> Result<AnalyzeConfig> {
    let file: ConfigFile = toml::from_str(content)?;
    file.analyze.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(file.analyze)
}

fn parse_json(content: &str) -> Result<AnalyzeConfig> {
    let config: AnalyzeConfig = serde_json::from_str(content)?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(config)
}
