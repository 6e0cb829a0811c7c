use crate::report::Report;
use anyhow::Result;
use std::path::Path;

pub struct JsonExporter;

impl JsonExporter {
    pub async fn export(report: &Report, path: impl AsRef<Path>) -> Result<()> {
        let json = Self::to_string(report)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn to_string(report: &Report) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}
