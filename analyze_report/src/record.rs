use analyze_core::functions::stats;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One benchmark run: the workload, its time range and the statistics
/// gathered for it, keyed by metric then operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub workload: String,
    #[serde(default)]
    pub start_ts: String,
    pub end_ts: String,
    #[serde(default)]
    pub bench_cmd: String,
    #[serde(default)]
    pub metrics: BTreeMap<String, BTreeMap<String, Index>>,
}

/// Summary of the vector an operator produced for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub data: Vec<f64>,
    pub start_ts: String,
    pub end_ts: String,
}

impl Index {
    /// Returns `None` for an empty vector.
    pub fn summarize(data: Vec<f64>, start_ts: &str, end_ts: &str) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        Some(Self {
            min: stats::min(&data),
            max: stats::max(&data),
            mean: stats::mean(&data),
            std: stats::std(&data),
            data,
            start_ts: start_ts.to_string(),
            end_ts: end_ts.to_string(),
        })
    }
}

impl Record {
    pub fn new(
        workload: impl Into<String>,
        start_ts: impl Into<String>,
        end_ts: impl Into<String>,
    ) -> Self {
        Self {
            workload: workload.into(),
            start_ts: start_ts.into(),
            end_ts: end_ts.into(),
            ..Default::default()
        }
    }

    pub fn index(&self, metric: &str, operator: &str) -> Option<&Index> {
        self.metrics.get(metric)?.get(operator)
    }
}

/// Parses newline-delimited JSON records. Blank lines are skipped.
pub fn parse_records(content: &str) -> Result<Vec<Record>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("invalid record on line {}", i + 1))
        })
        .collect()
}

pub async fn read_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read records from {}", path.display()))?;
    parse_records(&content)
}
