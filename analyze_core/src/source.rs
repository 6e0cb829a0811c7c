use crate::{
    error::{AnalyzeError, Result},
    value::{Matrix, Series},
    window::QueryWindow,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Path of the range query endpoint, relative to the backend address.
pub const QUERY_RANGE_PATH: &str = "/api/v1/query_range";

const STATUS_SUCCESS: &str = "success";

/// Supplies sample matrices for metric queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Fetch one series per matching label-set for `metrics` over `window`.
    async fn fetch(&self, metrics: &str, window: &QueryWindow) -> Result<Matrix>;
}

/// What to do with a sample value that is not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplePolicy {
    /// Replace it with `0.0` and keep going.
    #[default]
    CoerceZero,
    /// Fail the whole fetch.
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrometheusResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<RangeData>,
    #[serde(default, rename = "errorType")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeData {
    #[serde(default, rename = "resultType")]
    pub result_type: String,
    #[serde(default)]
    pub result: Vec<RangeResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeResult {
    #[serde(default)]
    pub metric: BTreeMap<String, String>,
    #[serde(default)]
    pub values: Vec<(serde_json::Value, serde_json::Value)>,
}

impl RangeData {
    /// Drops timestamps and labels, keeping one series per result entry in
    /// backend order.
    pub fn to_matrix(&self, policy: SamplePolicy) -> Result<Matrix> {
        self.result
            .iter()
            .map(|entry| entry.to_series(policy))
            .collect()
    }
}

impl RangeResult {
    fn to_series(&self, policy: SamplePolicy) -> Result<Series> {
        self.values
            .iter()
            .map(|(_, raw)| parse_sample(raw, policy))
            .collect()
    }
}

fn parse_sample(raw: &serde_json::Value, policy: SamplePolicy) -> Result<f64> {
    let parsed = match raw {
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    };

    match (parsed, policy) {
        (Some(v), _) => Ok(v),
        (None, SamplePolicy::CoerceZero) => {
            warn!("Coercing unparsable sample {} to 0.0", raw);
            Ok(0.0)
        }
        (None, SamplePolicy::Strict) => Err(AnalyzeError::MalformedResponse(format!(
            "unparsable sample value {}",
            raw
        ))),
    }
}

/// Range-query client for a Prometheus compatible backend.
#[derive(Debug, Clone)]
pub struct PrometheusSource {
    address: String,
    policy: SamplePolicy,
    client: reqwest::Client,
}

impl PrometheusSource {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into().trim_end_matches('/').to_string(),
            policy: SamplePolicy::default(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_policy(mut self, policy: SamplePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalyzeError::FetchError(format!("failed to build client: {}", e)))?;
        Ok(self)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn policy(&self) -> SamplePolicy {
        self.policy
    }

    /// Issues the range query and returns the decoded `data` section.
    pub async fn query_range(&self, metrics: &str, window: &QueryWindow) -> Result<RangeData> {
        let url = format!("{}{}", self.address, QUERY_RANGE_PATH);

        info!(
            "Querying {} for '{}' over [{}, {})",
            url, metrics, window.start, window.end
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", metrics.to_string()),
                ("start", window.start.to_string()),
                ("end", window.end.to_string()),
                ("step", window.step_param()),
            ])
            .send()
            .await
            .map_err(|e| AnalyzeError::FetchError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzeError::FetchError(format!(
                "backend returned status {}",
                status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AnalyzeError::FetchError(e.to_string()))?;
        let envelope: PrometheusResponse = serde_json::from_slice(&body)
            .map_err(|e| AnalyzeError::MalformedResponse(e.to_string()))?;

        if envelope.status != STATUS_SUCCESS {
            return Err(AnalyzeError::BackendReportedFailure(format!(
                "status '{}' ({}): {}",
                envelope.status,
                envelope.error_type.as_deref().unwrap_or("unknown"),
                envelope.error.as_deref().unwrap_or("no error message"),
            )));
        }

        let data = envelope.data.unwrap_or_default();
        debug!(
            "Backend returned {} series of type '{}'",
            data.result.len(),
            data.result_type
        );
        Ok(data)
    }
}

#[async_trait]
impl SeriesSource for PrometheusSource {
    async fn fetch(&self, metrics: &str, window: &QueryWindow) -> Result<Matrix> {
        self.query_range(metrics, window)
            .await?
            .to_matrix(self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "status": "success",
        "data": {
            "resultType": "matrix",
            "result": [
                {"metric": {"instance": "a"}, "values": [[1630381080, "1"], [1630381110, "2.5"]]},
                {"metric": {"instance": "b"}, "values": [[1630381080, "oops"]]}
            ]
        }
    }"#;

    #[test]
    fn test_to_matrix_coerces_bad_samples() {
        let envelope: PrometheusResponse = serde_json::from_str(BODY).unwrap();
        let data = envelope.data.unwrap();
        let matrix = data.to_matrix(SamplePolicy::CoerceZero).unwrap();

        assert_eq!(matrix, vec![vec![1.0, 2.5], vec![0.0]]);
        assert_eq!(data.result[0].metric["instance"], "a");
    }

    #[test]
    fn test_to_matrix_strict_rejects_bad_samples() {
        let envelope: PrometheusResponse = serde_json::from_str(BODY).unwrap();
        let err = envelope
            .data
            .unwrap()
            .to_matrix(SamplePolicy::Strict)
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::MalformedResponse(_)));
    }

    #[test]
    fn test_special_float_samples() {
        let raw = serde_json::json!("NaN");
        assert!(parse_sample(&raw, SamplePolicy::Strict).unwrap().is_nan());
        let raw = serde_json::json!("+Inf");
        assert_eq!(
            parse_sample(&raw, SamplePolicy::Strict).unwrap(),
            f64::INFINITY
        );
    }

    #[test]
    fn test_error_envelope_decodes() {
        let body = r#"{"status":"error","errorType":"bad_data","error":"parse error"}"#;
        let envelope: PrometheusResponse = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.status, "error");
        assert!(envelope.data.is_none());
        assert_eq!(envelope.error.as_deref(), Some("parse error"));
    }

    #[test]
    fn test_source_trims_trailing_slash() {
        let source = PrometheusSource::new("http://127.0.0.1:9090/");
        assert_eq!(source.address(), "http://127.0.0.1:9090");
        assert_eq!(source.policy(), SamplePolicy::CoerceZero);
    }
}
