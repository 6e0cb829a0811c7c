use analyze_core::{
    formula, ExpressionEvaluator, FunctionRegistry, PrometheusSource, SamplePolicy,
    DEFAULT_LOOKBACK, DEFAULT_STEP,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_ADDRESS: &str = "http://127.0.0.1:9090";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Name bound to the placeholder when operator templates are validated.
const VALIDATION_PARAM: &str = "metric";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeConfig {
    #[serde(default)]
    pub prometheus: PrometheusConfig,
    /// Metric name to range query.
    #[serde(default = "default_metrics")]
    pub metrics: BTreeMap<String, String>,
    /// Operator name to formula template; `%s` stands for the metric name.
    #[serde(default = "default_operators")]
    pub operators: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(with = "humantime_serde", default = "default_step")]
    pub step: Duration,
    #[serde(with = "humantime_serde", default = "default_lookback")]
    pub lookback: Duration,
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
    #[serde(default)]
    pub sample_policy: SamplePolicy,
}

/// TOML files keep everything under an `[analyze]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub analyze: AnalyzeConfig,
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_step() -> Duration {
    DEFAULT_STEP
}

fn default_lookback() -> Duration {
    DEFAULT_LOOKBACK
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

pub fn default_metrics() -> BTreeMap<String, String> {
    [
        (
            "tikv_cpu",
            "sum(rate(tikv_thread_cpu_seconds_total{}[1m])) by (instance)",
        ),
        (
            "tikv_write",
            r#"sum(rate(tikv_engine_flow_bytes{ db="kv", type="wal_file_bytes"}[1m])) by (instance)"#,
        ),
        (
            "tikv_read",
            r#"sum(rate(tikv_engine_flow_bytes{ db="kv", type=~"bytes_read|iter_bytes_read"}[1m])) by (instance)"#,
        ),
    ]
    .into_iter()
    .map(|(name, query)| (name.to_string(), query.to_string()))
    .collect()
}

pub fn default_operators() -> BTreeMap<String, String> {
    [("mean", "mean(%s)"), ("std", "std(%s)")]
        .into_iter()
        .map(|(name, template)| (name.to_string(), template.to_string()))
        .collect()
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            step: DEFAULT_STEP,
            lookback: DEFAULT_LOOKBACK,
            timeout: DEFAULT_TIMEOUT,
            sample_policy: SamplePolicy::default(),
        }
    }
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            prometheus: PrometheusConfig::default(),
            metrics: default_metrics(),
            operators: default_operators(),
        }
    }
}

impl AnalyzeConfig {
    /// Validates against the built-in functions.
    pub fn validate(&self) -> Result<(), String> {
        self.validate_with(&FunctionRegistry::with_builtins())
    }

    /// Validates settings and checks that every operator only calls functions
    /// `registry` provides.
    pub fn validate_with(&self, registry: &FunctionRegistry) -> Result<(), String> {
        let prometheus = &self.prometheus;
        if prometheus.address.trim().is_empty() {
            return Err("Prometheus address cannot be empty".to_string());
        }
        if prometheus.step.is_zero() {
            return Err("Prometheus step must be > 0".to_string());
        }
        if prometheus.lookback.is_zero() {
            return Err("Lookback must be > 0".to_string());
        }
        if prometheus.timeout.is_zero() {
            return Err("Timeout must be > 0".to_string());
        }

        if self.metrics.is_empty() {
            return Err("At least one metric must be configured".to_string());
        }
        for (name, query) in &self.metrics {
            if query.trim().is_empty() {
                return Err(format!("Metric '{}' has an empty query", name));
            }
        }

        if self.operators.is_empty() {
            return Err("At least one operator must be configured".to_string());
        }
        for (name, template) in &self.operators {
            let expr = formula::parse(&formula::expand(template, VALIDATION_PARAM))
                .map_err(|e| format!("Operator '{}' is invalid: {}", name, e))?;
            if let Some(param) = expr.params().into_iter().find(|p| *p != VALIDATION_PARAM) {
                return Err(format!(
                    "Operator '{}' references '{}'; use %s for the metric",
                    name, param
                ));
            }
            if let Some(function) = expr.functions().into_iter().find(|f| !registry.contains(f)) {
                return Err(format!(
                    "Operator '{}' calls unknown function '{}'",
                    name, function
                ));
            };
        }

        Ok(())
    }

    pub fn build_source(&self) -> analyze_core::Result<PrometheusSource> {
        PrometheusSource::new(&self.prometheus.address)
            .with_policy(self.prometheus.sample_policy)
            .with_timeout(self.prometheus.timeout)
    }

    pub fn build_evaluator(
        &self,
        registry: Arc<FunctionRegistry>,
    ) -> analyze_core::Result<ExpressionEvaluator> {
        let source = self.build_source()?;
        Ok(ExpressionEvaluator::new(Arc::new(source), registry)
            .with_lookback(self.prometheus.lookback)
            .with_step(self.prometheus.step))
    }
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
