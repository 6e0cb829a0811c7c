use crate::record::{Index, Record};
use analyze_config::AnalyzeConfig;
use analyze_core::{ExpressionEvaluator, FunctionRegistry};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs every configured operator over every configured metric for a record's
/// time range.
pub struct RecordAnalyzer {
    evaluator: ExpressionEvaluator,
    metrics: BTreeMap<String, String>,
    operators: BTreeMap<String, String>,
}

impl RecordAnalyzer {
    pub fn new(
        evaluator: ExpressionEvaluator,
        metrics: BTreeMap<String, String>,
        operators: BTreeMap<String, String>,
    ) -> Self {
        Self {
            evaluator,
            metrics,
            operators,
        }
    }

    pub fn from_config(
        config: &AnalyzeConfig,
        registry: Arc<FunctionRegistry>,
    ) -> anyhow::Result<Self> {
        config
            .validate_with(&registry)
            .map_err(|e| anyhow::anyhow!(e))?;
        let evaluator = config.build_evaluator(registry)?;
        Ok(Self::new(
            evaluator,
            config.metrics.clone(),
            config.operators.clone(),
        ))
    }

    /// Replaces `record.metrics` with a fresh `[metric][operator]` table.
    pub async fn analyze(&self, record: &mut Record) -> anyhow::Result<()> {
        info!(
            "Analyzing workload '{}' [{}, {})",
            record.workload, record.start_ts, record.end_ts
        );

        let mut table = BTreeMap::new();
        for (name, query) in &self.metrics {
            let mut by_operator = BTreeMap::new();
            for (operator, template) in &self.operators {
                let value = self
                    .evaluator
                    .apply(
                        Some(record.start_ts.as_str()),
                        &record.end_ts,
                        name,
                        query,
                        template,
                    )
                    .await
                    .map_err(|e| anyhow::anyhow!("{} {}: {}", name, operator, e))?;

                let shape = value.shape();
                let data = value.into_vector().ok_or_else(|| {
                    anyhow::anyhow!(
                        "{} {}: expected a vector result, got a {}",
                        name,
                        operator,
                        shape
                    )
                })?;

                match Index::summarize(data, &record.start_ts, &record.end_ts) {
                    Some(index) => {
                        by_operator.insert(operator.clone(), index);
                    }
                    None => warn!("{} {}: no samples in range, skipping", name, operator),
                }
            }
            table.insert(name.clone(), by_operator);
        }

        record.metrics = table;
        Ok(())
    }

    /// Analyzes records in order, stopping at the first failure.
    pub async fn analyze_all(&self, records: &mut [Record]) -> anyhow::Result<()> {
        for record in records.iter_mut() {
            self.analyze(record).await?;
        }
        info!("Analyzed {} records", records.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyze_core::{async_trait, Matrix, QueryWindow, SeriesSource};

    /// Serves five series `[1, 2, 3, 4]` for every query.
    struct StaticSource;

    #[async_trait]
    impl SeriesSource for StaticSource {
        async fn fetch(
            &self,
            _metrics: &str,
            _window: &QueryWindow,
        ) -> analyze_core::Result<Matrix> {
            Ok(vec![vec![1.0, 2.0, 3.0, 4.0]; 5])
        }
    }

    fn analyzer(operators: &[(&str, &str)]) -> RecordAnalyzer {
        let metrics = [(
            "store_available".to_string(),
            "pd_scheduler_store_status".to_string(),
        )]
        .into_iter()
        .collect();
        let operators = operators
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RecordAnalyzer::new(
            ExpressionEvaluator::with_defaults(Arc::new(StaticSource)),
            metrics,
            operators,
        )
    }

    #[tokio::test]
    async fn test_analyze_record() {
        let analyzer = analyzer(&[("mean", "mean(%s)"), ("std", "std(%s)")]);
        let mut record = Record::new("tpcc", "1630381080", "1630386080");

        analyzer.analyze(&mut record).await.unwrap();

        let mean = record.index("store_available", "mean").unwrap();
        assert_eq!(mean.data, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(mean.max, 4.0);
        assert_eq!(mean.min, 1.0);
        assert_eq!(mean.mean, 2.5);

        let std = record.index("store_available", "std").unwrap();
        assert_eq!(std.data, vec![0.0; 4]);
        assert_eq!(std.max, 0.0);
    }

    #[tokio::test]
    async fn test_scalar_operator_is_rejected() {
        let analyzer = analyzer(&[("peak", "max(mean(%s))")]);
        let mut record = Record::new("tpcc", "", "1630386080");

        let err = analyzer.analyze(&mut record).await.unwrap_err();
        assert!(err.to_string().contains("expected a vector"));
    }

    #[tokio::test]
    async fn test_analyze_all_stops_on_error() {
        let analyzer = analyzer(&[("mean", "mean(%s)")]);
        let mut records = vec![
            Record::new("ok", "", "1630386080"),
            Record::new("bad", "", "not-a-timestamp"),
        ];

        let err = analyzer.analyze_all(&mut records).await.unwrap_err();
        assert!(err.to_string().contains("Invalid window"));
        assert!(records[0].index("store_available", "mean").is_some());
    }
}
