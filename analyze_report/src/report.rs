use crate::record::{Index, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Analyzed records plus the time the report was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub records: Vec<Record>,
}

impl Report {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            generated_at: Utc::now(),
            records,
        }
    }

    /// Flattens the report to `(record, metric, operator, index)` in map order.
    pub fn entries(&self) -> impl Iterator<Item = (&Record, &str, &str, &Index)> {
        self.records.iter().flat_map(|record| {
            record.metrics.iter().flat_map(move |(metric, by_operator)| {
                by_operator.iter().map(move |(operator, index)| {
                    (record, metric.as_str(), operator.as_str(), index)
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_flattened() {
        let mut record = Record::new("tpcc", "0", "60");
        let index = Index::summarize(vec![1.0, 3.0], "0", "60").unwrap();
        record
            .metrics
            .entry("tikv_cpu".into())
            .or_default()
            .insert("mean".into(), index.clone());
        record
            .metrics
            .entry("tikv_cpu".into())
            .or_default()
            .insert("std".into(), index);

        let report = Report::new(vec![record, Record::new("idle", "0", "60")]);
        let entries: Vec<_> = report
            .entries()
            .map(|(r, m, o, _)| (r.workload.as_str(), m, o))
            .collect();

        assert_eq!(
            entries,
            vec![("tpcc", "tikv_cpu", "mean"), ("tpcc", "tikv_cpu", "std")]
        );
    }
}
