use crate::report::Report;
use std::collections::BTreeMap;

pub struct PrometheusExporter;

impl PrometheusExporter {
    /// Text exposition with one gauge family per `(metric, operator, stat)` and
    /// one sample per workload.
    pub fn format(report: &Report) -> String {
        let mut families: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (record, metric, operator, index) in report.entries() {
            let stats = [
                ("min", index.min),
                ("max", index.max),
                ("mean", index.mean),
                ("std", index.std),
            ];
            for (stat, value) in stats {
                let name = format!(
                    "analyze_{}_{}_{}",
                    sanitize(metric),
                    sanitize(operator),
                    stat
                );
                families.entry(name.clone()).or_default().push(format!(
                    "{}{{workload=\"{}\"}} {}",
                    name,
                    escape_label(&record.workload),
                    value
                ));
            }
        }

        let mut out = String::new();
        for (name, samples) in families {
            out.push_str(&format!("# TYPE {} gauge\n", name));
            for sample in samples {
                out.push_str(&sample);
                out.push('\n');
            }
        }
        out
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Index, Record};

    fn record(workload: &str, data: Vec<f64>) -> Record {
        let mut record = Record::new(workload, "0", "60");
        record
            .metrics
            .entry("tikv-cpu".into())
            .or_default()
            .insert("mean".into(), Index::summarize(data, "0", "60").unwrap());
        record
    }

    #[test]
    fn test_prometheus_format() {
        let report = Report::new(vec![
            record("tpcc", vec![1.0, 3.0]),
            record("ycsb \"a\"", vec![5.0]),
        ]);
        let text = PrometheusExporter::format(&report);

        assert_eq!(text.matches("# TYPE analyze_tikv_cpu_mean_max gauge").count(), 1);
        assert!(text.contains("analyze_tikv_cpu_mean_max{workload=\"tpcc\"} 3\n"));
        assert!(text.contains("analyze_tikv_cpu_mean_mean{workload=\"tpcc\"} 2\n"));
        assert!(text.contains("analyze_tikv_cpu_mean_min{workload=\"ycsb \\\"a\\\"\"} 5\n"));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("tikv.read-bytes"), "tikv_read_bytes");
        assert_eq!(sanitize("p99"), "p99");
    }
}
