use crate::report::Report;
use anyhow::Result;
use std::fmt::Write;
use std::path::Path;

pub struct MarkdownExporter;

impl MarkdownExporter {
    pub async fn export(report: &Report, path: impl AsRef<Path>) -> Result<()> {
        let markdown = Self::format(report);
        tokio::fs::write(path, markdown).await?;
        Ok(())
    }

    pub fn format(report: &Report) -> String {
        let mut out = format!(
            "# Benchmark Analysis Report\n\nGenerated at {}\n",
            report.generated_at.to_rfc3339()
        );

        for record in &report.records {
            let _ = write!(
                out,
                "\n## {}\n\n- **Range**: {} .. {}\n",
                record.workload, record.start_ts, record.end_ts
            );
            if !record.bench_cmd.is_empty() {
                let _ = writeln!(out, "- **Command**: `{}`", record.bench_cmd);
            }

            if record.metrics.is_empty() {
                out.push_str("\nNo metrics collected.\n");
                continue;
            }

            out.push_str("\n| Metric | Operator | Min | Max | Mean | Std |\n");
            out.push_str("|--------|----------|-----|-----|------|-----|\n");
            for (metric, by_operator) in &record.metrics {
                for (operator, index) in by_operator {
                    let _ = writeln!(
                        out,
                        "| {} | {} | {:.4} | {:.4} | {:.4} | {:.4} |",
                        metric, operator, index.min, index.max, index.mean, index.std
                    );
                }
            }
        }

        out
    }
}
