use crate::report::Report;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Workload")]
    workload: String,
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Operator")]
    operator: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Std")]
    std: String,
    #[tabled(rename = "Samples")]
    samples: usize,
}

/// Terminal rendering of a report.
pub struct TableExporter;

impl TableExporter {
    pub fn format(report: &Report) -> String {
        let rows: Vec<Row> = report
            .entries()
            .map(|(record, metric, operator, index)| Row {
                workload: record.workload.clone(),
                metric: metric.to_string(),
                operator: operator.to_string(),
                min: format!("{:.4}", index.min),
                max: format!("{:.4}", index.max),
                mean: format!("{:.4}", index.mean),
                std: format!("{:.4}", index.std),
                samples: index.data.len(),
            })
            .collect();

        Table::new(rows).with(Style::modern()).to_string()
    }
}
