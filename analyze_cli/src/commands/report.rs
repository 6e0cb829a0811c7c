use super::load_config;
use crate::ui;
use analyze_core::FunctionRegistry;
use analyze_report::exporters::{
    JsonExporter, MarkdownExporter, PrometheusExporter, TableExporter,
};
use analyze_report::{read_records, RecordAnalyzer, Report};
use anyhow::Result;
use clap::ValueEnum;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Cli,
    Json,
    Markdown,
    Prometheus,
}

pub async fn execute(
    records_file: PathBuf,
    config: Option<PathBuf>,
    format: ReportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let rendered_to_terminal = format == ReportFormat::Cli && output.is_none();
    if rendered_to_terminal {
        ui::print_header("Benchmark Report");
        ui::print_info(&format!("Records file: {}", records_file.display()));
    }

    let config = load_config(config.as_deref()).await?;
    let mut records = read_records(&records_file).await?;
    let registry = Arc::new(FunctionRegistry::with_builtins());
    let analyzer = RecordAnalyzer::from_config(&config, registry)?;
    analyzer.analyze_all(&mut records).await?;
    let report = Report::new(records);

    match output {
        Some(path) => {
            match format {
                ReportFormat::Json => JsonExporter::export(&report, &path).await?,
                ReportFormat::Markdown => MarkdownExporter::export(&report, &path).await?,
                ReportFormat::Cli => {
                    tokio::fs::write(&path, TableExporter::format(&report)).await?
                }
                ReportFormat::Prometheus => {
                    tokio::fs::write(&path, PrometheusExporter::format(&report)).await?
                }
            }
            ui::print_success(&format!("Report written to {}", path.display()));
        }
        None => {
            let rendered = match format {
                ReportFormat::Cli => TableExporter::format(&report),
                ReportFormat::Json => JsonExporter::to_string(&report)?,
                ReportFormat::Markdown => MarkdownExporter::format(&report),
                ReportFormat::Prometheus => PrometheusExporter::format(&report),
            };
            println!("{}", rendered);
        }
    }

    Ok(())
}
