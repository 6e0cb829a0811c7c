use crate::ui;
use analyze_config::load_config_from_file;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub async fn execute(config_file: PathBuf) -> Result<()> {
    ui::print_header("Validating Config");
    println!("File: {}", config_file.display());

    match load_config_from_file(&config_file).await {
        Ok(config) => {
            println!();
            ui::print_success("Config is valid!");

            let prometheus = &config.prometheus;
            println!("\nPrometheus:");
            println!("  Address: {}", prometheus.address);
            println!("  Step: {:?}", prometheus.step);
            println!("  Lookback: {:?}", prometheus.lookback);
            println!("  Timeout: {:?}", prometheus.timeout);
            println!("  Sample policy: {:?}", prometheus.sample_policy);

            println!("\nMetrics ({}):", config.metrics.len());
            for (name, query) in &config.metrics {
                println!("  {} {}", name.cyan(), query);
            }

            println!("\nOperators ({}):", config.operators.len());
            for (name, template) in &config.operators {
                println!("  {} {}", name.cyan(), template);
            }

            Ok(())
        }
        Err(e) => {
            println!();
            ui::print_error("Config is invalid!");
            println!("\nError: {:#}", e);
            Err(e)
        }
    }
}
