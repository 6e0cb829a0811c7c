use crate::ui;
use analyze_core::FunctionRegistry;
use anyhow::Result;
use colored::Colorize;

pub async fn execute() -> Result<()> {
    ui::print_header("Available Functions");

    let registry = FunctionRegistry::with_builtins();
    let names = registry.names();

    println!("\nTotal functions: {}\n", names.len());

    for name in names {
        println!("  {} {}", "•".green(), name);
    }

    println!(
        "\n{}",
        "Each reduces a vector to a scalar, or a matrix column-wise to a vector".yellow()
    );

    Ok(())
}
