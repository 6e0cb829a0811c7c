use super::load_config;
use analyze_core::FunctionRegistry;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub struct EvalArgs {
    pub metric_query: String,
    pub formula: String,
    pub param: String,
    pub start: Option<String>,
    pub end: String,
    pub config: Option<PathBuf>,
    pub prometheus: Option<String>,
}

pub async fn execute(args: EvalArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref()).await?;
    if let Some(address) = args.prometheus {
        config.prometheus.address = address;
    }
    debug!("Evaluating against {}", config.prometheus.address);

    let evaluator = config.build_evaluator(Arc::new(FunctionRegistry::with_builtins()))?;
    let value = evaluator
        .apply(
            args.start.as_deref(),
            &args.end,
            &args.param,
            &args.metric_query,
            &args.formula,
        )
        .await?;

    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}
