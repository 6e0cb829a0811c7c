use crate::{
    error::{AnalyzeError, Result},
    formula::{self, Expr},
    functions::FunctionRegistry,
    source::SeriesSource,
    value::{Matrix, Value},
    window::{QueryWindow, DEFAULT_LOOKBACK, DEFAULT_STEP},
};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info};

/// Fetches a matrix for a metric query and evaluates a formula over it.
pub struct ExpressionEvaluator {
    source: Arc<dyn SeriesSource>,
    registry: Arc<FunctionRegistry>,
    lookback: Duration,
    step: Duration,
}

impl ExpressionEvaluator {
    pub fn new(source: Arc<dyn SeriesSource>, registry: Arc<FunctionRegistry>) -> Self {
        Self {
            source,
            registry,
            lookback: DEFAULT_LOOKBACK,
            step: DEFAULT_STEP,
        }
    }

    pub fn with_defaults(source: Arc<dyn SeriesSource>) -> Self {
        Self::new(source, Arc::new(FunctionRegistry::with_builtins()))
    }

    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Fetches `metrics` over the window, binds the matrix to `name` and
    /// evaluates `formula`. `%s` in the formula stands for `name`.
    ///
    /// The fetch always happens before the formula is parsed.
    pub async fn apply(
        &self,
        start: Option<&str>,
        end: &str,
        name: &str,
        metrics: &str,
        formula: &str,
    ) -> Result<Value> {
        let window = QueryWindow::resolve(start, end, self.lookback)?.with_step(self.step);
        let data = self.source.fetch(metrics, &window).await?;
        info!(
            "Fetched {} series for '{}' over [{}, {})",
            data.len(),
            name,
            window.start,
            window.end
        );

        let formula = formula::expand(formula, name);
        let expr = formula::parse(&formula)?;
        debug!("Parsed formula '{}' into {:?}", formula, expr);

        let binding = Binding { name, data };
        self.eval(&expr, &binding)
    }

    /// Evaluates an already parsed expression against a single bound matrix.
    pub fn evaluate(&self, expr: &Expr, name: &str, data: Matrix) -> Result<Value> {
        self.eval(expr, &Binding { name, data })
    }

    fn eval(&self, expr: &Expr, binding: &Binding<'_>) -> Result<Value> {
        match expr {
            Expr::Number(value) => Ok(Value::Scalar(*value)),
            Expr::Param(param) if param == binding.name => Ok(Value::Matrix(binding.data.clone())),
            Expr::Param(param) => Err(AnalyzeError::UnknownParameter(param.clone())),
            Expr::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, binding))
                    .collect::<Result<Vec<_>>>()?;
                let function = self
                    .registry
                    .get(name)
                    .ok_or_else(|| AnalyzeError::UnknownFunction(name.clone()))?;
                function.call(&args)
            }
        }
    }
}

struct Binding<'a> {
    name: &'a str,
    data: Matrix,
}

fn metrics_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\(([a-zA-Z0-9_,={}']+?)\)").expect("metrics pattern is valid")
    })
}

/// Finds the first parenthesized, comma-separated group of metric names in a
/// command, e.g. `max(mean(cpu,io))` yields `["cpu", "io"]`.
pub fn extract_metrics(command: &str) -> Result<Vec<String>> {
    let captures = metrics_pattern().captures(command).ok_or_else(|| {
        AnalyzeError::ArgumentNotMatch(format!("no metric group found in '{}'", command))
    })?;
    Ok(captures[1].split(',').map(str::to_string).collect())
}
