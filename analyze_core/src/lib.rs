pub mod error;
pub mod evaluator;
pub mod formula;
pub mod functions;
pub mod source;
pub mod value;
pub mod window;

pub use error::{AnalyzeError, Result};
pub use evaluator::{extract_metrics, ExpressionEvaluator};
pub use functions::{DynFunction, Function, FunctionRegistry, FunctionRegistryBuilder};
pub use source::{PrometheusSource, SamplePolicy, SeriesSource};
pub use value::{Matrix, Series, Value};
pub use window::{QueryWindow, DEFAULT_LOOKBACK, DEFAULT_STEP};

// Re-export commonly used types
pub use async_trait::async_trait;
