use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Backend reported failure: {0}")]
    BackendReportedFailure(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Shape mismatch: series {series} has {found} samples, expected {expected}")]
    ShapeMismatch {
        series: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Formula parse error at {position}: {message}")]
    FormulaParseError { position: usize, message: String },

    #[error("Argument not match: {0}")]
    ArgumentNotMatch(String),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),
}

impl AnalyzeError {
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::FormulaParseError {
            position,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
