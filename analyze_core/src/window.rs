use crate::error::{AnalyzeError, Result};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lookback used when a query only names its end timestamp.
pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(120);

/// Sampling step sent with every range query.
pub const DEFAULT_STEP: Duration = Duration::from_secs(30);

/// A `[start, end)` range query window in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub start: i64,
    pub end: i64,
    pub step: Duration,
}

impl QueryWindow {
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if start > end {
            return Err(AnalyzeError::InvalidWindow(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self {
            start,
            end,
            step: DEFAULT_STEP,
        })
    }

    /// Builds a window from raw timestamps. A missing or blank start is
    /// derived as `end - lookback`.
    pub fn resolve(start: Option<&str>, end: &str, lookback: Duration) -> Result<Self> {
        let end = parse_timestamp(end)?;
        let start = match start.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_timestamp(raw)?,
            None => i64::try_from(lookback.as_secs())
                .ok()
                .and_then(|secs| end.checked_sub(secs))
                .ok_or_else(|| {
                    AnalyzeError::InvalidWindow(format!(
                        "lookback {}s before {} is out of range",
                        lookback.as_secs(),
                        end
                    ))
                })?,
        };
        Self::new(start, end)
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.end.abs_diff(self.start))
    }

    /// Step in the float-seconds form the range query API accepts.
    pub fn step_param(&self) -> String {
        self.step.as_secs_f64().to_string()
    }
}

/// Parses unix seconds (integer or fractional) or an RFC 3339 timestamp.
pub fn parse_timestamp(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(secs) = raw.parse::<f64>() {
        if secs.is_finite() {
            return Ok(secs.floor() as i64);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp())
        .map_err(|_| AnalyzeError::InvalidWindow(format!("invalid timestamp '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_derives_start_from_lookback() {
        let window = QueryWindow::resolve(None, "1630386080", DEFAULT_LOOKBACK).unwrap();
        assert_eq!(window.end, 1630386080);
        assert_eq!(window.start, 1630386080 - 120);
        assert_eq!(window.step, DEFAULT_STEP);
    }

    #[test]
    fn test_resolve_blank_start_is_missing() {
        let window = QueryWindow::resolve(Some("  "), "1000", DEFAULT_LOOKBACK).unwrap();
        assert_eq!(window.start, 880);
    }

    #[test]
    fn test_resolve_explicit_start() {
        let window =
            QueryWindow::resolve(Some("1630381080"), "1630386080", DEFAULT_LOOKBACK).unwrap();
        assert_eq!(window.start, 1630381080);
        assert_eq!(window.duration(), Duration::from_secs(5000));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("1630381080").unwrap(), 1630381080);
        assert_eq!(parse_timestamp("1630381080.75").unwrap(), 1630381080);
        assert_eq!(parse_timestamp("2021-08-31T03:38:00Z").unwrap(), 1630381080);
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(AnalyzeError::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_lookback_underflow_is_rejected() {
        for end in ["-9223372036854775800", "-1e300"] {
            let err = QueryWindow::resolve(None, end, DEFAULT_LOOKBACK).unwrap_err();
            assert!(matches!(err, AnalyzeError::InvalidWindow(_)), "{}", end);
        }

        let err = QueryWindow::resolve(None, "1000", Duration::from_secs(u64::MAX)).unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidWindow(_)));
    }

    #[test]
    fn test_duration_spans_full_range() {
        let window = QueryWindow::new(i64::MIN, i64::MAX).unwrap();
        assert_eq!(window.duration(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_start_after_end_is_rejected() {
        let err = QueryWindow::resolve(Some("2000"), "1000", DEFAULT_LOOKBACK).unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidWindow(_)));
    }

    #[test]
    fn test_step_param() {
        let window = QueryWindow::new(0, 60).unwrap();
        assert_eq!(window.step_param(), "30");
        let window = window.with_step(Duration::from_millis(1500));
        assert_eq!(window.step_param(), "1.5");
    }
}
