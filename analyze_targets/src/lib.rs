pub mod common;
pub mod fake_prometheus;

pub use common::HealthStatus;
pub use fake_prometheus::{Behavior, FakePrometheus, FakeSeries, RangeRequest};
