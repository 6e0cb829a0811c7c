pub mod analyzer;
pub mod exporters;
pub mod record;
pub mod report;

pub use analyzer::RecordAnalyzer;
pub use record::{parse_records, read_records, Index, Record};
pub use report::Report;
