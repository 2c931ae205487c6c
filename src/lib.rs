pub mod args;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod job;
pub mod patterns;
pub mod report;
pub mod sink;
pub mod stats;
pub mod utils;
pub mod window;

pub use args::Args;
pub use config::ExtractConfig;
pub use error::ExtractError;
pub use extractor::{run, ExtractPlan, FixedDelay, Pacer};
pub use filter::{build_match_filter, MatchFilter};
pub use job::run_extraction;
pub use patterns::init_default_patterns;
pub use report::{ReportClient, ReportRequest, ReportResponse};
pub use sink::{CsvFileSink, OutputSink};
pub use stats::{PageProgress, RunSummary};
pub use window::DateWindow;
