use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::config;

#[derive(Parser, Debug)]
#[command(
    name = "ga4-extract",
    about = "Pull per-day GA4 page-path reports for configured path patterns into one CSV file",
    version,
    long_about = None
)]
pub struct Args {
    /// GA4 property identifier (numeric)
    #[arg(long, env = "GA4_PROPERTY_ID")]
    pub property_id: Option<String>,

    /// Path to the service-account key file
    #[arg(short, long, env = "GOOGLE_APPLICATION_CREDENTIALS", default_value = config::DEFAULT_CREDENTIALS_FILE)]
    pub credentials: PathBuf,

    /// Output CSV file (recreated on every run)
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Path to custom path pattern file
    #[arg(short, long)]
    pub patterns: Option<PathBuf>,

    /// First day of the window, as days before today
    #[arg(long, default_value_t = config::DEFAULT_LOWER_DAYS_AGO)]
    pub from_days_ago: u32,

    /// Last day of the window, as days before today
    #[arg(long, default_value_t = config::DEFAULT_UPPER_DAYS_AGO)]
    pub to_days_ago: u32,

    /// Explicit first day (YYYY-MM-DD); requires --end-date
    #[arg(long, requires = "end_date")]
    pub start_date: Option<NaiveDate>,

    /// Explicit last day (YYYY-MM-DD); requires --start-date
    #[arg(long, requires = "start_date")]
    pub end_date: Option<NaiveDate>,

    /// Dimensions to request, comma separated
    #[arg(long, value_delimiter = ',')]
    pub dimensions: Vec<String>,

    /// Metrics to request, comma separated
    #[arg(long, value_delimiter = ',')]
    pub metrics: Vec<String>,

    /// Rows requested per page
    #[arg(long, default_value_t = config::DEFAULT_PAGE_SIZE)]
    pub page_size: u64,

    /// Pause after every request, in milliseconds
    #[arg(long, default_value_t = config::DEFAULT_REQUEST_DELAY_MS)]
    pub delay_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Initialize path_patterns.txt with default patterns
    #[arg(long)]
    pub init: bool,
}
