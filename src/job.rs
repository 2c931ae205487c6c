use anyhow::Result;
use std::time::Instant;
use tracing::info;

use crate::auth::{ServiceAccountAuth, ServiceAccountKey};
use crate::client::{build_agent, Ga4Client};
use crate::config::ExtractConfig;
use crate::extractor::{self, ExtractPlan, FixedDelay};
use crate::filter::build_match_filter;
use crate::sink::CsvFileSink;
use crate::stats::RunSummary;

/// Resolves credentials and the filter, then runs the day-paginated extraction
/// into the configured CSV file. Configuration problems surface before any request.
pub fn run_extraction(config: &ExtractConfig, patterns: &[String]) -> Result<RunSummary> {
    let total_start_time = Instant::now();
    info!(
        action = "start",
        component = "job",
        output = ?config.output_path,
        "Starting GA4 extraction"
    );

    let filter = build_match_filter(patterns)?;
    let plan = ExtractPlan {
        property_id: config.property_id.clone(),
        window: config.window,
        filter,
        dimensions: config.dimensions.clone(),
        metrics: config.metrics.clone(),
        page_size: config.page_size,
    };
    plan.validate()?;

    let key = ServiceAccountKey::from_file(&config.credentials_path)?;
    let agent = build_agent();
    let auth = ServiceAccountAuth::new(key, agent.clone())?;
    let mut client = Ga4Client::new(agent, auth)?;
    let mut sink = CsvFileSink::new(&config.output_path);
    let mut pacer = FixedDelay(config.request_delay);

    let summary = extractor::run(&plan, &mut client, &mut sink, &mut pacer, |progress| {
        println!("{progress}")
    })?;

    info!(
        action = "complete",
        component = "job",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Extraction finished"
    );
    Ok(summary)
}

pub fn print_run_summary(summary: &RunSummary, config: &ExtractConfig) {
    println!("\n--- GA4 Extraction ---");
    println!(
        "Date range: {} to {} ({} days processed)",
        config.window.lower(),
        config.window.upper(),
        summary.days_processed
    );
    println!(
        "Pages requested: {}",
        crate::utils::format_number(summary.pages_requested as u64)
    );
    println!(
        "Rows written: {}",
        crate::utils::format_number(summary.rows_written)
    );
    println!("Output: {}", config.output_path.display());
}
