use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::path::Path;
use tracing::error;

use ga4_extract::{job, patterns, utils, Args, ExtractConfig};

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);

    if args.init {
        return patterns::init_default_patterns(Path::new(patterns::DEFAULT_PATTERNS_FILE));
    }

    let config = ExtractConfig::from_args(&args, Local::now().date_naive())?;
    let path_patterns = patterns::load_path_patterns(args.patterns.as_deref())?;

    match job::run_extraction(&config, &path_patterns) {
        Ok(summary) => {
            job::print_run_summary(&summary, &config);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Extraction failed");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
