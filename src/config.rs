use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;

use crate::args::Args;
use crate::error::ExtractError;
use crate::report::MAX_PAGE_SIZE;
use crate::window::DateWindow;

pub const DEFAULT_CREDENTIALS_FILE: &str = "ga4_key.json";
pub const DEFAULT_OUTPUT_FILE: &str = "ga4_engineering_tools.csv";
pub const DEFAULT_LOWER_DAYS_AGO: u32 = 3;
pub const DEFAULT_UPPER_DAYS_AGO: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = MAX_PAGE_SIZE;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1200;

pub const DEFAULT_DIMENSIONS: &[&str] = &[
    "date",
    "hostName",
    "pagePathPlusQueryString",
    "countryId",
    "deviceCategory",
];

pub const DEFAULT_METRICS: &[&str] = &[
    "eventCount",
    "sessions",
    "engagedSessions",
    "screenPageViews",
    "userEngagementDuration",
];

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub property_id: String,
    pub credentials_path: PathBuf,
    pub output_path: PathBuf,
    pub window: DateWindow,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub page_size: u64,
    pub request_delay: Duration,
}

fn or_defaults(given: &[String], defaults: &[&str]) -> Vec<String> {
    let given: Vec<String> = given
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if given.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        given
    }
}

static NUMERIC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("property id pattern compiles"));

pub fn validate_property_id(property_id: &str) -> Result<(), ExtractError> {
    if !NUMERIC_ID.is_match(property_id) {
        return Err(ExtractError::config(format!(
            "property id must be numeric, got {property_id:?}"
        )));
    }
    Ok(())
}

impl ExtractConfig {
    /// Resolves CLI arguments against the compiled-in defaults. `today` anchors
    /// the relative window.
    pub fn from_args(args: &Args, today: NaiveDate) -> Result<Self, ExtractError> {
        let property_id = args
            .property_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ExtractError::config("no property id; pass --property-id or set GA4_PROPERTY_ID")
            })?;
        validate_property_id(property_id)?;

        if args.credentials.as_os_str().is_empty() {
            return Err(ExtractError::config("credential path is empty"));
        }

        let window = match (args.start_date, args.end_date) {
            (Some(start), Some(end)) => DateWindow::new(start, end),
            _ => DateWindow::trailing(today, args.from_days_ago, args.to_days_ago)?,
        };
        if window.is_empty() {
            return Err(ExtractError::config(format!(
                "date window {} to {} contains no days",
                window.lower(),
                window.upper()
            )));
        }

        if args.page_size == 0 || args.page_size > MAX_PAGE_SIZE {
            return Err(ExtractError::config(format!(
                "--page-size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        Ok(Self {
            property_id: property_id.to_string(),
            credentials_path: args.credentials.clone(),
            output_path: args.output.clone(),
            window,
            dimensions: or_defaults(&args.dimensions, DEFAULT_DIMENSIONS),
            metrics: or_defaults(&args.metrics, DEFAULT_METRICS),
            page_size: args.page_size,
            request_delay: Duration::from_millis(args.delay_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["ga4-extract", "--property-id", "123456", "--credentials", "key.json"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_mirror_the_daily_job() {
        let config = ExtractConfig::from_args(&parse(&[]), ymd(2024, 1, 10)).unwrap();
        assert_eq!(config.window, DateWindow::new(ymd(2024, 1, 7), ymd(2024, 1, 9)));
        assert_eq!(config.page_size, 100_000);
        assert_eq!(config.request_delay, Duration::from_millis(1200));
        assert_eq!(config.dimensions.len(), 5);
        assert_eq!(config.metrics[0], "eventCount");
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_FILE));
    }

    #[test]
    fn explicit_dates_and_lists_override_defaults() {
        let args = parse(&[
            "--start-date",
            "2024-01-01",
            "--end-date",
            "2024-01-01",
            "--dimensions",
            "date,pagePath",
            "--metrics",
            "sessions",
        ]);
        let config = ExtractConfig::from_args(&args, ymd(2024, 6, 1)).unwrap();
        assert_eq!(config.window.days().collect::<Vec<_>>(), vec![ymd(2024, 1, 1)]);
        assert_eq!(config.dimensions, vec!["date", "pagePath"]);
        assert_eq!(config.metrics, vec!["sessions"]);
    }

    #[test]
    fn non_numeric_property_is_rejected() {
        let args = Args::parse_from(["ga4-extract", "--property-id", "#########"]);
        let err = ExtractConfig::from_args(&args, ymd(2024, 1, 10)).unwrap_err();
        assert!(matches!(err, ExtractError::Configuration(_)));
    }

    #[test]
    fn property_id_must_be_all_digits() {
        assert!(validate_property_id("123456").is_ok());
        for bad in ["", "12a4", "properties/123", " 123"] {
            assert!(matches!(
                validate_property_id(bad),
                Err(ExtractError::Configuration(_))
            ));
        }
    }

    #[test]
    fn page_size_above_api_cap_is_rejected() {
        let args = parse(&["--page-size", "100001"]);
        assert!(ExtractConfig::from_args(&args, ymd(2024, 1, 10)).is_err());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let args = parse(&["--from-days-ago", "1", "--to-days-ago", "3"]);
        assert!(ExtractConfig::from_args(&args, ymd(2024, 1, 10)).is_err());
    }
}
