//! Request and response shapes of the GA4 Data API `runReport` call, and the
//! client capability the extractor drives.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filter::MatchFilter;

/// Largest `limit` the API accepts for a single page.
pub const MAX_PAGE_SIZE: u64 = 100_000;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("credentials rejected: {0}")]
    Authentication(String),

    #[error("API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed report: {0}")]
    Decode(String),
}

/// The `runReport` capability of an authenticated client.
pub trait ReportClient {
    fn run_report(&mut self, request: &ReportRequest) -> Result<ReportResponse, ReportError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeSpec {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Numeric property id; part of the URL, not the body.
    #[serde(skip)]
    pub property_id: String,
    pub dimensions: Vec<FieldName>,
    pub metrics: Vec<FieldName>,
    pub date_ranges: Vec<DateRangeSpec>,
    pub dimension_filter: MatchFilter,
    pub limit: u64,
    pub offset: u64,
}

impl ReportRequest {
    /// A page of a single-day report.
    pub fn for_day(
        property_id: &str,
        dimensions: &[String],
        metrics: &[String],
        filter: &MatchFilter,
        day: NaiveDate,
        limit: u64,
        offset: u64,
    ) -> Self {
        let named = |names: &[String]| -> Vec<FieldName> {
            names
                .iter()
                .map(|name| FieldName { name: name.clone() })
                .collect()
        };
        Self {
            property_id: property_id.to_string(),
            dimensions: named(dimensions),
            metrics: named(metrics),
            date_ranges: vec![DateRangeSpec {
                start_date: day,
                end_date: day,
            }],
            dimension_filter: filter.clone(),
            limit,
            offset,
        }
    }

    pub fn day(&self) -> Option<NaiveDate> {
        self.date_ranges.first().map(|range| range.start_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CellValue {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(default)]
    pub dimension_values: Vec<CellValue>,
    #[serde(default)]
    pub metric_values: Vec<CellValue>,
}

/// One page of a report. The API omits `rowCount` and `rows` when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub dimension_headers: Vec<FieldName>,
    #[serde(default)]
    pub metric_headers: Vec<FieldName>,
    #[serde(default)]
    pub rows: Vec<ReportRow>,
}

/// Flat rows ready for the sink: dimension columns then metric columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportResponse {
    /// Labels values by the response's own headers, which may be ordered
    /// differently from the request.
    pub fn into_table(self) -> Result<PageTable, ReportError> {
        let dims = self.dimension_headers.len();
        let mets = self.metric_headers.len();
        let columns: Vec<String> = self
            .dimension_headers
            .into_iter()
            .chain(self.metric_headers)
            .map(|header| header.name)
            .collect();

        let mut rows: Vec<Vec<String>> = Vec::with_capacity(self.rows.len());
        for (idx, row) in self.rows.into_iter().enumerate() {
            if row.dimension_values.len() != dims || row.metric_values.len() != mets {
                return Err(ReportError::Decode(format!(
                    "row {} has {} dimension and {} metric values, headers declare {} and {}",
                    idx,
                    row.dimension_values.len(),
                    row.metric_values.len(),
                    dims,
                    mets
                )));
            }
            rows.push(
                row.dimension_values
                    .into_iter()
                    .chain(row.metric_values)
                    .map(|cell| cell.value)
                    .collect(),
            );
        }

        Ok(PageTable { columns, rows })
    }
}
