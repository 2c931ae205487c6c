use std::time::{Duration, Instant};

use tracing::{debug, info};
use url::Url;

use crate::auth::ServiceAccountAuth;
use crate::error::ExtractError;
use crate::report::{ReportClient, ReportError, ReportRequest, ReportResponse};

pub const DATA_API_BASE: &str = "https://analyticsdata.googleapis.com/v1beta/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub fn build_agent() -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build()
}

/// Blocking client for the GA4 Data API.
pub struct Ga4Client {
    agent: ureq::Agent,
    base: Url,
    auth: ServiceAccountAuth,
}

impl Ga4Client {
    pub fn new(agent: ureq::Agent, auth: ServiceAccountAuth) -> Result<Self, ExtractError> {
        Self::with_base(agent, auth, DATA_API_BASE)
    }

    fn with_base(
        agent: ureq::Agent,
        auth: ServiceAccountAuth,
        base: &str,
    ) -> Result<Self, ExtractError> {
        let base = Url::parse(base)
            .map_err(|e| ExtractError::config(format!("invalid API base URL {base:?}: {e}")))?;
        Ok(Self { agent, base, auth })
    }
}

pub fn run_report_url(base: &Url, property_id: &str) -> Result<Url, ReportError> {
    base.join(&format!("properties/{property_id}:runReport"))
        .map_err(|e| ReportError::Transport(format!("building request URL: {e}")))
}

/// Nothing can match a filter without predicates, so the API is not asked.
fn empty_report(request: &ReportRequest) -> ReportResponse {
    ReportResponse {
        row_count: 0,
        dimension_headers: request.dimensions.clone(),
        metric_headers: request.metrics.clone(),
        rows: Vec::new(),
    }
}

fn map_status(code: u16, body: String) -> ReportError {
    match code {
        401 | 403 => ReportError::Authentication(format!("HTTP {code}: {body}")),
        _ => ReportError::Api {
            status: code,
            message: body,
        },
    }
}

impl ReportClient for Ga4Client {
    fn run_report(&mut self, request: &ReportRequest) -> Result<ReportResponse, ReportError> {
        if request.dimension_filter.is_empty() {
            debug!(
                action = "skip",
                component = "ga4_client",
                "Filter has no predicates; returning an empty report"
            );
            return Ok(empty_report(request));
        }

        let url = run_report_url(&self.base, &request.property_id)?;
        let token = self.auth.access_token()?;
        let start_time = Instant::now();

        let response = self
            .agent
            .post(url.as_str())
            .set("Authorization", &format!("Bearer {token}"))
            .send_json(request)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => {
                    map_status(code, resp.into_string().unwrap_or_default())
                }
                ureq::Error::Transport(t) => ReportError::Transport(t.to_string()),
            })?;
        let report: ReportResponse = response
            .into_json()
            .map_err(|e| ReportError::Decode(e.to_string()))?;

        info!(
            action = "request",
            component = "ga4_client",
            offset = request.offset,
            limit = request.limit,
            row_count = report.row_count,
            rows = report.rows.len(),
            duration_ms = start_time.elapsed().as_millis(),
            "runReport returned"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::build_match_filter;
    use crate::report::FieldName;
    use chrono::NaiveDate;

    fn field_names(fields: &[FieldName]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn report_url_per_property() {
        let base = Url::parse(DATA_API_BASE).unwrap();
        assert_eq!(
            run_report_url(&base, "123456").unwrap().as_str(),
            "https://analyticsdata.googleapis.com/v1beta/properties/123456:runReport"
        );
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            map_status(401, "bad token".into()),
            ReportError::Authentication(_)
        ));
        assert!(matches!(
            map_status(403, "no access".into()),
            ReportError::Authentication(_)
        ));
        assert!(matches!(
            map_status(429, "quota".into()),
            ReportError::Api { status: 429, .. }
        ));
    }

    #[test]
    fn empty_filter_report_keeps_requested_headers() {
        let filter = build_match_filter::<&str>(&[]).unwrap();
        let request = ReportRequest::for_day(
            "123456",
            &["date".to_string(), "pagePath".to_string()],
            &["sessions".to_string()],
            &filter,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            100_000,
            0,
        );
        let report = empty_report(&request);
        assert_eq!(report.row_count, 0);
        assert_eq!(field_names(&report.dimension_headers), vec!["date", "pagePath"]);
        assert_eq!(field_names(&report.metric_headers), vec!["sessions"]);
    }
}
