use chrono::NaiveDate;
use ga4_extract::report::{CellValue, FieldName, ReportError, ReportRow};
use ga4_extract::{
    build_match_filter, run, CsvFileSink, DateWindow, ExtractError, ExtractPlan, Pacer,
    ReportClient, ReportRequest, ReportResponse,
};

const BOM: &str = "\u{feff}";

struct NoPause;

impl Pacer for NoPause {
    fn pause(&mut self) {}
}

/// Serves a fixed set of page paths per day, filtered with the request's own filter.
struct FixtureClient {
    paths: Vec<(NaiveDate, &'static str, u32)>,
    fail_on_day: Option<NaiveDate>,
    requests: usize,
}

impl ReportClient for FixtureClient {
    fn run_report(&mut self, request: &ReportRequest) -> Result<ReportResponse, ReportError> {
        self.requests += 1;
        let day = request.day().expect("single-day request");
        if self.fail_on_day == Some(day) {
            return Err(ReportError::Transport("connection reset".into()));
        }

        let matching: Vec<_> = self
            .paths
            .iter()
            .filter(|(d, path, _)| *d == day && request.dimension_filter.matches(path))
            .collect();
        let rows = matching
            .iter()
            .skip(request.offset as usize)
            .take(request.limit as usize)
            .map(|(d, path, sessions)| ReportRow {
                dimension_values: vec![
                    CellValue { value: d.format("%Y%m%d").to_string() },
                    CellValue { value: path.to_string() },
                ],
                metric_values: vec![CellValue { value: sessions.to_string() }],
            })
            .collect();

        Ok(ReportResponse {
            row_count: matching.len() as u64,
            dimension_headers: vec![
                FieldName { name: "date".into() },
                FieldName { name: "pagePath".into() },
            ],
            metric_headers: vec![FieldName { name: "sessions".into() }],
            rows,
        })
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn plan(window: DateWindow, page_size: u64) -> ExtractPlan {
    ExtractPlan {
        property_id: "123456".into(),
        window,
        filter: build_match_filter(&["/sizing"]).unwrap(),
        dimensions: vec!["date".into(), "pagePath".into()],
        metrics: vec!["sessions".into()],
        page_size,
    }
}

#[test]
fn single_day_lands_header_and_rows() {
    let day = ymd(2024, 1, 1);
    let mut client = FixtureClient {
        paths: vec![
            (day, "/sizing/valves", 4),
            (day, "/catalog/other", 9),
            (day, "/en/Sizing", 2),
            (day, "/sizing?unit=si", 1),
        ],
        fail_on_day: None,
        requests: 0,
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    let mut sink = CsvFileSink::new(&path);

    let summary = run(
        &plan(DateWindow::new(day, day), 100_000),
        &mut client,
        &mut sink,
        &mut NoPause,
        |_| {},
    )
    .unwrap();

    assert_eq!(summary.days_processed, 1);
    assert_eq!(summary.rows_written, 3);
    assert_eq!(client.requests, 1);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        format!(
            "{BOM}date,pagePath,sessions\n20240101,/sizing/valves,4\n20240101,/en/Sizing,2\n20240101,/sizing?unit=si,1\n"
        )
    );
}

#[test]
fn pages_across_days_share_one_header() {
    let (d1, d2) = (ymd(2024, 1, 1), ymd(2024, 1, 2));
    let mut client = FixtureClient {
        paths: vec![
            (d1, "/sizing/a", 1),
            (d1, "/sizing/b", 2),
            (d1, "/sizing/c", 3),
            (d2, "/sizing/d", 4),
        ],
        fail_on_day: None,
        requests: 0,
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    let mut progress = Vec::new();

    let summary = run(
        &plan(DateWindow::new(d1, d2), 2),
        &mut client,
        &mut CsvFileSink::new(&path),
        &mut NoPause,
        |p| progress.push(p.to_string()),
    )
    .unwrap();

    assert_eq!(summary.pages_requested, 3);
    assert_eq!(
        progress,
        vec![
            "2024-01-01: 2 of 3 rows received",
            "2024-01-01: 3 of 3 rows received",
            "2024-01-02: 1 of 1 rows received",
        ]
    );
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("date,pagePath,sessions").count(), 1);
    assert_eq!(text.lines().count(), 5);
}

#[test]
fn failure_keeps_earlier_days_in_the_file() {
    let (d1, d2, d3) = (ymd(2024, 1, 1), ymd(2024, 1, 2), ymd(2024, 1, 3));
    let mut client = FixtureClient {
        paths: vec![(d1, "/sizing/a", 1), (d3, "/sizing/b", 2)],
        fail_on_day: Some(d2),
        requests: 0,
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");

    let err = run(
        &plan(DateWindow::new(d1, d3), 10),
        &mut client,
        &mut CsvFileSink::new(&path),
        &mut NoPause,
        |_| {},
    )
    .unwrap_err();

    assert!(matches!(err, ExtractError::Request { day, offset: 0, .. } if day == d2));
    assert_eq!(client.requests, 2);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        format!("{BOM}date,pagePath,sessions\n20240101,/sizing/a,1\n")
    );
}
