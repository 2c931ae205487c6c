use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{error, info};

use crate::error::ExtractError;
use crate::filter::MatchFilter;
use crate::report::{ReportClient, ReportRequest, MAX_PAGE_SIZE};
use crate::sink::OutputSink;
use crate::stats::{PageProgress, RunSummary};
use crate::window::DateWindow;

/// Waits between consecutive report requests.
pub trait Pacer {
    fn pause(&mut self);
}

/// Blocks the thread for a fixed delay after every page.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl Pacer for FixedDelay {
    fn pause(&mut self) {
        std::thread::sleep(self.0);
    }
}

/// What to fetch: the same query is issued once per day, page by page.
#[derive(Debug, Clone)]
pub struct ExtractPlan {
    pub property_id: String,
    pub window: DateWindow,
    pub filter: MatchFilter,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub page_size: u64,
}

impl ExtractPlan {
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ExtractError::config(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        if self.dimensions.is_empty() {
            return Err(ExtractError::config("at least one dimension is required"));
        }
        if self.metrics.is_empty() {
            return Err(ExtractError::config("at least one metric is required"));
        }
        Ok(())
    }
}

/// Run-scoped state. `header_written` flips once per run, not per day.
#[derive(Debug, Default)]
struct RunContext {
    header_written: bool,
    last_written: Option<(NaiveDate, u64)>,
    summary: RunSummary,
}

impl RunContext {
    fn fail(&self, err: ExtractError) -> ExtractError {
        match self.last_written {
            Some((day, offset)) => error!(
                action = "abort",
                component = "extractor",
                error = %err,
                last_day = %day,
                last_offset = offset,
                "Run aborted; output holds every page up to the last written one"
            ),
            None => error!(
                action = "abort",
                component = "extractor",
                error = %err,
                "Run aborted before any page was written"
            ),
        }
        err
    }
}

/// Offset for the next page and whether the day is finished.
///
/// The offset only advances by a full page while the reported total exceeds
/// the page size, otherwise it jumps to the total. An exact multiple of the
/// page size therefore ends on the last full page.
pub fn advance(offset: u64, total: u64, page_size: u64) -> (u64, bool) {
    let next = if total > page_size {
        offset + page_size
    } else {
        total
    };
    (next, next >= total)
}

/// Fetches every day of the plan's window page by page, appending each page to
/// `sink` and reporting progress after each request. Any failure aborts the run.
pub fn run<C, S, P, F>(
    plan: &ExtractPlan,
    client: &mut C,
    sink: &mut S,
    pacer: &mut P,
    mut on_progress: F,
) -> Result<RunSummary, ExtractError>
where
    C: ReportClient,
    S: OutputSink,
    P: Pacer,
    F: FnMut(&PageProgress),
{
    plan.validate()?;
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "extractor",
        property_id = %plan.property_id,
        first_day = %plan.window.lower(),
        last_day = %plan.window.upper(),
        days = plan.window.len(),
        patterns = plan.filter.len(),
        page_size = plan.page_size,
        "Starting day-paginated extraction"
    );

    let mut ctx = RunContext::default();
    for day in plan.window.days() {
        let mut offset = 0;
        let mut day_done = false;

        while !day_done {
            let request = ReportRequest::for_day(
                &plan.property_id,
                &plan.dimensions,
                &plan.metrics,
                &plan.filter,
                day,
                plan.page_size,
                offset,
            );
            let response = client
                .run_report(&request)
                .map_err(|e| ctx.fail(ExtractError::from_report(day, offset, e)))?;
            ctx.summary.pages_requested += 1;

            // The latest count wins; it can drift between calls.
            let total = response.row_count;
            let requested_at = offset;
            let (next, done) = advance(offset, total, plan.page_size);
            offset = next;
            day_done = done;

            let retrieved = if total > plan.page_size && offset < total {
                offset
            } else {
                total
            };

            let table = response
                .into_table()
                .map_err(|e| ctx.fail(ExtractError::from_report(day, requested_at, e)))?;

            let progress = PageProgress {
                day,
                offset: requested_at,
                page_rows: table.rows.len(),
                retrieved,
                total,
            };
            info!(
                action = "page",
                component = "extractor",
                day = %day,
                offset = requested_at,
                page_rows = progress.page_rows,
                retrieved,
                total,
                "Page received"
            );
            on_progress(&progress);

            sink.write_page(&table, !ctx.header_written).map_err(|source| {
                ctx.fail(ExtractError::Sink {
                    day,
                    offset: requested_at,
                    source,
                })
            })?;
            ctx.header_written = true;
            ctx.last_written = Some((day, requested_at));
            ctx.summary.rows_written += table.rows.len() as u64;

            pacer.pause();
        }

        ctx.summary.days_processed += 1;
    }

    info!(
        action = "complete",
        component = "extractor",
        days = ctx.summary.days_processed,
        pages = ctx.summary.pages_requested,
        rows = ctx.summary.rows_written,
        duration_ms = start_time.elapsed().as_millis(),
        "Extraction completed"
    );
    Ok(ctx.summary)
}
