use chrono::NaiveDate;

/// Progress after one page of a day has been fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    pub day: NaiveDate,
    /// Offset the page was requested at.
    pub offset: u64,
    /// Rows in this page's body.
    pub page_rows: usize,
    /// Rows retrieved for the day so far, capped at `total`.
    pub retrieved: u64,
    /// Matching rows for the day as reported by the latest response.
    pub total: u64,
}

impl std::fmt::Display for PageProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} of {} rows received",
            self.day.format("%Y-%m-%d"),
            self.retrieved,
            self.total
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub days_processed: usize,
    pub pages_requested: usize,
    pub rows_written: u64,
}
