use thiserror::Error;

/// Failures that reach the caller of the extract/transform stages.
///
/// Transport problems and single-card parse failures never show up here: a
/// page that cannot be fetched is `FetchOutcome::Unavailable`, and a broken
/// card is logged and skipped by the page parser.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad page bounds, record cap, page index or base locator.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Something outside the per-card loop went wrong for one page.
    #[error("page {page} failed: {reason}")]
    PageFailed { page: u32, reason: String },

    /// The whole page range produced no records.
    #[error("no data extracted from pages {start}..={end}")]
    Exhausted { start: u32, end: u32 },

    #[error("transform failed: {0}")]
    Transform(String),
}

impl PipelineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn page(page: u32, reason: impl Into<String>) -> Self {
        Self::PageFailed {
            page,
            reason: reason.into(),
        }
    }
}
