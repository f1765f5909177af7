use crate::{AnalysisFailure, AnalysisReport, AttemptId, Column, FilterTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input box.
    InputChanged(String),
    /// User submitted the current URL input for analysis.
    UrlSubmitted,
    /// User clicked Run on a queue row.
    RunClicked { url: String },
    /// User ran every selected row, in the given order.
    RunSelected(Vec<String>),
    /// User clicked Stop on a queue row.
    StopClicked { url: String },
    /// Engine settlement for one attempt.
    AnalysisSettled {
        attempt: AttemptId,
        url: String,
        outcome: Result<AnalysisReport, AnalysisFailure>,
    },
    /// User clicked a results column header.
    ResultsSortClicked(Column),
    /// User picked the column the search box filters on.
    ResultsFilterTargetChanged(FilterTarget),
    /// User edited the results search box.
    ResultsFilterChanged(String),
    ResultsNextPage,
    ResultsPreviousPage,
    /// User opened the details panel for a row of the current page.
    ResultRowSelected { position: usize },
    DetailsClosed,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
