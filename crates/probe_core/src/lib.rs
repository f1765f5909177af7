//! Pageprobe core: queue store, single-slot scheduler and results model.
//!
//! Everything here is pure and synchronous. Network work is requested through
//! [`Effect`]s and reported back as [`Msg::AnalysisSettled`].
mod effect;
mod input;
mod msg;
mod queue;
mod report;
mod results;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use input::{validate_submission, InputError};
pub use msg::Msg;
pub use queue::{ItemStatus, QueueError, QueueItem, QueueStore};
pub use report::{AnalysisFailure, AnalysisReport, BrokenLink};
pub use results::{
    fuzzy_matches, CellValue, Column, FilterTarget, LinkKind, LinkSlice, ReportDetails,
    ResultsPage, ResultsTable, SortDirection, SortState, DEFAULT_PAGE_SIZE,
};
pub use state::{AppState, AttemptId, Notice};
pub use update::update;
pub use view_model::{AppViewModel, QueueItemView, ResultsView, StatusCounts};
