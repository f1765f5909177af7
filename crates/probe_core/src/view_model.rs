use crate::{FilterTarget, ItemStatus, QueueStore, ReportDetails, SortState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub created: usize,
    pub queued: usize,
    pub running: usize,
    pub cancelled: usize,
    pub done: usize,
    pub error: usize,
}

impl StatusCounts {
    pub(crate) fn from_queue(queue: &QueueStore) -> Self {
        Self {
            created: queue.count(ItemStatus::Created),
            queued: queue.count(ItemStatus::Queued),
            running: queue.count(ItemStatus::Running),
            cancelled: queue.count(ItemStatus::Cancelled),
            done: queue.count(ItemStatus::Done),
            error: queue.count(ItemStatus::Error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub input: String,
    pub items: Vec<QueueItemView>,
    pub counts: StatusCounts,
    pub running: Option<String>,
    pub notice: Option<String>,
    pub results: ResultsView,
    pub details: Option<ReportDetails>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItemView {
    pub url: String,
    pub status: ItemStatus,
    /// Row shows Stop instead of Run.
    pub can_stop: bool,
}

/// The current results page, already formatted cell by cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultsView {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub total: usize,
    pub total_visible: usize,
    pub page_index: usize,
    pub page_count: usize,
    pub can_previous: bool,
    pub can_next: bool,
    pub sort: Option<SortState>,
    pub filter_target: FilterTarget,
    pub filter_value: String,
}
