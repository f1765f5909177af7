use std::fmt;

use probe_logging::{probe_debug, probe_error, probe_info};

use crate::view_model::{AppViewModel, QueueItemView, ResultsView, StatusCounts};
use crate::{
    AnalysisFailure, AnalysisReport, Column, InputError, ItemStatus, QueueError, QueueStore,
    ResultsTable,
};

pub type AttemptId = u64;

/// Transient message for the user; never changes the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    DuplicateUrl(String),
    InvalidUrl { input: String, reason: InputError },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::DuplicateUrl(url) => write!(f, "This URL is already in the queue: {url}"),
            Notice::InvalidUrl { input, reason } => write!(f, "{input:?}: {reason}"),
        }
    }
}

/// The running item's current attempt. Exists exactly while an item is `Running`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LiveAttempt {
    id: AttemptId,
    url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    queue: QueueStore,
    input: String,
    live: Option<LiveAttempt>,
    last_attempt: AttemptId,
    notice: Option<Notice>,
    results: ResultsTable,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            results: ResultsTable::new(page_size),
            ..Self::default()
        }
    }

    pub fn queue(&self) -> &QueueStore {
        &self.queue
    }

    pub fn results(&self) -> &ResultsTable {
        &self.results
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn live_attempt(&self) -> Option<AttemptId> {
        self.live.as_ref().map(|live| live.id)
    }

    pub fn view(&self) -> AppViewModel {
        let page = self.results.page();
        AppViewModel {
            input: self.input.clone(),
            items: self
                .queue
                .items()
                .iter()
                .map(|item| QueueItemView {
                    url: item.url.clone(),
                    status: item.status,
                    can_stop: item.status.is_active(),
                })
                .collect(),
            counts: StatusCounts::from_queue(&self.queue),
            running: self.queue.running().map(|item| item.url.clone()),
            notice: self.notice.as_ref().map(ToString::to_string),
            results: ResultsView {
                headers: Column::ALL.iter().map(|c| c.header()).collect(),
                rows: page
                    .rows
                    .iter()
                    .map(|report| {
                        Column::ALL
                            .iter()
                            .map(|column| column.cell(report).display())
                            .collect()
                    })
                    .collect(),
                total: self.results.rows().len(),
                total_visible: page.total_visible,
                page_index: page.page_index,
                page_count: page.page_count,
                can_previous: page.can_previous,
                can_next: page.can_next,
                sort: self.results.sort(),
                filter_target: self.results.filter_target(),
                filter_value: self.results.filter_value().to_string(),
            },
            details: self.results.details(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        probe_info!("notice: {}", notice);
        self.notice = Some(notice);
        self.mark_dirty();
    }

    /// Adds a validated URL; clears the input box and any notice on success.
    pub(crate) fn enqueue_url(&mut self, url: String) -> Result<(), QueueError> {
        self.queue.add(url.clone())?;
        probe_info!("added url={}", url);
        self.input.clear();
        self.notice = None;
        self.mark_dirty();
        Ok(())
    }

    pub(crate) fn status_of(&self, url: &str) -> Option<ItemStatus> {
        self.queue.get(url).map(|item| item.status)
    }

    pub(crate) fn has_running(&self) -> bool {
        self.queue.running().is_some()
    }

    pub(crate) fn first_queued_url(&self) -> Option<String> {
        self.queue.first_queued().map(|item| item.url.clone())
    }

    /// Marks `url` as `Running` under a fresh attempt id.
    pub(crate) fn begin_attempt(&mut self, url: &str) -> Option<AttemptId> {
        if !self.transition(url, ItemStatus::Running) {
            return None;
        }
        self.last_attempt += 1;
        let id = self.last_attempt;
        self.live = Some(LiveAttempt {
            id,
            url: url.to_string(),
        });
        probe_info!("running url={} attempt={}", url, id);
        Some(id)
    }

    /// Drops the live attempt if it belongs to `url`.
    pub(crate) fn take_attempt_for(&mut self, url: &str) -> Option<AttemptId> {
        match &self.live {
            Some(live) if live.url == url => self.live.take().map(|live| live.id),
            _ => None,
        }
    }

    /// Applies a settlement unless it is stale or the item was cancelled.
    pub(crate) fn apply_settlement(
        &mut self,
        attempt: AttemptId,
        url: &str,
        outcome: Result<AnalysisReport, AnalysisFailure>,
    ) {
        let is_live = self
            .live
            .as_ref()
            .is_some_and(|live| live.id == attempt && live.url == url);
        if !is_live {
            probe_debug!("discarding stale settlement url={} attempt={}", url, attempt);
            return;
        }
        if self.status_of(url) != Some(ItemStatus::Running) {
            probe_debug!(
                "discarding settlement for non-running url={} attempt={}",
                url,
                attempt
            );
            return;
        }
        self.live = None;

        let status = match outcome {
            Ok(report) => {
                self.results.push(report);
                ItemStatus::Done
            }
            Err(AnalysisFailure::UserCancellation) => ItemStatus::Cancelled,
            Err(failure) => {
                probe_info!("analysis failed url={} attempt={}: {}", url, attempt, failure);
                ItemStatus::Error
            }
        };
        self.transition(url, status);
    }

    /// Sets a status through the store; a missing url is logged, not propagated.
    pub(crate) fn transition(&mut self, url: &str, status: ItemStatus) -> bool {
        let before = self.queue.version();
        match self.queue.set_status(url, status) {
            Ok(()) => {
                if self.queue.version() != before {
                    probe_debug!("url={} -> {}", url, status);
                    self.mark_dirty();
                }
                true
            }
            Err(err) => {
                probe_error!("queue transition to {} failed: {}", status, err);
                false
            }
        }
    }

    pub(crate) fn results_mut(&mut self) -> &mut ResultsTable {
        self.mark_dirty();
        &mut self.results
    }
}
