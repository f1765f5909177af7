use std::fmt;

use thiserror::Error;

/// Lifecycle status of a queued URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    Created,
    Queued,
    Running,
    Cancelled,
    Done,
    Error,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 6] = [
        ItemStatus::Created,
        ItemStatus::Queued,
        ItemStatus::Running,
        ItemStatus::Cancelled,
        ItemStatus::Done,
        ItemStatus::Error,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ItemStatus::Created => "Created",
            ItemStatus::Queued => "Queued",
            ItemStatus::Running => "Running",
            ItemStatus::Cancelled => "Cancelled",
            ItemStatus::Done => "Done",
            ItemStatus::Error => "Error",
        }
    }

    /// `Queued` and `Running` items can be stopped; every other status can be run.
    pub fn is_active(self) -> bool {
        matches!(self, ItemStatus::Queued | ItemStatus::Running)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub url: String,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("url is already in the queue: {0}")]
    DuplicateUrl(String),
    #[error("url is not in the queue: {0}")]
    NotFound(String),
}

/// Ordered, append-only list of submitted URLs.
///
/// Insertion order is both the display order and the promotion order. URLs are
/// compared by exact string match. `version` advances on every mutation that
/// changes the list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueStore {
    items: Vec<QueueItem>,
    version: u64,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, url: impl Into<String>) -> Result<(), QueueError> {
        let url = url.into();
        if self.contains(&url) {
            return Err(QueueError::DuplicateUrl(url));
        }
        self.items.push(QueueItem {
            url,
            status: ItemStatus::Created,
        });
        self.version += 1;
        Ok(())
    }

    pub fn set_status(&mut self, url: &str, status: ItemStatus) -> Result<(), QueueError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.url == url)
            .ok_or_else(|| QueueError::NotFound(url.to_string()))?;
        if item.status != status {
            item.status = status;
            self.version += 1;
        }
        Ok(())
    }

    /// First item matching `predicate`, in insertion order.
    pub fn find<P>(&self, mut predicate: P) -> Option<&QueueItem>
    where
        P: FnMut(&QueueItem) -> bool,
    {
        self.items.iter().find(|item| predicate(item))
    }

    pub fn get(&self, url: &str) -> Option<&QueueItem> {
        self.find(|item| item.url == url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    pub fn running(&self) -> Option<&QueueItem> {
        self.find(|item| item.status == ItemStatus::Running)
    }

    pub fn first_queued(&self) -> Option<&QueueItem> {
        self.find(|item| item.status == ItemStatus::Queued)
    }

    pub fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}
