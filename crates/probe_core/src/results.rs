//! Headless results table over completed analysis reports.
//!
//! Holds rows plus the sort, filter, pagination and selection state. Rendering
//! is left to the caller; see [`ResultsTable::page`] and
//! [`ResultsTable::details`].
use std::cmp::Ordering;

use crate::{AnalysisReport, BrokenLink};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Url,
    HtmlVersion,
    PageTitle,
    H1Count,
    H2Count,
    H3Count,
    H4Count,
    InternalLinks,
    ExternalLinks,
    BrokenLinks,
    LoginRequired,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::Url,
        Column::HtmlVersion,
        Column::PageTitle,
        Column::H1Count,
        Column::H2Count,
        Column::H3Count,
        Column::H4Count,
        Column::InternalLinks,
        Column::ExternalLinks,
        Column::BrokenLinks,
        Column::LoginRequired,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Url => "URL",
            Column::HtmlVersion => "HTML Version",
            Column::PageTitle => "Page Title",
            Column::H1Count => "# H1",
            Column::H2Count => "# H2",
            Column::H3Count => "# H3",
            Column::H4Count => "# H4",
            Column::InternalLinks => "# Internal Links",
            Column::ExternalLinks => "# External Links",
            Column::BrokenLinks => "# Broken Links",
            Column::LoginRequired => "Login Required",
        }
    }

    /// Field name of the column in the report's wire format.
    pub fn key(self) -> &'static str {
        match self {
            Column::Url => "baseUrl",
            Column::HtmlVersion => "htmlVersion",
            Column::PageTitle => "pageTitle",
            Column::H1Count => "h1Count",
            Column::H2Count => "h2Count",
            Column::H3Count => "h3Count",
            Column::H4Count => "h4Count",
            Column::InternalLinks => "internalLinksCount",
            Column::ExternalLinks => "externalLinksCount",
            Column::BrokenLinks => "brokenLinks",
            Column::LoginRequired => "hasLoginForm",
        }
    }

    pub fn from_key(key: &str) -> Option<Column> {
        Column::ALL
            .into_iter()
            .find(|column| column.key().eq_ignore_ascii_case(key))
    }

    pub fn is_sortable(self) -> bool {
        self != Column::Url
    }

    pub fn cell(self, report: &AnalysisReport) -> CellValue<'_> {
        match self {
            Column::Url => CellValue::Text(&report.base_url),
            Column::HtmlVersion => CellValue::Text(&report.html_version),
            Column::PageTitle => CellValue::Text(&report.page_title),
            Column::H1Count => CellValue::Number(u64::from(report.h1_count)),
            Column::H2Count => CellValue::Number(u64::from(report.h2_count)),
            Column::H3Count => CellValue::Number(u64::from(report.h3_count)),
            Column::H4Count => CellValue::Number(u64::from(report.h4_count)),
            Column::InternalLinks => CellValue::Number(u64::from(report.internal_links_count)),
            Column::ExternalLinks => CellValue::Number(u64::from(report.external_links_count)),
            Column::BrokenLinks => CellValue::Number(report.broken_links.len() as u64),
            Column::LoginRequired => CellValue::Flag(report.has_login_form),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Number(u64),
    Flag(bool),
}

impl CellValue<'_> {
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(text) => (*text).to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Flag(true) => "Yes".to_string(),
            CellValue::Flag(false) => "No".to_string(),
        }
    }

    fn compare(&self, other: &CellValue<'_>) -> Ordering {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Number(a), CellValue::Number(b)) => a.cmp(b),
            (CellValue::Flag(a), CellValue::Flag(b)) => a.cmp(b),
            _ => self.display().cmp(&other.display()),
        }
    }

    fn matches(&self, filter: &str) -> bool {
        match self {
            CellValue::Number(n) => filter
                .trim()
                .parse::<f64>()
                .is_ok_and(|wanted| wanted == *n as f64),
            _ => fuzzy_matches(&self.display(), filter),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: Column,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterTarget {
    #[default]
    Global,
    Column(Column),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSlice {
    pub kind: LinkKind,
    pub count: u32,
}

/// Data for the details panel of one selected report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDetails {
    pub title: String,
    pub base_url: String,
    pub links_chart: [LinkSlice; 2],
    pub broken_links: Vec<BrokenLink>,
}

impl ReportDetails {
    pub fn from_report(report: &AnalysisReport) -> Self {
        Self {
            title: report.page_title.clone(),
            base_url: report.base_url.clone(),
            links_chart: [
                LinkSlice {
                    kind: LinkKind::Internal,
                    count: report.internal_links_count,
                },
                LinkSlice {
                    kind: LinkKind::External,
                    count: report.external_links_count,
                },
            ],
            broken_links: report.broken_links.clone(),
        }
    }

    pub fn all_links_accessible(&self) -> bool {
        self.broken_links.is_empty()
    }
}

/// One page of visible rows. `row_ids` index into [`ResultsTable::rows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsPage<'a> {
    pub rows: Vec<&'a AnalysisReport>,
    pub row_ids: Vec<usize>,
    pub page_index: usize,
    pub page_count: usize,
    pub total_visible: usize,
    pub can_previous: bool,
    pub can_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsTable {
    rows: Vec<AnalysisReport>,
    sort: Option<SortState>,
    filter_target: FilterTarget,
    filter_value: String,
    page_index: usize,
    page_size: usize,
    selected: Option<usize>,
}

impl Default for ResultsTable {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ResultsTable {
    pub fn new(page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            sort: None,
            filter_target: FilterTarget::Global,
            filter_value: String::new(),
            page_index: 0,
            page_size: page_size.max(1),
            selected: None,
        }
    }

    pub fn push(&mut self, report: AnalysisReport) {
        self.rows.push(report);
    }

    pub fn rows(&self) -> &[AnalysisReport] {
        &self.rows
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn filter_target(&self) -> FilterTarget {
        self.filter_target
    }

    pub fn filter_value(&self) -> &str {
        &self.filter_value
    }

    /// Unsorted or descending flips to ascending; ascending flips to descending.
    /// Returns false for columns that cannot be sorted.
    pub fn toggle_sort(&mut self, column: Column) -> bool {
        if !column.is_sortable() {
            return false;
        }
        let direction = match self.sort {
            Some(SortState {
                column: current,
                direction: SortDirection::Ascending,
            }) if current == column => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortState { column, direction });
        true
    }

    /// Switching target clears the previous filter value.
    pub fn set_filter_target(&mut self, target: FilterTarget) {
        if self.filter_target != target {
            self.filter_target = target;
            self.filter_value.clear();
            self.page_index = 0;
        }
    }

    pub fn set_filter_value(&mut self, value: impl Into<String>) {
        self.filter_value = value.into();
        self.page_index = 0;
    }

    /// Filtered and sorted row ids.
    pub fn visible_row_ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = (0..self.rows.len())
            .filter(|&id| self.passes_filter(&self.rows[id]))
            .collect();

        if let Some(SortState { column, direction }) = self.sort {
            ids.sort_by(|&a, &b| {
                let ordering = column
                    .cell(&self.rows[a])
                    .compare(&column.cell(&self.rows[b]));
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
        ids
    }

    pub fn page_count(&self) -> usize {
        self.visible_row_ids().len().div_ceil(self.page_size).max(1)
    }

    pub fn page(&self) -> ResultsPage<'_> {
        let visible = self.visible_row_ids();
        let total_visible = visible.len();
        let page_count = total_visible.div_ceil(self.page_size).max(1);
        let page_index = self.page_index.min(page_count - 1);
        let row_ids: Vec<usize> = visible
            .into_iter()
            .skip(page_index * self.page_size)
            .take(self.page_size)
            .collect();

        ResultsPage {
            rows: row_ids.iter().map(|&id| &self.rows[id]).collect(),
            row_ids,
            page_index,
            page_count,
            total_visible,
            can_previous: page_index > 0,
            can_next: page_index + 1 < page_count,
        }
    }

    pub fn next_page(&mut self) -> bool {
        let page_count = self.page_count();
        let current = self.page_index.min(page_count - 1);
        if current + 1 < page_count {
            self.page_index = current + 1;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        let current = self.page_index.min(self.page_count() - 1);
        if current > 0 {
            self.page_index = current - 1;
            true
        } else {
            false
        }
    }

    /// Selects the row at `position` on the current page.
    pub fn select(&mut self, position: usize) -> Option<&AnalysisReport> {
        let id = *self.page().row_ids.get(position)?;
        self.selected = Some(id);
        self.rows.get(id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&AnalysisReport> {
        self.selected.and_then(|id| self.rows.get(id))
    }

    pub fn details(&self) -> Option<ReportDetails> {
        self.selected().map(ReportDetails::from_report)
    }

    fn passes_filter(&self, report: &AnalysisReport) -> bool {
        let value = self.filter_value.trim();
        if value.is_empty() {
            return true;
        }
        match self.filter_target {
            FilterTarget::Global => Column::ALL
                .into_iter()
                .any(|column| fuzzy_matches(&column.cell(report).display(), value)),
            FilterTarget::Column(column) => column.cell(report).matches(value),
        }
    }
}

/// Case-insensitive substring match, falling back to an in-order subsequence.
pub fn fuzzy_matches(text: &str, filter: &str) -> bool {
    let text = text.to_lowercase();
    let filter = filter.trim().to_lowercase();
    if filter.is_empty() || text.contains(&filter) {
        return true;
    }
    let mut chars = text.chars();
    filter
        .chars()
        .filter(|c| !c.is_whitespace())
        .all(|wanted| chars.any(|c| c == wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(url: &str, title: &str, h1: u32, broken: usize, login: bool) -> AnalysisReport {
        AnalysisReport {
            base_url: url.to_string(),
            html_version: "HTML5".to_string(),
            page_title: title.to_string(),
            h1_count: h1,
            h2_count: 0,
            h3_count: 0,
            h4_count: 0,
            internal_links_count: 5,
            external_links_count: 3,
            broken_links: (0..broken)
                .map(|i| BrokenLink {
                    url: format!("{url}/broken{i}"),
                    status_code: 404,
                })
                .collect(),
            has_login_form: login,
        }
    }

    fn sample() -> ResultsTable {
        let mut table = ResultsTable::new(2);
        table.push(report("https://example.com", "Example Page", 1, 1, false));
        table.push(report("https://another.com", "Another Example", 2, 0, true));
        table.push(report("https://sample.com", "Sample Site", 3, 2, false));
        table
    }

    fn titles(table: &ResultsTable) -> Vec<String> {
        table
            .visible_row_ids()
            .into_iter()
            .map(|id| table.rows()[id].page_title.clone())
            .collect()
    }

    #[test]
    fn toggle_sort_cycles_ascending_then_descending() {
        let mut table = sample();
        assert!(table.toggle_sort(Column::H1Count));
        assert_eq!(
            titles(&table),
            vec!["Example Page", "Another Example", "Sample Site"]
        );
        assert!(table.toggle_sort(Column::H1Count));
        assert_eq!(
            titles(&table),
            vec!["Sample Site", "Another Example", "Example Page"]
        );
        assert!(table.toggle_sort(Column::H1Count));
        assert_eq!(table.sort().unwrap().direction, SortDirection::Ascending);
    }

    #[test]
    fn url_column_is_not_sortable() {
        let mut table = sample();
        assert!(!table.toggle_sort(Column::Url));
        assert_eq!(table.sort(), None);
    }

    #[test]
    fn global_filter_is_fuzzy_and_case_insensitive() {
        let mut table = sample();
        table.set_filter_value("EXAMPLE");
        assert_eq!(titles(&table), vec!["Example Page", "Another Example"]);

        table.set_filter_value("smplst");
        assert_eq!(titles(&table), vec!["Sample Site"]);
    }

    #[test]
    fn numeric_column_filter_needs_exact_number() {
        let mut table = sample();
        table.set_filter_target(FilterTarget::Column(Column::BrokenLinks));
        table.set_filter_value("2");
        assert_eq!(titles(&table), vec!["Sample Site"]);

        table.set_filter_value("two");
        assert!(titles(&table).is_empty());
    }

    #[test]
    fn switching_filter_target_resets_value() {
        let mut table = sample();
        table.set_filter_value("sample");
        table.set_filter_target(FilterTarget::Column(Column::PageTitle));
        assert_eq!(table.filter_value(), "");
        assert_eq!(titles(&table).len(), 3);
    }

    #[test]
    fn login_column_filters_on_yes_no() {
        let mut table = sample();
        table.set_filter_target(FilterTarget::Column(Column::LoginRequired));
        table.set_filter_value("yes");
        assert_eq!(titles(&table), vec!["Another Example"]);
    }

    #[test]
    fn pagination_moves_within_bounds() {
        let mut table = sample();
        let first = table.page();
        assert_eq!(first.page_count, 2);
        assert_eq!(first.rows.len(), 2);
        assert!(!first.can_previous);
        assert!(first.can_next);

        assert!(table.next_page());
        let second = table.page();
        assert_eq!(second.rows.len(), 1);
        assert!(second.can_previous);
        assert!(!second.can_next);
        assert!(!table.next_page());

        assert!(table.previous_page());
        assert!(!table.previous_page());
    }

    #[test]
    fn selected_row_feeds_details() {
        let mut table = sample();
        table.toggle_sort(Column::H1Count);
        table.toggle_sort(Column::H1Count);
        let selected = table.select(0).unwrap();
        assert_eq!(selected.page_title, "Sample Site");

        let details = table.details().unwrap();
        assert_eq!(details.base_url, "https://sample.com");
        assert_eq!(details.links_chart[0].kind, LinkKind::Internal);
        assert_eq!(details.links_chart[0].count, 5);
        assert_eq!(details.links_chart[1].count, 3);
        assert!(!details.all_links_accessible());

        assert!(table.select(9).is_none());
        assert_eq!(table.selected().unwrap().page_title, "Sample Site");
    }

    #[test]
    fn column_keys_round_trip() {
        for column in Column::ALL {
            assert_eq!(Column::from_key(column.key()), Some(column));
        }
        assert_eq!(Column::from_key("pagetitle"), Some(Column::PageTitle));
        assert_eq!(Column::from_key("nope"), None);
    }
}
