use std::fmt::Write as _;

use probe_core::{
    AppViewModel, FilterTarget, ItemStatus, LinkKind, ReportDetails, ResultsView, SortDirection,
    StatusCounts,
};

const MAX_CELL_WIDTH: usize = 32;

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    render_queue(&mut out, view);
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "! {notice}");
    }
    out.push('\n');
    render_results(&mut out, &view.results);
    if let Some(details) = &view.details {
        out.push('\n');
        render_details(&mut out, details);
    }
    out
}

fn render_queue(out: &mut String, view: &AppViewModel) {
    let _ = writeln!(
        out,
        "Queue: {} item(s){}",
        view.items.len(),
        counts_summary(&view.counts)
    );
    if view.items.is_empty() {
        let _ = writeln!(out, "  (empty; `add <url>` to queue one)");
        return;
    }
    let width = ItemStatus::ALL
        .iter()
        .map(|status| status.label().len())
        .max()
        .unwrap_or(0);
    for (index, item) in view.items.iter().enumerate() {
        let action = if item.can_stop { "stop" } else { "run" };
        let _ = writeln!(
            out,
            "  #{:<3} {:<width$}  {}  [{}]",
            index + 1,
            item.status.label(),
            item.url,
            action,
        );
    }
}

fn counts_summary(counts: &StatusCounts) -> String {
    let parts: Vec<String> = [
        (counts.running, ItemStatus::Running),
        (counts.queued, ItemStatus::Queued),
        (counts.created, ItemStatus::Created),
        (counts.done, ItemStatus::Done),
        (counts.cancelled, ItemStatus::Cancelled),
        (counts.error, ItemStatus::Error),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, status)| format!("{count} {}", status.label().to_lowercase()))
    .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn render_results(out: &mut String, results: &ResultsView) {
    let mut header = format!("Results: {} of {}", results.total_visible, results.total);
    if results.page_count > 1 {
        let _ = write!(
            header,
            ", page {}/{}",
            results.page_index + 1,
            results.page_count
        );
    }
    if let Some(sort) = results.sort {
        let arrow = match sort.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        let _ = write!(header, ", sorted by {} {arrow}", sort.column.header());
    }
    if !results.filter_value.is_empty() {
        let scope = match results.filter_target {
            FilterTarget::Global => "any column".to_string(),
            FilterTarget::Column(column) => column.header().to_string(),
        };
        let _ = write!(header, ", filter {:?} on {scope}", results.filter_value);
    }
    let _ = writeln!(out, "{header}");

    if results.rows.is_empty() {
        let message = if results.total == 0 {
            "no completed analyses yet"
        } else {
            "no rows match the filter"
        };
        let _ = writeln!(out, "  ({message})");
        return;
    }

    let widths: Vec<usize> = results
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            results
                .rows
                .iter()
                .map(|row| clip(&row[col]).chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header_cells: Vec<String> = results.headers.iter().map(|h| h.to_string()).collect();
    write_row(out, "   ", &header_cells, &widths);
    for (index, row) in results.rows.iter().enumerate() {
        write_row(out, &format!("{:>2}.", index + 1), row, &widths);
    }

    let mut hints = Vec::new();
    if results.can_previous {
        hints.push("prev");
    }
    if results.can_next {
        hints.push("next");
    }
    if !hints.is_empty() {
        let _ = writeln!(out, "  ({})", hints.join(" | "));
    }
}

fn write_row(out: &mut String, lead: &str, cells: &[String], widths: &[usize]) {
    let mut line = format!("  {lead}");
    for (cell, width) in cells.iter().zip(widths) {
        let _ = write!(line, " {:<width$} |", clip(cell));
    }
    let _ = writeln!(out, "{}", line.trim_end_matches(" |"));
}

fn clip(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL_WIDTH {
        return cell.to_string();
    }
    let mut clipped: String = cell.chars().take(MAX_CELL_WIDTH - 1).collect();
    clipped.push('~');
    clipped
}

fn render_details(out: &mut String, details: &ReportDetails) {
    let _ = writeln!(out, "Details: {}", details.title);
    let _ = writeln!(out, "  {}", details.base_url);

    let total: u64 = details
        .links_chart
        .iter()
        .map(|slice| u64::from(slice.count))
        .sum();
    let _ = writeln!(out, "  Links overview:");
    for slice in &details.links_chart {
        let label = match slice.kind {
            LinkKind::Internal => "Internal",
            LinkKind::External => "External",
        };
        if total == 0 {
            let _ = writeln!(out, "    {label:<8} {}", slice.count);
        } else {
            let percent = f64::from(slice.count) * 100.0 / total as f64;
            let _ = writeln!(out, "    {label:<8} {} ({percent:.1}%)", slice.count);
        }
    }

    if details.all_links_accessible() {
        let _ = writeln!(out, "  All links are accessible");
    } else {
        let _ = writeln!(out, "  Broken links:");
        for link in &details.broken_links {
            let _ = writeln!(out, "    {}  {}", link.status_code, link.url);
        }
    }
    let _ = writeln!(out, "  (`close` to hide)");
}
