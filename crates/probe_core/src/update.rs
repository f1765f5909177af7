use probe_logging::{probe_debug, probe_warn};

use crate::{validate_submission, AppState, Effect, ItemStatus, Msg, Notice, QueueError};

/// Pure update function: applies a message to state and returns any effects.
///
/// Every message ends with one scheduling pass, so a freed running slot is
/// refilled in the same call that freed it.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let mut effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::UrlSubmitted => {
            submit_input(&mut state);
            Vec::new()
        }
        Msg::RunClicked { url } => run_requested(&mut state, &url).into_iter().collect(),
        Msg::RunSelected(urls) => {
            let mut effects = Vec::new();
            for url in &urls {
                effects.extend(run_requested(&mut state, url));
            }
            effects
        }
        Msg::StopClicked { url } => stop_requested(&mut state, &url).into_iter().collect(),
        Msg::AnalysisSettled {
            attempt,
            url,
            outcome,
        } => {
            state.apply_settlement(attempt, &url, outcome);
            Vec::new()
        }
        Msg::ResultsSortClicked(column) => {
            state.results_mut().toggle_sort(column);
            Vec::new()
        }
        Msg::ResultsFilterTargetChanged(target) => {
            state.results_mut().set_filter_target(target);
            Vec::new()
        }
        Msg::ResultsFilterChanged(value) => {
            state.results_mut().set_filter_value(value);
            Vec::new()
        }
        Msg::ResultsNextPage => {
            state.results_mut().next_page();
            Vec::new()
        }
        Msg::ResultsPreviousPage => {
            state.results_mut().previous_page();
            Vec::new()
        }
        Msg::ResultRowSelected { position } => {
            if state.results_mut().select(position).is_none() {
                probe_debug!("no result row at position {}", position);
            }
            Vec::new()
        }
        Msg::DetailsClosed => {
            state.results_mut().clear_selection();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    effects.extend(schedule(&mut state));
    (state, effects)
}

fn submit_input(state: &mut AppState) {
    let raw = state.input().to_string();
    match validate_submission(&raw) {
        Ok(None) => {}
        Ok(Some(url)) => match state.enqueue_url(url) {
            Ok(()) => {}
            Err(QueueError::DuplicateUrl(url)) => state.set_notice(Notice::DuplicateUrl(url)),
            Err(err @ QueueError::NotFound(_)) => probe_warn!("unexpected add failure: {}", err),
        },
        Err(reason) => state.set_notice(Notice::InvalidUrl {
            input: raw.trim().to_string(),
            reason,
        }),
    }
}

/// Runs an idle item now, or queues it behind the running one.
fn run_requested(state: &mut AppState, url: &str) -> Option<Effect> {
    match state.status_of(url) {
        None => {
            probe_warn!("run requested for unknown url={}", url);
            None
        }
        Some(status) if status.is_active() => None,
        Some(_) if state.has_running() => {
            state.transition(url, ItemStatus::Queued);
            None
        }
        Some(_) => start(state, url),
    }
}

/// Running items are aborted then cancelled; queued items are cancelled in place.
fn stop_requested(state: &mut AppState, url: &str) -> Option<Effect> {
    match state.status_of(url) {
        Some(ItemStatus::Running) => {
            let attempt = state.take_attempt_for(url);
            state.transition(url, ItemStatus::Cancelled);
            attempt.map(|attempt| Effect::CancelAnalysis { attempt })
        }
        Some(ItemStatus::Queued) => {
            state.transition(url, ItemStatus::Cancelled);
            None
        }
        _ => None,
    }
}

/// Promotes the earliest queued item when nothing is running.
fn schedule(state: &mut AppState) -> Option<Effect> {
    if state.has_running() {
        return None;
    }
    let url = state.first_queued_url()?;
    probe_debug!("promoting url={}", url);
    start(state, &url)
}

fn start(state: &mut AppState, url: &str) -> Option<Effect> {
    let attempt = state.begin_attempt(url)?;
    Some(Effect::StartAnalysis {
        attempt,
        url: url.to_string(),
    })
}
