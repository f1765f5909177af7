use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use probe_core::{AnalysisFailure, AnalysisReport, BrokenLink, Effect, Msg};
use probe_engine::{EngineEvent, EngineHandle, FailureKind, UrlInfo};
use probe_logging::{probe_debug, probe_info, probe_warn};

const EVENT_POLL: Duration = Duration::from_millis(100);

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartAnalysis { attempt, url } => {
                    probe_info!("StartAnalysis attempt={} url={}", attempt, url);
                    self.engine.start(attempt, url);
                }
                Effect::CancelAnalysis { attempt } => {
                    probe_info!("CancelAnalysis attempt={}", attempt);
                    self.engine.cancel(attempt);
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine settlement.
    #[cfg(test)]
    pub fn next_settlement(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(settlement_msg)
    }

    /// Forwards engine settlements as messages until the receiver goes away.
    pub fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.recv_timeout(EVENT_POLL) {
                if msg_tx.send(settlement_msg(event)).is_err() {
                    probe_debug!("message channel closed; engine event loop stopping");
                    break;
                }
            }
        });
    }
}

fn settlement_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Settled {
            attempt,
            url,
            result,
        } => {
            let outcome = match result {
                Ok(info) => Ok(map_report(&url, info)),
                Err(err) => {
                    probe_warn!("attempt {} for {} failed: {}", attempt, url, err);
                    Err(map_failure(err.kind))
                }
            };
            Msg::AnalysisSettled {
                attempt,
                url,
                outcome,
            }
        }
    }
}

// The service may omit `baseUrl`; the analysed url stands in for it.
fn map_report(url: &str, info: UrlInfo) -> AnalysisReport {
    AnalysisReport {
        base_url: info.base_url.unwrap_or_else(|| url.to_string()),
        html_version: info.html_version,
        page_title: info.page_title,
        h1_count: info.h1_count,
        h2_count: info.h2_count,
        h3_count: info.h3_count,
        h4_count: info.h4_count,
        internal_links_count: info.internal_links_count,
        external_links_count: info.external_links_count,
        broken_links: info
            .broken_links
            .into_iter()
            .map(|link| BrokenLink {
                url: link.url,
                status_code: link.status_code,
            })
            .collect(),
        has_login_form: info.has_login_form,
    }
}

fn map_failure(kind: FailureKind) -> AnalysisFailure {
    match kind {
        FailureKind::FetchFailure { .. } => AnalysisFailure::FetchFailure,
        FailureKind::ParseFailure => AnalysisFailure::ParseFailure,
        FailureKind::UserCancellation => AnalysisFailure::UserCancellation,
    }
}
