use std::sync::Arc;
use std::time::Duration;

use probe_engine::{
    AnalysisClient, AnalysisError, CancellationToken, EngineEvent, EngineHandle, FailureKind,
    UrlInfo,
};

/// Answers after a delay: five seconds for urls containing "slow", otherwise 10 ms.
struct DelayClient;

#[async_trait::async_trait]
impl AnalysisClient for DelayClient {
    async fn analyze(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<UrlInfo, AnalysisError> {
        let delay = if url.contains("slow") {
            Duration::from_secs(5)
        } else {
            Duration::from_millis(10)
        };
        tokio::select! {
            _ = cancel.cancelled() => Err(AnalysisError::user_cancellation()),
            _ = tokio::time::sleep(delay) => Ok(info_for(url)),
        }
    }
}

fn info_for(url: &str) -> UrlInfo {
    UrlInfo {
        base_url: Some(url.to_string()),
        html_version: "HTML5".into(),
        page_title: "Title".into(),
        h1_count: 1,
        h2_count: 0,
        h3_count: 0,
        h4_count: 0,
        internal_links_count: 2,
        external_links_count: 1,
        broken_links: Vec::new(),
        has_login_form: true,
    }
}

fn engine() -> EngineHandle {
    probe_logging::initialize_for_tests();
    EngineHandle::with_client(Arc::new(DelayClient)).expect("engine")
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine
        .recv_timeout(Duration::from_secs(3))
        .expect("engine event")
}

#[test]
fn settlement_is_reported_with_its_attempt() {
    let engine = engine();
    engine.start(1, "https://a.com");

    let EngineEvent::Settled {
        attempt,
        url,
        result,
    } = next_event(&engine);
    assert_eq!(attempt, 1);
    assert_eq!(url, "https://a.com");
    assert_eq!(result.unwrap(), info_for("https://a.com"));
    assert!(engine.try_recv().is_none());
}

#[test]
fn cancelling_the_live_attempt_aborts_it() {
    let engine = engine();
    engine.start(4, "https://slow.com");
    engine.cancel(4);

    let EngineEvent::Settled {
        attempt, result, ..
    } = next_event(&engine);
    assert_eq!(attempt, 4);
    assert_eq!(result.unwrap_err().kind, FailureKind::UserCancellation);
}

#[test]
fn cancelling_another_attempt_is_ignored() {
    let engine = engine();
    engine.start(2, "https://a.com");
    engine.cancel(9);

    let EngineEvent::Settled { result, .. } = next_event(&engine);
    assert!(result.is_ok());
}

#[test]
fn starting_a_new_attempt_cancels_the_previous_token() {
    let engine = engine();
    engine.start(1, "https://slow.com");
    engine.start(2, "https://fast.com");

    let mut events: Vec<_> = (0..2)
        .map(|_| {
            let EngineEvent::Settled {
                attempt, result, ..
            } = next_event(&engine);
            (attempt, result.map(|_| ()).map_err(|err| err.kind))
        })
        .collect();
    events.sort_by_key(|(attempt, _)| *attempt);

    assert_eq!(
        events,
        vec![(1, Err(FailureKind::UserCancellation)), (2, Ok(()))]
    );
}
