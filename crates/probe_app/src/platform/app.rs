use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use probe_core::{update, AppState, AppViewModel, Msg};
use probe_engine::EngineHandle;
use probe_logging::{probe_info, LevelFilter, LogDestination};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui::commands::{self, Action, HELP};
use super::ui::render;

const INPUT_POLL: Duration = Duration::from_millis(75);
const PROMPT: &str = "pageprobe> ";

pub fn run_app() -> anyhow::Result<()> {
    probe_logging::initialize(LogDestination::default(), LevelFilter::Info);

    let config = AppConfig::load().context("failed to load configuration")?;
    probe_info!(
        "analysis service {} ({:?} endpoint)",
        config.api_base_url,
        config.endpoint
    );
    let engine = EngineHandle::new(config.client_settings())
        .context("failed to start the analysis engine")?;
    let effects = EffectRunner::new(engine);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    effects.spawn_event_loop(msg_tx);
    let line_rx = spawn_stdin_reader()?;

    let mut session = Session::new(AppState::with_page_size(config.page_size), effects);
    let mut stdout = io::stdout();
    draw(&mut stdout, &session.view())?;

    loop {
        while let Ok(msg) = msg_rx.try_recv() {
            session.dispatch(msg);
        }
        if session.consume_dirty() {
            draw(&mut stdout, &session.view())?;
        }

        let line = match line_rx.recv_timeout(INPUT_POLL) {
            Ok(line) => line,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };
        match commands::parse(&line, session.state()) {
            Ok(Action::Dispatch(msgs)) => {
                for msg in msgs {
                    session.dispatch(msg);
                }
                if !session.consume_dirty() {
                    prompt(&mut stdout)?;
                    continue;
                }
                draw(&mut stdout, &session.view())?;
            }
            Ok(Action::Redraw) => draw(&mut stdout, &session.view())?,
            Ok(Action::Help) => {
                writeln!(stdout, "{HELP}")?;
                prompt(&mut stdout)?;
            }
            Ok(Action::Quit) => break,
            Ok(Action::Nothing) => prompt(&mut stdout)?,
            Err(err) => {
                writeln!(stdout, "{err}")?;
                prompt(&mut stdout)?;
            }
        }
    }

    session.shutdown();
    probe_info!("pageprobe exiting");
    Ok(())
}

fn spawn_stdin_reader() -> io::Result<mpsc::Receiver<String>> {
    let (line_tx, line_rx) = mpsc::channel();
    thread::Builder::new()
        .name("probe-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(line_rx)
}

fn draw(out: &mut impl Write, view: &AppViewModel) -> io::Result<()> {
    writeln!(out)?;
    write!(out, "{}", render::render(view))?;
    prompt(out)
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "{PROMPT}")?;
    out.flush()
}

/// Owns the core state and feeds every message through `update`.
struct Session {
    state: AppState,
    effects: EffectRunner,
}

impl Session {
    fn new(state: AppState, effects: EffectRunner) -> Self {
        Self { state, effects }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.effects.apply(effects);
    }

    fn state(&self) -> &AppState {
        &self.state
    }

    fn view(&self) -> AppViewModel {
        self.state.view()
    }

    fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    /// Stops whatever is running so its request is released before exit.
    fn shutdown(&mut self) {
        if let Some(url) = self.state.queue().running().map(|item| item.url.clone()) {
            probe_info!("stopping {} before exit", url);
            self.dispatch(Msg::StopClicked { url });
        }
    }

    #[cfg(test)]
    fn settle_next(&mut self) -> bool {
        match self.effects.next_settlement(Duration::from_secs(5)) {
            Some(msg) => {
                self.dispatch(msg);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use probe_core::{ItemStatus, QueueItem};
    use probe_engine::{ClientSettings, EngineHandle};
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn report_body(url: &str, title: &str) -> serde_json::Value {
        json!({
            "baseUrl": url,
            "htmlVersion": "HTML5",
            "pageTitle": title,
            "h1Count": 1,
            "h2Count": 2,
            "h3Count": 0,
            "h4Count": 0,
            "internalLinksCount": 5,
            "externalLinksCount": 3,
            "brokenLinks": [],
            "hasLoginForm": false
        })
    }

    async fn mount(server: &MockServer, target: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(query_param("url", target))
            .respond_with(response)
            .mount(server)
            .await;
    }

    fn session_for(server: &MockServer) -> Session {
        probe_logging::initialize_for_tests();
        let base = Url::parse(&format!("{}/analyze", server.uri())).unwrap();
        let engine = EngineHandle::new(ClientSettings::new(base)).expect("engine");
        Session::new(AppState::new(), EffectRunner::new(engine))
    }

    fn add(session: &mut Session, url: &str) {
        session.dispatch(Msg::InputChanged(url.to_string()));
        session.dispatch(Msg::UrlSubmitted);
    }

    fn run(session: &mut Session, url: &str) {
        session.dispatch(Msg::RunClicked {
            url: url.to_string(),
        });
    }

    fn status(session: &Session, url: &str) -> Option<ItemStatus> {
        session.state().queue().get(url).map(|item: &QueueItem| item.status)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn valid_report_completes_the_item() {
        let server = MockServer::start().await;
        mount(
            &server,
            "https://a.com",
            ResponseTemplate::new(200).set_body_json(report_body("https://a.com", "Alpha")),
        )
        .await;

        let mut session = session_for(&server);
        add(&mut session, "https://a.com");
        assert_eq!(status(&session, "https://a.com"), Some(ItemStatus::Created));
        run(&mut session, "https://a.com");
        assert_eq!(status(&session, "https://a.com"), Some(ItemStatus::Running));

        assert!(session.settle_next());
        assert_eq!(status(&session, "https://a.com"), Some(ItemStatus::Done));
        assert_eq!(session.state().results().rows()[0].page_title, "Alpha");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stopped_item_stays_cancelled_and_next_one_runs() {
        let server = MockServer::start().await;
        mount(
            &server,
            "https://a.com",
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(report_body("https://a.com", "Alpha")),
        )
        .await;
        mount(
            &server,
            "https://b.com",
            ResponseTemplate::new(200).set_body_json(report_body("https://b.com", "Beta")),
        )
        .await;

        let mut session = session_for(&server);
        add(&mut session, "https://a.com");
        add(&mut session, "https://b.com");
        run(&mut session, "https://a.com");
        run(&mut session, "https://b.com");
        assert_eq!(status(&session, "https://b.com"), Some(ItemStatus::Queued));

        session.dispatch(Msg::StopClicked {
            url: "https://a.com".into(),
        });
        assert_eq!(status(&session, "https://a.com"), Some(ItemStatus::Cancelled));
        assert_eq!(status(&session, "https://b.com"), Some(ItemStatus::Running));

        // A's cancellation and B's report, in either order.
        assert!(session.settle_next());
        assert!(session.settle_next());
        assert_eq!(status(&session, "https://a.com"), Some(ItemStatus::Cancelled));
        assert_eq!(status(&session, "https://b.com"), Some(ItemStatus::Done));
        assert_eq!(session.state().results().rows().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn service_failures_mark_the_item_as_error() {
        let server = MockServer::start().await;
        mount(&server, "https://bad.com", ResponseTemplate::new(500)).await;
        let mut missing_title = report_body("https://weird.com", "Weird");
        missing_title
            .as_object_mut()
            .unwrap()
            .remove("pageTitle");
        mount(
            &server,
            "https://weird.com",
            ResponseTemplate::new(200).set_body_json(missing_title),
        )
        .await;

        let mut session = session_for(&server);
        for url in ["https://bad.com", "https://weird.com"] {
            add(&mut session, url);
            run(&mut session, url);
            assert!(session.settle_next());
            assert_eq!(status(&session, url), Some(ItemStatus::Error), "url {url}");
        }
        assert!(session.state().results().rows().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shutdown_stops_the_running_item() {
        let server = MockServer::start().await;
        mount(
            &server,
            "https://a.com",
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(report_body("https://a.com", "Alpha")),
        )
        .await;

        let mut session = session_for(&server);
        add(&mut session, "https://a.com");
        run(&mut session, "https://a.com");
        session.shutdown();
        assert_eq!(status(&session, "https://a.com"), Some(ItemStatus::Cancelled));
        assert!(session.settle_next());
        assert_eq!(status(&session, "https://a.com"), Some(ItemStatus::Cancelled));
    }
}
