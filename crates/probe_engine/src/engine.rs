use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use probe_logging::{probe_debug, probe_info, probe_warn};
use tokio_util::sync::CancellationToken;

use crate::client::{AnalysisClient, ClientSettings, ReqwestAnalysisClient};
use crate::{AttemptId, EngineEvent};

enum EngineCommand {
    Start { attempt: AttemptId, url: String },
    Cancel { attempt: AttemptId },
}

/// Runs analyses on a background tokio runtime, one cancellation token at a time.
///
/// Commands are handled in order on a dedicated thread. Starting an attempt
/// replaces the live token, cancelling the previous one if it was still held.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> io::Result<Self> {
        let client = ReqwestAnalysisClient::new(settings).map_err(io::Error::other)?;
        Self::with_client(Arc::new(client))
    }

    pub fn with_client(client: Arc<dyn AnalysisClient>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("probe-engine")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("probe-engine-commands".into())
            .spawn(move || {
                let mut live: Option<(AttemptId, CancellationToken)> = None;
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Start { attempt, url } => {
                            if let Some((previous, token)) = live.take() {
                                probe_debug!("attempt {} replaced by {}", previous, attempt);
                                token.cancel();
                            }
                            let token = CancellationToken::new();
                            live = Some((attempt, token.clone()));

                            let client = client.clone();
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                let result = client.analyze(&url, &token).await;
                                let _ = event_tx.send(EngineEvent::Settled {
                                    attempt,
                                    url,
                                    result,
                                });
                            });
                        }
                        EngineCommand::Cancel { attempt } => match live.take() {
                            Some((current, token)) if current == attempt => {
                                probe_info!("cancelling attempt {}", attempt);
                                token.cancel();
                            }
                            other => {
                                probe_debug!("cancel for attempt {} ignored", attempt);
                                live = other;
                            }
                        },
                    }
                }
                probe_debug!("engine command loop stopped");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn start(&self, attempt: AttemptId, url: impl Into<String>) {
        self.send(EngineCommand::Start {
            attempt,
            url: url.into(),
        });
    }

    pub fn cancel(&self, attempt: AttemptId) {
        self.send(EngineCommand::Cancel { attempt });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            probe_warn!("engine command loop is gone; command dropped");
        }
    }
}
