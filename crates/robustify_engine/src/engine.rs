use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use robustify_logging::robustify_error;
use tokio::task::JoinError;

use crate::robustify::{ChannelProgressSink, ReqwestRobustifier, Robustifier};
use crate::{ClientSettings, EngineError, EngineEvent, FailureKind, LdnClient, RunId};

enum EngineCommand {
    Robustify {
        run_id: RunId,
        key: String,
        uris: Vec<String>,
    },
    FetchLdn {
        key: String,
        ld_server_url: String,
    },
    PreviewLdn {
        ldn: String,
    },
    SendLdn {
        key: String,
        ld_server_url: String,
    },
    FetchMappings {
        key: String,
    },
}

/// Worker thread owning a tokio runtime. Commands go in, `EngineEvent`s come out.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let robustifier = Arc::new(ReqwestRobustifier::new(settings.clone())?);
        let ldn = Arc::new(LdnClient::new(settings)?);
        Self::with_parts(robustifier, ldn)
    }

    /// Uses a custom robustifier, e.g. a scripted one in tests.
    pub fn with_parts(
        robustifier: Arc<dyn Robustifier>,
        ldn: Arc<LdnClient>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|err| EngineError::new(FailureKind::Runtime, err.to_string()))?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let pending = Pending::of(&command);
                let task =
                    handle_command(robustifier.clone(), ldn.clone(), command, event_tx.clone());
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    // A panicking command still answers, so waiters are released.
                    if let Err(err) = tokio::spawn(task).await {
                        robustify_error!("Engine task for {:?} died: {}", pending, err);
                        let _ = event_tx.send(pending.failed(err));
                    }
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn robustify(&self, run_id: RunId, key: impl Into<String>, uris: Vec<String>) {
        self.send(EngineCommand::Robustify {
            run_id,
            key: key.into(),
            uris,
        });
    }

    pub fn fetch_ldn(&self, key: impl Into<String>, ld_server_url: impl Into<String>) {
        self.send(EngineCommand::FetchLdn {
            key: key.into(),
            ld_server_url: ld_server_url.into(),
        });
    }

    pub fn preview_ldn(&self, ldn: impl Into<String>) {
        self.send(EngineCommand::PreviewLdn { ldn: ldn.into() });
    }

    pub fn send_ldn(&self, key: impl Into<String>, ld_server_url: impl Into<String>) {
        self.send(EngineCommand::SendLdn {
            key: key.into(),
            ld_server_url: ld_server_url.into(),
        });
    }

    pub fn fetch_mappings(&self, key: impl Into<String>) {
        self.send(EngineCommand::FetchMappings { key: key.into() });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event. `Ok(None)` means nothing
    /// arrived in time; an error means the worker is gone for good.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(EngineError::new(
                FailureKind::Runtime,
                "engine worker stopped",
            )),
        }
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            robustify_error!("Engine worker is gone; command dropped");
        }
    }
}

/// What a command owes its caller if it never gets to answer.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Robustify(RunId),
    FetchLdn,
    PreviewLdn,
    SendLdn,
    FetchMappings,
}

impl Pending {
    fn of(command: &EngineCommand) -> Self {
        match command {
            EngineCommand::Robustify { run_id, .. } => Pending::Robustify(*run_id),
            EngineCommand::FetchLdn { .. } => Pending::FetchLdn,
            EngineCommand::PreviewLdn { .. } => Pending::PreviewLdn,
            EngineCommand::SendLdn { .. } => Pending::SendLdn,
            EngineCommand::FetchMappings { .. } => Pending::FetchMappings,
        }
    }

    fn failed(self, err: JoinError) -> EngineEvent {
        let err = EngineError::new(FailureKind::Runtime, err.to_string());
        match self {
            Pending::Robustify(run_id) => EngineEvent::StreamFinished {
                run_id,
                result: Err(err),
            },
            Pending::FetchLdn => EngineEvent::LdnLoaded(Err(err)),
            Pending::PreviewLdn => EngineEvent::LdnPreviewed(Err(err)),
            Pending::SendLdn => EngineEvent::LdnSent(Err(err)),
            Pending::FetchMappings => EngineEvent::MappingsLoaded(Err(err)),
        }
    }
}

async fn handle_command(
    robustifier: Arc<dyn Robustifier>,
    ldn: Arc<LdnClient>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let ldn = ldn.as_ref();
    let event = match command {
        EngineCommand::Robustify { run_id, key, uris } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let result = robustifier.robustify(run_id, &key, &uris, &sink).await;
            if let Err(err) = &result {
                robustify_error!("Run {} failed: {}", run_id, err);
            }
            EngineEvent::StreamFinished { run_id, result }
        }
        EngineCommand::FetchLdn { key, ld_server_url } => {
            EngineEvent::LdnLoaded(ldn.get_ldn(&key, &ld_server_url).await)
        }
        EngineCommand::PreviewLdn { ldn: payload } => {
            EngineEvent::LdnPreviewed(ldn.preview_ldn(&payload).await)
        }
        EngineCommand::SendLdn { key, ld_server_url } => {
            EngineEvent::LdnSent(ldn.send_ldn(&key, &ld_server_url).await)
        }
        EngineCommand::FetchMappings { key } => {
            EngineEvent::MappingsLoaded(ldn.fetch_mappings(&key).await)
        }
    };
    let _ = event_tx.send(event);
}
