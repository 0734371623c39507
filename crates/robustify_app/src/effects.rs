use std::io::{self, Write};
use std::time::{Duration, Instant};

use robustify_core::{Effect, Msg, Observation};
use robustify_engine::{EngineError, EngineEvent, EngineHandle, Mappings, RobustifyRecord, RunId};
use robustify_logging::{robustify_debug, robustify_info, robustify_warn};

use crate::clipboard::Clipboard;
use crate::render::{Notice, TerminalRenderer};

/// Carries out the effects returned by `update` and turns engine events
/// back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    clipboard: Box<dyn Clipboard>,
    last_run_id: RunId,
    active_run: Option<RunId>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            engine,
            clipboard,
            last_run_id: 0,
            active_run: None,
        }
    }

    /// Runs `effects` in order. Messages produced on the spot (clipboard
    /// results) are returned for dispatch.
    pub fn run<W: Write>(
        &mut self,
        effects: Vec<Effect>,
        out: &mut TerminalRenderer<W>,
    ) -> io::Result<Vec<Msg>> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::Robustify { key, uris } => {
                    self.last_run_id += 1;
                    robustify_info!(
                        "Robustify run_id={} key={} uris={}",
                        self.last_run_id,
                        key,
                        uris.len()
                    );
                    self.active_run = Some(self.last_run_id);
                    self.engine.robustify(self.last_run_id, key, uris);
                }
                Effect::CopyToClipboard { text } => {
                    let result = self.clipboard.copy(&text);
                    if let Err(err) = &result {
                        robustify_warn!("Clipboard not usable: {}", err);
                        out.notice(Notice::ManualCopy(&text))?;
                    }
                    follow_ups.push(Msg::CopyFinished(result.map_err(|err| err.to_string())));
                }
                Effect::ShowToast(toast) => out.notice(Notice::Toast(toast))?,
                Effect::Alert { message } => out.notice(Notice::Alert(&message))?,
                Effect::FetchLdn { key, ld_server_url } => {
                    self.engine.fetch_ldn(key, ld_server_url)
                }
                Effect::PreviewLdn { ldn } => self.engine.preview_ldn(ldn),
                Effect::SendLdn { key, ld_server_url } => self.engine.send_ldn(key, ld_server_url),
                Effect::OpenUrl { url } => out.notice(Notice::Open(&url))?,
            }
        }
        Ok(follow_ups)
    }

    /// Waits up to `timeout` for the next engine event that maps to a message.
    /// An error means the engine is gone and nothing more will arrive.
    pub fn next_msg(&mut self, timeout: Duration) -> Result<Option<Msg>, EngineError> {
        Ok(self
            .engine
            .recv_timeout(timeout)?
            .and_then(|event| self.map_event(event)))
    }

    /// Asks for the stored mappings of `key` and waits up to `timeout` for them.
    pub fn fetch_mappings(&mut self, key: &str, timeout: Duration) -> Result<Mappings, String> {
        self.engine.fetch_mappings(key);
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err("timed out waiting for mappings".to_string());
            }
            match self.engine.recv_timeout(remaining).map_err(|err| err.to_string())? {
                Some(EngineEvent::MappingsLoaded(result)) => {
                    return result.map_err(|err| err.to_string())
                }
                Some(other) => robustify_debug!("Ignoring {:?} while waiting for mappings", other),
                None => {}
            }
        }
    }

    fn map_event(&mut self, event: EngineEvent) -> Option<Msg> {
        match event {
            EngineEvent::Record { run_id, record } => {
                if self.active_run != Some(run_id) {
                    robustify_debug!("Dropping record of stale run {}", run_id);
                    return None;
                }
                Some(Msg::ObservationReceived(map_record(record)))
            }
            EngineEvent::StreamFinished { run_id, result } => {
                if self.active_run != Some(run_id) {
                    return None;
                }
                self.active_run = None;
                match result {
                    Ok(summary) => {
                        robustify_info!(
                            "Run {} ended: {} records, {} skipped lines",
                            run_id,
                            summary.records,
                            summary.skipped_lines
                        );
                        Some(Msg::StreamEnded)
                    }
                    Err(err) => {
                        robustify_warn!("Run {} failed: {}", run_id, err);
                        Some(Msg::StreamFailed {
                            message: err.to_string(),
                        })
                    }
                }
            }
            EngineEvent::LdnLoaded(result) => {
                Some(Msg::LdnLoaded(result.map_err(|err| err.message)))
            }
            EngineEvent::LdnPreviewed(result) => {
                Some(Msg::LdnPreviewReady(result.map_err(|err| err.message)))
            }
            EngineEvent::LdnSent(result) => Some(Msg::LdnSent(result.map_err(|err| err.message))),
            EngineEvent::MappingsLoaded(_) => {
                robustify_warn!("Unrequested mappings arrived; ignoring");
                None
            }
        }
    }
}

pub fn map_record(record: RobustifyRecord) -> Observation {
    match record {
        RobustifyRecord::Passed {
            uri,
            href_uri_r,
            href_uri_m,
        } => Observation::Passed {
            uri,
            href_uri_r,
            href_uri_m,
        },
        RobustifyRecord::Failed { uri, error } => Observation::Failed { uri, error },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use robustify_engine::{ClientSettings, StreamSummary};

    use super::*;
    use crate::clipboard::testing::MemoryClipboard;

    fn runner() -> EffectRunner {
        let settings = ClientSettings::for_server("http://127.0.0.1:9/").unwrap();
        let engine = EngineHandle::new(settings).unwrap();
        EffectRunner::new(engine, Box::new(MemoryClipboard::default()))
    }

    fn failed(uri: &str) -> RobustifyRecord {
        RobustifyRecord::Failed {
            uri: uri.to_string(),
            error: "gone".to_string(),
        }
    }

    #[test]
    fn events_of_an_older_run_are_dropped() {
        let mut runner = runner();
        runner.last_run_id = 2;
        runner.active_run = Some(2);

        let stale_record = EngineEvent::Record {
            run_id: 1,
            record: failed("https://old.example.com"),
        };
        assert_eq!(runner.map_event(stale_record), None);
        let stale_end = EngineEvent::StreamFinished {
            run_id: 1,
            result: Ok(StreamSummary::default()),
        };
        assert_eq!(runner.map_event(stale_end), None);
        assert_eq!(runner.active_run, Some(2));

        let current = EngineEvent::Record {
            run_id: 2,
            record: failed("https://new.example.com"),
        };
        assert_eq!(
            runner.map_event(current),
            Some(Msg::ObservationReceived(Observation::Failed {
                uri: "https://new.example.com".to_string(),
                error: "gone".to_string(),
            }))
        );
        let end = EngineEvent::StreamFinished {
            run_id: 2,
            result: Ok(StreamSummary::default()),
        };
        assert_eq!(runner.map_event(end), Some(Msg::StreamEnded));
        assert_eq!(runner.active_run, None);
    }

    #[test]
    fn records_without_an_active_run_are_dropped() {
        let mut runner = runner();
        let record = EngineEvent::Record {
            run_id: 1,
            record: failed("https://a.example.com"),
        };
        assert_eq!(runner.map_event(record), None);
    }
}
