use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::Duration;

use robustify_core::{update, AppState, AppViewModel, LdnStatus, Msg, RunPhase};
use robustify_logging::robustify_error;

use crate::effects::EffectRunner;
use crate::render::TerminalRenderer;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the state and feeds it messages, one at a time, rendering after
/// every change.
pub struct Session<W: Write> {
    state: AppState,
    runner: EffectRunner,
    renderer: TerminalRenderer<W>,
    pending: VecDeque<Msg>,
}

impl<W: Write> Session<W> {
    pub fn new(state: AppState, runner: EffectRunner, renderer: TerminalRenderer<W>) -> Self {
        Self {
            state,
            runner,
            renderer,
            pending: VecDeque::new(),
        }
    }

    pub fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        self.pending.push_back(msg);
        while let Some(msg) = self.pending.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            if self.state.consume_dirty() {
                self.renderer.render(&self.state.view())?;
            }
            let follow_ups = self.runner.run(effects, &mut self.renderer)?;
            self.pending.extend(follow_ups);
        }
        Ok(())
    }

    /// Pumps engine events until the current run has ended or failed.
    pub fn wait_for_run(&mut self) -> io::Result<RunPhase> {
        self.pump_while(|state| state.phase() == RunPhase::Streaming)?;
        Ok(self.state.phase())
    }

    /// Pumps engine events until no LDN request is outstanding.
    pub fn wait_for_ldn(&mut self) -> io::Result<LdnStatus> {
        self.pump_while(|state| {
            matches!(
                state.view().ldn.status,
                LdnStatus::Loading | LdnStatus::Previewing | LdnStatus::Sending
            )
        })?;
        Ok(self.state.view().ldn.status)
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    #[cfg(test)]
    pub fn into_renderer(self) -> TerminalRenderer<W> {
        self.renderer
    }

    fn pump_while(&mut self, busy: impl Fn(&AppState) -> bool) -> io::Result<()> {
        while busy(&self.state) {
            match self.runner.next_msg(POLL_INTERVAL) {
                Ok(Some(msg)) => self.dispatch(msg)?,
                Ok(None) => {}
                Err(err) => {
                    robustify_error!("Engine stopped answering: {}", err);
                    return self.abandon(err.to_string());
                }
            }
        }
        Ok(())
    }

    /// Fails whatever request is outstanding once no answer can arrive.
    fn abandon(&mut self, message: String) -> io::Result<()> {
        if self.state.phase() == RunPhase::Streaming {
            self.dispatch(Msg::StreamFailed {
                message: message.clone(),
            })?;
        }
        match self.state.view().ldn.status {
            LdnStatus::Loading => self.dispatch(Msg::LdnLoaded(Err(message))),
            LdnStatus::Previewing => self.dispatch(Msg::LdnPreviewReady(Err(message))),
            LdnStatus::Sending => self.dispatch(Msg::LdnSent(Err(message))),
            _ => Ok(()),
        }
    }
}
