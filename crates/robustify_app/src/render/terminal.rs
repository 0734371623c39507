use std::io::{self, Write};

use robustify_core::{AppViewModel, LdnStatus, LogCard, ProgressView, RunPhase, Toast};
use robustify_engine::parse_robust_link;

/// One-off messages that are not part of the view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice<'a> {
    Toast(Toast),
    Alert(&'a str),
    Open(&'a str),
    /// The clipboard could not be reached; the text is shown instead.
    ManualCopy(&'a str),
}

/// Prints view-model changes as they happen: each new card once, the
/// progress line whenever a counter moves, and phase/LDN transitions.
pub struct TerminalRenderer<W: Write> {
    out: W,
    printed_cards: usize,
    last_progress: ProgressView,
    last_phase: RunPhase,
    last_ldn_status: LdnStatus,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed_cards: 0,
            last_progress: ProgressView::default(),
            last_phase: RunPhase::Idle,
            last_ldn_status: LdnStatus::Idle,
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        if view.phase == RunPhase::Streaming && self.last_phase != RunPhase::Streaming {
            writeln!(
                self.out,
                "Robustifying {} URIs for {}",
                view.progress.total, view.key
            )?;
        }
        if view.log.len() < self.printed_cards {
            self.printed_cards = 0;
        }
        for card in &view.log[self.printed_cards..] {
            write_card(&mut self.out, card)?;
        }
        self.printed_cards = view.log.len();

        if view.progress != self.last_progress && view.progress.total > 0 {
            writeln!(self.out, "{}", view.progress.text())?;
        }
        self.last_progress = view.progress;

        if view.phase != self.last_phase {
            match view.phase {
                RunPhase::Ended => writeln!(self.out, "Done.")?,
                RunPhase::Failed => writeln!(
                    self.out,
                    "Error from API: {}",
                    view.last_error.as_deref().unwrap_or("unknown error")
                )?,
                RunPhase::Idle | RunPhase::Streaming => {}
            }
            self.last_phase = view.phase;
        }

        if view.ldn.status != self.last_ldn_status {
            self.render_ldn_status(view)?;
            self.last_ldn_status = view.ldn.status.clone();
        }
        self.out.flush()
    }

    pub fn notice(&mut self, notice: Notice<'_>) -> io::Result<()> {
        match notice {
            Notice::Toast(toast) => writeln!(self.out, "{}", toast.text())?,
            Notice::Alert(message) => writeln!(self.out, "! {message}")?,
            Notice::Open(url) => writeln!(self.out, "Open: {url}")?,
            Notice::ManualCopy(text) => {
                writeln!(self.out, "Clipboard unavailable; copy the text below:")?;
                writeln!(self.out, "{text}")?;
            }
        }
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_ldn_status(&mut self, view: &AppViewModel) -> io::Result<()> {
        match &view.ldn.status {
            LdnStatus::Loaded if self.last_ldn_status == LdnStatus::Loading => {
                if let Some(ldn) = &view.ldn.ldn {
                    writeln!(self.out, "{ldn}")?;
                }
            }
            LdnStatus::Sent(status) => writeln!(
                self.out,
                "LDN sent to {} (HTTP {status})",
                view.ldn.ld_server_url
            )?,
            LdnStatus::Failed(message) => writeln!(self.out, "LDN error: {message}")?,
            _ => {}
        }
        Ok(())
    }
}

fn write_card(out: &mut impl Write, card: &LogCard) -> io::Result<()> {
    match card {
        LogCard::Passed {
            uri,
            href_uri_r,
            href_uri_m,
        } => {
            writeln!(out, "PASS {uri}")?;
            writeln!(out, "  URI-R: {}", describe_link(href_uri_r))?;
            writeln!(out, "  URI-M: {}", describe_link(href_uri_m))
        }
        LogCard::Failed { uri, error } => {
            writeln!(out, "FAIL {uri}")?;
            writeln!(out, "  Error: {error}")
        }
    }
}

/// Link target plus archive date when the fragment is an anchor, else the
/// fragment itself.
fn describe_link(fragment: &str) -> String {
    match parse_robust_link(fragment) {
        Some(link) => match link.version_date {
            Some(date) => format!("{} ({date})", link.href),
            None => link.href,
        },
        None => fragment.to_string(),
    }
}
