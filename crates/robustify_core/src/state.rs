use crate::card::LogCard;
use crate::view_model::{AppViewModel, LdnView, ProgressView, RowView};

pub type RowId = usize;

/// Button color of a row: untouched, every URI passed, or some URI failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Primary,
    Success,
    Warning,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Primary => "btn-primary",
            Tone::Success => "btn-success",
            Tone::Warning => "btn-warning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Streaming,
    Ended,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrefField {
    UriR,
    UriM,
}

impl HrefField {
    pub fn label(self) -> &'static str {
        match self {
            HrefField::UriR => "URI-R",
            HrefField::UriM => "URI-M",
        }
    }
}

/// Result for one URI as reported by the robustify stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Passed {
        uri: String,
        href_uri_r: String,
        href_uri_m: String,
    },
    Failed {
        uri: String,
        error: String,
    },
}

impl Observation {
    pub fn uri(&self) -> &str {
        match self {
            Observation::Passed { uri, .. } | Observation::Failed { uri, .. } => uri,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Observation::Passed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LdnStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Previewing,
    Sending,
    Sent(u16),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct UrlRow {
    uris: Vec<String>,
    checked: bool,
    tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct RunState {
    pass_urls: Vec<String>,
    fail_urls: Vec<String>,
    total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct LdnPanel {
    ld_server_url: String,
    ldn: Option<String>,
    status: LdnStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    key: String,
    rows: Vec<UrlRow>,
    phase: RunPhase,
    run: RunState,
    log: Vec<LogCard>,
    last_error: Option<String>,
    ldn: LdnPanel,
    dirty: bool,
}

impl AppState {
    /// Empty page for the document identified by `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Page for `key` with one row per URI group; rows start unchecked.
    pub fn with_rows(key: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|uris| UrlRow {
                uris,
                checked: false,
                tone: Tone::Primary,
            })
            .collect();
        Self {
            key: key.into(),
            rows,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let controls_enabled = self.controls_enabled();
        AppViewModel {
            key: self.key.clone(),
            phase: self.phase,
            progress: ProgressView {
                pass: self.run.pass_urls.len(),
                fail: self.run.fail_urls.len(),
                total: self.run.total,
            },
            spinner_visible: self.phase == RunPhase::Streaming,
            controls_enabled,
            all_selected: !self.rows.is_empty() && self.rows.iter().all(|row| row.checked),
            rows: self
                .rows
                .iter()
                .enumerate()
                .map(|(row, r)| RowView {
                    row,
                    uris: r.uris.clone(),
                    checked: r.checked,
                    tone: r.tone,
                    enabled: controls_enabled,
                })
                .collect(),
            log: self.log.clone(),
            last_error: self.last_error.clone(),
            ldn: LdnView {
                ld_server_url: self.ldn.ld_server_url.clone(),
                ldn: self.ldn.ldn.clone(),
                status: self.ldn.status.clone(),
            },
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn pass_urls(&self) -> &[String] {
        &self.run.pass_urls
    }

    pub fn fail_urls(&self) -> &[String] {
        &self.run.fail_urls
    }

    pub fn log(&self) -> &[LogCard] {
        &self.log
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn controls_enabled(&self) -> bool {
        self.phase != RunPhase::Streaming
    }

    pub(crate) fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn toggle_row(&mut self, row: RowId) -> bool {
        match self.rows.get_mut(row) {
            Some(r) => {
                r.checked = !r.checked;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_all_checked(&mut self, checked: bool) {
        for row in &mut self.rows {
            row.checked = checked;
        }
    }

    /// URIs of the checked rows, in row order, first occurrence wins.
    pub(crate) fn selected_uris(&self) -> Vec<String> {
        dedupe(
            self.rows
                .iter()
                .filter(|row| row.checked)
                .flat_map(|row| row.uris.iter()),
        )
    }

    pub(crate) fn row_uris(&self, row: RowId) -> Option<Vec<String>> {
        self.rows.get(row).map(|r| dedupe(r.uris.iter()))
    }

    pub(crate) fn start_run(&mut self, total: usize) {
        self.log.clear();
        self.run = RunState {
            pass_urls: Vec::new(),
            fail_urls: Vec::new(),
            total,
        };
        self.last_error = None;
        self.phase = RunPhase::Streaming;
        self.dirty = true;
    }

    pub(crate) fn has_seen(&self, uri: &str) -> bool {
        self.run.pass_urls.iter().any(|u| u == uri) || self.run.fail_urls.iter().any(|u| u == uri)
    }

    pub(crate) fn record(&mut self, observation: Observation) {
        let uri = observation.uri().to_string();
        if observation.is_ok() {
            self.run.pass_urls.push(uri);
        } else {
            self.run.fail_urls.push(uri);
        }
        self.log.push(LogCard::from_observation(observation));
        self.recolor_rows();
        self.dirty = true;
    }

    pub(crate) fn finish_run(&mut self, error: Option<String>) {
        self.phase = if error.is_some() {
            RunPhase::Failed
        } else {
            RunPhase::Ended
        };
        self.last_error = error;
        self.dirty = true;
    }

    pub(crate) fn ld_server_url(&self) -> &str {
        &self.ldn.ld_server_url
    }

    pub(crate) fn set_ld_server_url(&mut self, url: String) {
        self.ldn.ld_server_url = url;
        self.dirty = true;
    }

    pub(crate) fn ldn_text(&self) -> Option<&str> {
        self.ldn.ldn.as_deref()
    }

    pub(crate) fn set_ldn_text(&mut self, text: String) {
        self.ldn.ldn = Some(text);
        self.dirty = true;
    }

    pub(crate) fn set_ldn_status(&mut self, status: LdnStatus) {
        self.ldn.status = status;
        self.dirty = true;
    }

    // Rows only move away from Primary: all passed -> Success, any failed -> Warning.
    fn recolor_rows(&mut self) {
        let pass = &self.run.pass_urls;
        let fail = &self.run.fail_urls;
        for row in &mut self.rows {
            if row.uris.is_empty() {
                continue;
            }
            if row.uris.iter().any(|u| fail.contains(u)) {
                if matches!(row.tone, Tone::Primary | Tone::Success) {
                    row.tone = Tone::Warning;
                }
            } else if row.tone == Tone::Primary && row.uris.iter().all(|u| pass.contains(u)) {
                row.tone = Tone::Success;
            }
        }
    }
}

fn dedupe<'a>(uris: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for uri in uris {
        if !out.contains(uri) {
            out.push(uri.clone());
        }
    }
    out
}
