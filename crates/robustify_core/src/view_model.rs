use crate::{LdnStatus, LogCard, RowId, RunPhase, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressView {
    pub pass: usize,
    pub fail: usize,
    pub total: usize,
}

impl ProgressView {
    pub fn text(&self) -> String {
        format!(
            "Pass: {}, Fail: {}, Total: {}",
            self.pass, self.fail, self.total
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub key: String,
    pub phase: RunPhase,
    pub progress: ProgressView,
    pub spinner_visible: bool,
    pub controls_enabled: bool,
    pub all_selected: bool,
    pub rows: Vec<RowView>,
    pub log: Vec<LogCard>,
    pub last_error: Option<String>,
    pub ldn: LdnView,
    pub dirty: bool,
}

impl AppViewModel {
    /// Concatenated card markup of the log element.
    pub fn log_html(&self) -> String {
        self.log.iter().map(LogCard::to_html).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub row: RowId,
    pub uris: Vec<String>,
    pub checked: bool,
    pub tone: Tone,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LdnView {
    pub ld_server_url: String,
    pub ldn: Option<String>,
    pub status: LdnStatus,
}
