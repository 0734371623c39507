//! Robustify core: pure state machine, view-model and HTML card helpers.
mod canonical;
mod card;
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use canonical::{
    build_rows, canonicalize_url, pick_unique_urls, Blacklist, RowFilter, RowsBuild, UrlError,
};
pub use card::{collapse_whitespace, copy_text, escape_html, LogCard};
pub use effect::{Effect, Toast, NO_LD_SERVER_ALERT, NO_LDN_ALERT, NO_SELECTION_ALERT};
pub use msg::Msg;
pub use state::{AppState, HrefField, LdnStatus, Observation, RowId, RunPhase, Tone};
pub use update::update;
pub use view_model::{AppViewModel, LdnView, ProgressView, RowView};
