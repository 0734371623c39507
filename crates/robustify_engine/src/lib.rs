//! Robustify engine: HTTP plumbing for the robustify stream and the LDN calls.
mod engine;
mod ldn;
mod lines;
mod links;
mod persist;
mod record;
mod robustify;
mod settings;
mod types;

pub use engine::EngineHandle;
pub use ldn::LdnClient;
pub use lines::{is_record_candidate, LineBuffer};
pub use links::{parse_robust_link, RobustLink};
pub use persist::{write_atomic, PersistError};
pub use record::{parse_record, RobustifyRecord, UNKNOWN_ERROR};
pub use robustify::{ChannelProgressSink, ProgressSink, ReqwestRobustifier, Robustifier};
pub use settings::ClientSettings;
pub use types::{EngineError, EngineEvent, FailureKind, Mappings, RunId, StreamSummary};
