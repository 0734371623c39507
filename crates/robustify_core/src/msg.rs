use crate::{HrefField, Observation, RowId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User flipped the checkbox of a row.
    RowToggled { row: RowId },
    /// User flipped the "all" selector.
    SelectAllToggled(bool),
    /// User clicked the robustify button for the current selection.
    RobustifySelected,
    /// User clicked the robustify button attached to a single row.
    RobustifyGroup { row: RowId },
    /// One record arrived over the result stream.
    ObservationReceived(Observation),
    /// The result stream was fully consumed.
    StreamEnded,
    /// The result stream could not be opened or broke off.
    StreamFailed { message: String },
    /// User clicked a Copy button on a passed card.
    CopyClicked { card: usize, field: HrefField },
    /// Copy the given fragment of every passed card, one per line.
    CopyAllClicked { field: HrefField },
    /// Clipboard write finished.
    CopyFinished(Result<(), String>),
    /// User edited the LD server URL input.
    LdServerUrlChanged(String),
    LdnRequested,
    LdnLoaded(Result<String, String>),
    LdnPreviewRequested,
    /// Preview page location, or the failure that prevented it.
    LdnPreviewReady(Result<String, String>),
    LdnSendRequested,
    /// HTTP status returned by the LD server inbox, or the failure.
    LdnSent(Result<u16, String>),
    /// Fallback for placeholder wiring.
    NoOp,
}
