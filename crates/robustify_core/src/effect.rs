pub const NO_SELECTION_ALERT: &str = "Please select at least one URL first.";
pub const NO_LD_SERVER_ALERT: &str = "Please enter the URL of an LD server first.";
pub const NO_LDN_ALERT: &str = "Please fetch the LDN before previewing it.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST the URIs to the robustify endpoint and stream the results back.
    Robustify { key: String, uris: Vec<String> },
    CopyToClipboard { text: String },
    ShowToast(Toast),
    /// Blocking notice for the user; no state was changed.
    Alert { message: String },
    FetchLdn { key: String, ld_server_url: String },
    PreviewLdn { ldn: String },
    SendLdn { key: String, ld_server_url: String },
    OpenUrl { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toast {
    Copied,
}

impl Toast {
    pub fn text(self) -> &'static str {
        match self {
            Toast::Copied => "Copied to clipboard",
        }
    }
}
