use crate::effect::{NO_LDN_ALERT, NO_LD_SERVER_ALERT, NO_SELECTION_ALERT};
use crate::{AppState, Effect, HrefField, LdnStatus, Msg, RunPhase, Toast};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RowToggled { row } => {
            // Disabled inputs do not react while a stream is open.
            if state.controls_enabled() && state.toggle_row(row) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SelectAllToggled(checked) => {
            if state.controls_enabled() && state.row_count() > 0 {
                state.set_all_checked(checked);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::RobustifySelected => {
            if !state.controls_enabled() {
                return (state, Vec::new());
            }
            let uris = state.selected_uris();
            if uris.is_empty() {
                vec![alert(NO_SELECTION_ALERT)]
            } else {
                start_run(&mut state, uris)
            }
        }
        Msg::RobustifyGroup { row } => {
            if !state.controls_enabled() {
                return (state, Vec::new());
            }
            match state.row_uris(row) {
                Some(uris) if !uris.is_empty() => start_run(&mut state, uris),
                Some(_) => vec![alert(NO_SELECTION_ALERT)],
                None => Vec::new(),
            }
        }
        Msg::ObservationReceived(observation) => {
            if state.phase() == RunPhase::Streaming && !state.has_seen(observation.uri()) {
                state.record(observation);
            }
            Vec::new()
        }
        Msg::StreamEnded => {
            if state.phase() == RunPhase::Streaming {
                state.finish_run(None);
            }
            Vec::new()
        }
        Msg::StreamFailed { message } => {
            if state.phase() == RunPhase::Streaming {
                state.finish_run(Some(message));
            }
            Vec::new()
        }
        Msg::CopyClicked { card, field } => match state.log().get(card) {
            Some(card) => card
                .copy_text(field)
                .map(|text| vec![Effect::CopyToClipboard { text }])
                .unwrap_or_default(),
            None => Vec::new(),
        },
        Msg::CopyAllClicked { field } => copy_all(&state, field),
        Msg::CopyFinished(result) => match result {
            Ok(()) => vec![Effect::ShowToast(Toast::Copied)],
            Err(_) => Vec::new(),
        },
        Msg::LdServerUrlChanged(url) => {
            let url = url.trim().to_string();
            if url != state.ld_server_url() {
                state.set_ld_server_url(url);
            }
            Vec::new()
        }
        Msg::LdnRequested => {
            if state.ld_server_url().is_empty() {
                vec![alert(NO_LD_SERVER_ALERT)]
            } else {
                state.set_ldn_status(LdnStatus::Loading);
                vec![Effect::FetchLdn {
                    key: state.key().to_string(),
                    ld_server_url: state.ld_server_url().to_string(),
                }]
            }
        }
        Msg::LdnLoaded(result) => {
            match result {
                Ok(text) => {
                    state.set_ldn_text(text);
                    state.set_ldn_status(LdnStatus::Loaded);
                }
                Err(message) => state.set_ldn_status(LdnStatus::Failed(message)),
            }
            Vec::new()
        }
        Msg::LdnPreviewRequested => match state.ldn_text() {
            Some(ldn) => {
                let ldn = ldn.to_string();
                state.set_ldn_status(LdnStatus::Previewing);
                vec![Effect::PreviewLdn { ldn }]
            }
            None => vec![alert(NO_LDN_ALERT)],
        },
        Msg::LdnPreviewReady(result) => match result {
            Ok(url) => {
                state.set_ldn_status(LdnStatus::Loaded);
                vec![Effect::OpenUrl { url }]
            }
            Err(message) => {
                state.set_ldn_status(LdnStatus::Failed(message));
                Vec::new()
            }
        },
        Msg::LdnSendRequested => {
            if state.ld_server_url().is_empty() {
                vec![alert(NO_LD_SERVER_ALERT)]
            } else {
                state.set_ldn_status(LdnStatus::Sending);
                vec![Effect::SendLdn {
                    key: state.key().to_string(),
                    ld_server_url: state.ld_server_url().to_string(),
                }]
            }
        }
        Msg::LdnSent(result) => {
            let status = match result {
                Ok(code) => LdnStatus::Sent(code),
                Err(message) => LdnStatus::Failed(message),
            };
            state.set_ldn_status(status);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_run(state: &mut AppState, uris: Vec<String>) -> Vec<Effect> {
    state.start_run(uris.len());
    vec![Effect::Robustify {
        key: state.key().to_string(),
        uris,
    }]
}

fn copy_all(state: &AppState, field: HrefField) -> Vec<Effect> {
    let lines: Vec<String> = state
        .log()
        .iter()
        .filter_map(|card| card.copy_text(field))
        .collect();
    if lines.is_empty() {
        return Vec::new();
    }
    vec![Effect::CopyToClipboard {
        text: lines.join("\n"),
    }]
}

fn alert(message: &str) -> Effect {
    Effect::Alert {
        message: message.to_string(),
    }
}
