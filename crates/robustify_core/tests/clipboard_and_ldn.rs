use pretty_assertions::assert_eq;
use robustify_core::{
    update, AppState, Effect, HrefField, LdnStatus, Msg, Observation, Toast, NO_LDN_ALERT,
    NO_LD_SERVER_ALERT,
};

const KEY: &str = "5d41402abc4b2a76b9719d911017c592";

fn with_results() -> AppState {
    let state = AppState::with_rows(
        KEY,
        vec![
            vec!["https://a.example.com".to_string()],
            vec!["https://b.example.com".to_string()],
        ],
    );
    let (state, _) = update(state, Msg::SelectAllToggled(true));
    let (state, _) = update(state, Msg::RobustifySelected);
    let (state, _) = update(
        state,
        Msg::ObservationReceived(Observation::Failed {
            uri: "https://b.example.com".to_string(),
            error: "no memento".to_string(),
        }),
    );
    let (state, _) = update(
        state,
        Msg::ObservationReceived(Observation::Passed {
            uri: "https://a.example.com".to_string(),
            href_uri_r: "<a href='https://a.example.com'\n  data-versiondate='2024-01-01'>a</a>"
                .to_string(),
            href_uri_m: "<a href='https://web.archive.org/a'>a</a>".to_string(),
        }),
    );
    let (state, _) = update(state, Msg::StreamEnded);
    state
}

#[test]
fn copy_clicked_emits_clipboard_text() {
    let state = with_results();
    let (_, effects) = update(
        state,
        Msg::CopyClicked {
            card: 1,
            field: HrefField::UriR,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::CopyToClipboard {
            text: "<a href=\"https://a.example.com\" data-versiondate=\"2024-01-01\">a</a>"
                .to_string()
        }]
    );
}

#[test]
fn copy_on_failed_card_or_missing_card_does_nothing() {
    let state = with_results();
    let (state, effects) = update(
        state,
        Msg::CopyClicked {
            card: 0,
            field: HrefField::UriM,
        },
    );
    assert!(effects.is_empty());
    let (_, effects) = update(
        state,
        Msg::CopyClicked {
            card: 9,
            field: HrefField::UriM,
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn toast_follows_successful_copy_only() {
    let state = with_results();
    let (state, effects) = update(state, Msg::CopyFinished(Ok(())));
    assert_eq!(effects, vec![Effect::ShowToast(Toast::Copied)]);
    let (_, effects) = update(state, Msg::CopyFinished(Err("no clipboard".to_string())));
    assert!(effects.is_empty());
}

#[test]
fn copy_all_joins_passed_cards() {
    let state = with_results();
    let (_, effects) = update(
        state,
        Msg::CopyAllClicked {
            field: HrefField::UriM,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::CopyToClipboard {
            text: "<a href=\"https://web.archive.org/a\">a</a>".to_string()
        }]
    );
}

#[test]
fn ldn_requires_server_url() {
    let state = AppState::new(KEY);
    let (state, effects) = update(state, Msg::LdnRequested);
    assert_eq!(
        effects,
        vec![Effect::Alert {
            message: NO_LD_SERVER_ALERT.to_string()
        }]
    );
    let (_, effects) = update(state, Msg::LdnSendRequested);
    assert_eq!(effects.len(), 1);
}

#[test]
fn ldn_fetch_preview_and_send_flow() {
    let state = AppState::new(KEY);
    let (state, _) = update(
        state,
        Msg::LdServerUrlChanged("  https://ld.example.org/  ".to_string()),
    );
    assert_eq!(state.view().ldn.ld_server_url, "https://ld.example.org/");

    let (state, effects) = update(state, Msg::LdnPreviewRequested);
    assert_eq!(
        effects,
        vec![Effect::Alert {
            message: NO_LDN_ALERT.to_string()
        }]
    );

    let (state, effects) = update(state, Msg::LdnRequested);
    assert_eq!(
        effects,
        vec![Effect::FetchLdn {
            key: KEY.to_string(),
            ld_server_url: "https://ld.example.org/".to_string(),
        }]
    );
    assert_eq!(state.view().ldn.status, LdnStatus::Loading);

    let ldn = "{\n  \"type\": \"Offer\"\n}".to_string();
    let (state, _) = update(state, Msg::LdnLoaded(Ok(ldn.clone())));
    assert_eq!(state.view().ldn.ldn.as_deref(), Some(ldn.as_str()));
    assert_eq!(state.view().ldn.status, LdnStatus::Loaded);

    let (state, effects) = update(state, Msg::LdnPreviewRequested);
    assert_eq!(effects, vec![Effect::PreviewLdn { ldn: ldn.clone() }]);
    let (state, effects) = update(
        state,
        Msg::LdnPreviewReady(Ok("http://localhost:5000/preview?pdf_url=x".to_string())),
    );
    assert_eq!(
        effects,
        vec![Effect::OpenUrl {
            url: "http://localhost:5000/preview?pdf_url=x".to_string()
        }]
    );

    let (state, effects) = update(state, Msg::LdnSendRequested);
    assert_eq!(
        effects,
        vec![Effect::SendLdn {
            key: KEY.to_string(),
            ld_server_url: "https://ld.example.org/".to_string(),
        }]
    );
    assert_eq!(state.view().ldn.status, LdnStatus::Sending);
    let (state, _) = update(state, Msg::LdnSent(Ok(201)));
    assert_eq!(state.view().ldn.status, LdnStatus::Sent(201));

    let (state, _) = update(state, Msg::LdnSent(Err("http status 400".to_string())));
    assert_eq!(
        state.view().ldn.status,
        LdnStatus::Failed("http status 400".to_string())
    );
}
