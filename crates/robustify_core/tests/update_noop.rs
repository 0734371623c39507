use robustify_core::{update, AppState, Msg};

#[test]
fn update_is_noop() {
    let state = AppState::with_rows("abc", vec![vec!["https://example.com".to_string()]]);
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn stream_messages_outside_a_run_are_ignored() {
    let state = AppState::new("abc");
    let (next, effects) = update(state.clone(), Msg::StreamEnded);
    assert_eq!(state, next);
    assert!(effects.is_empty());

    let (next, _) = update(
        next,
        Msg::StreamFailed {
            message: "boom".to_string(),
        },
    );
    assert_eq!(state, next);
}
