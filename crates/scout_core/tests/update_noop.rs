use scout_core::{update, AppState, ErrorDomain, Msg};

#[test]
fn update_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn stopping_without_observation_emits_nothing() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::StopObservingRequested);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn dismissing_errors_on_fresh_state_only_marks_dirty() {
    let (mut next, effects) = update(AppState::new(), Msg::ErrorsDismissed(ErrorDomain::Export));

    assert!(effects.is_empty());
    assert!(next.consume_dirty());
    assert_eq!(next.view().export.error, None);
}
