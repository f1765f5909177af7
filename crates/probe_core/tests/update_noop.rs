use probe_core::{update, AppState, Msg};

#[test]
fn update_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn tick_does_not_mark_dirty() {
    let mut state = AppState::new();
    assert!(!state.consume_dirty());
    let (mut next, effects) = update(state, Msg::Tick);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}
