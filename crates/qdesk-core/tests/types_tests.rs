//! Integration tests for qdesk-core types

use qdesk_core::{ActionKind, Error, RLState, TradeAction};

#[test]
fn test_action_constructors() {
    assert_eq!(TradeAction::buy(25.0).kind, ActionKind::Buy);
    assert_eq!(TradeAction::sell(50.0).kind, ActionKind::Sell);
    assert_eq!(TradeAction::hedge(100.0).kind, ActionKind::Hedge);
    assert_eq!(TradeAction::close(75.0).kind, ActionKind::Close);
    assert_eq!(TradeAction::hold().size_percent, 0.0);
}

#[test]
fn test_action_json_shape() {
    let action = TradeAction::hedge(50.0).with_symbol("QQQ");
    let json = serde_json::to_value(&action).unwrap();

    assert_eq!(json["kind"], "hedge");
    assert_eq!(json["size_percent"], 50.0);
    assert_eq!(json["symbol"], "QQQ");
}

#[test]
fn test_state_round_trip_preserves_optionals() {
    let state = RLState {
        position_delta: Some(35.0),
        position_size: Some(2.0),
        days_to_expiration: Some(21.0),
        profit_pct: Some(12.5),
        ..RLState::default()
    };

    let json = serde_json::to_string(&state).unwrap();
    let parsed: RLState = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, state);
}

#[test]
fn test_error_display() {
    let err = Error::Config("epsilon out of range".to_string());
    assert!(err.to_string().contains("epsilon out of range"));

    let err = Error::Snapshot("unsupported version".to_string());
    assert!(err.to_string().starts_with("Snapshot error"));
}
