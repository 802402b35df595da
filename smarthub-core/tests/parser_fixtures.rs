//! Parser tests against recorded poll responses.

use serde_json::Value;
use smarthub_core::{ReadingKind, extract_readings};

fn fixture(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

#[test]
fn test_complete_report() {
    let doc = fixture(include_str!("fixtures/poll_complete.json"));

    let readings = extract_readings(&doc).unwrap().unwrap();
    assert_eq!(readings.get(ReadingKind::Usage), Some(1187.0));
    assert_eq!(readings.get(ReadingKind::Cost), Some(148.37));
    assert_eq!(readings.get(ReadingKind::Demand), None);
}

#[test]
fn test_pending_report_has_no_readings() {
    let doc = fixture(include_str!("fixtures/poll_pending.json"));
    assert!(extract_readings(&doc).unwrap().is_none());
}

#[test]
fn test_reading_set_json_shape() {
    let doc = fixture(include_str!("fixtures/poll_complete.json"));
    let readings = extract_readings(&doc).unwrap().unwrap();

    let json = serde_json::to_value(readings).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "current_energy_usage": 1187.0,
            "current_energy_cost": 148.37
        })
    );
}
