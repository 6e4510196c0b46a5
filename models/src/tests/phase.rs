use crate::{BoundingBox, SessionPhase, StatusLine, StatusSeverity};

#[test]
fn given_phases_when_serialized_then_uses_snake_case_labels() {
    let json = serde_json::to_string(&SessionPhase::ErrorRecoverable).unwrap();

    assert_eq!(json, "\"error_recoverable\"");
    assert_eq!(SessionPhase::AwaitingCube.to_string(), "awaiting_cube");
    assert_eq!(SessionPhase::default(), SessionPhase::Idle);
}

/// **VALUE**: Verifies only active workflow phases count as streaming.
///
/// **BUG THIS CATCHES**: Would catch if `Solved` or an error phase is marked as
/// streaming, which would keep the camera sending after the session ended.
#[test]
fn given_terminal_phases_when_checked_then_not_streaming() {
    assert!(SessionPhase::ScanningFaces.is_streaming());
    assert!(!SessionPhase::Solved.is_streaming());
    assert!(!SessionPhase::ErrorFatal.is_streaming());
    assert!(!SessionPhase::Idle.is_streaming());
}

#[test]
fn given_status_constructors_when_used_then_set_severity() {
    assert_eq!(StatusLine::warning("glare").severity, StatusSeverity::Warning);
    assert_eq!(StatusLine::fatal("down").to_string(), "down");
}

#[test]
fn given_bbox_array_when_deserialized_then_fields_map_in_order() {
    let bbox: BoundingBox = serde_json::from_str("[4, 8, 120, 90]").unwrap();

    assert_eq!(bbox, BoundingBox::new(4, 8, 120, 90));
    assert!(!bbox.is_empty());
    assert!(BoundingBox::new(0, 0, 0, 10).is_empty());
}
