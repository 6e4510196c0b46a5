use crate::error::registry::RegistryError;
use crate::registry::CubeFaceRegistry;

use models::{FaceCells, FaceId};

fn cells(raw: &str) -> FaceCells {
    raw.parse().unwrap()
}

/// **VALUE**: Verifies repeated detections of one face overwrite a single record.
///
/// **WHY THIS MATTERS**: The service re-reports a face on every frame it is in view.
/// An appending store would grow without bound and send duplicate faces to the solver.
///
/// **BUG THIS CATCHES**: Would catch if upsert appends or keeps the first detection.
#[test]
fn given_two_detections_of_same_face_when_upserted_then_one_record_with_latest_cells() {
    // GIVEN
    let mut registry = CubeFaceRegistry::new();

    // WHEN
    registry.upsert(FaceId::Yellow, cells("YYYYYYYYY"), false);
    registry.upsert(FaceId::Yellow, cells("YRYYYYYGY"), false);

    // THEN
    assert_eq!(registry.iter().count(), 6);
    assert_eq!(
        registry.iter().filter(|r| r.face == FaceId::Yellow).count(),
        1
    );
    assert_eq!(registry.get(FaceId::Yellow).cells, cells("YRYYYYYGY"));
    assert_eq!(registry.detected_count(), 1);
}

/// **VALUE**: Verifies confirming an undetected face fails.
///
/// **BUG THIS CATCHES**: Would catch if `confirm` marks placeholders as confirmed,
/// which would let `get_solution` go out with unknown stickers.
#[test]
fn given_undetected_face_when_confirmed_then_not_found() {
    let mut registry = CubeFaceRegistry::new();

    let result = registry.confirm(FaceId::Blue);

    match result {
        Err(RegistryError::NotFound { face, .. }) => assert_eq!(face, FaceId::Blue),
        Ok(record) => panic!("Expected NotFound, got {record:?}"),
    }
    assert!(!registry.get(FaceId::Blue).confirmed);
}

#[test]
fn given_confirmed_face_when_rescanned_then_cleared_and_unconfirmed() {
    // GIVEN
    let mut registry = CubeFaceRegistry::new();
    registry.upsert(FaceId::Red, cells("RRRRRRRRR"), false);
    registry.confirm(FaceId::Red).unwrap();

    // WHEN
    registry.rescan(FaceId::Red);

    // THEN
    let record = registry.get(FaceId::Red);
    assert!(!record.confirmed);
    assert!(record.cells.is_unknown());
    assert!(registry.confirm(FaceId::Red).is_err());
}

#[test]
fn given_all_faces_confirmed_when_counted_then_all_confirmed() {
    let mut registry = CubeFaceRegistry::new();
    for face in FaceId::ALL {
        registry.upsert(face, FaceCells::uniform(face), true);
    }

    assert_eq!(registry.confirmed_count(), 6);
    assert!(registry.all_confirmed());
    assert!(!registry.none_detected());

    registry.reset();
    assert!(registry.none_detected());
    assert_eq!(registry.iter().count(), 6);
}
