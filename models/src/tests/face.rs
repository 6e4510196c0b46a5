use crate::face::{CELLS_PER_FACE, FaceCells, FaceId, FaceRecord, Sticker};
use crate::ModelError;

/// **VALUE**: Verifies that face cells parse from the nine-letter wire string.
///
/// **WHY THIS MATTERS**: Every `face_detected` message carries its colors as a string
/// like `"YYRWYGBOU"`. The registry keys faces off the center of this parse.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Cell order is reversed or shuffled
/// - The unknown marker `U` is rejected instead of mapped to `Sticker::Unknown`
#[test]
fn given_nine_symbol_string_when_parsed_then_cells_are_in_row_major_order() {
    // GIVEN: A mixed face string
    let raw = "YYRWYGBOU";

    // WHEN: Parsing
    let cells: FaceCells = raw.parse().unwrap();

    // THEN: Stickers follow the string order
    let stickers = cells.stickers();
    assert_eq!(stickers[0], Sticker::Face(FaceId::Yellow));
    assert_eq!(stickers[2], Sticker::Face(FaceId::Red));
    assert_eq!(stickers[8], Sticker::Unknown);
    assert_eq!(cells.center(), Sticker::Face(FaceId::Yellow));
    assert_eq!(cells.known_count(), CELLS_PER_FACE - 1);
    assert_eq!(cells.to_string(), raw);
}

/// **VALUE**: Verifies that a cell string of the wrong length is rejected.
///
/// **WHY THIS MATTERS**: A face always has exactly nine stickers. Accepting eight or
/// ten would shift the center cell and file the face under the wrong key.
///
/// **BUG THIS CATCHES**: Would catch if the length check is removed.
#[test]
fn given_short_cell_string_when_parsed_then_returns_validation_error() {
    // GIVEN: Eight cells
    let raw = "YYYYYYYY";

    // WHEN: Parsing
    let result = raw.parse::<FaceCells>();

    // THEN: Validation error naming the count
    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert!(message.contains("Expected 9 cells"));
        }
        Ok(cells) => panic!("Expected error, got {cells}"),
    }
}

/// **VALUE**: Verifies that stray letters are rejected rather than silently mapped.
///
/// **BUG THIS CATCHES**: Would catch if `Sticker::from_symbol` falls back to Unknown
/// for any letter, hiding detection bugs upstream.
#[test]
fn given_unrecognized_symbol_when_parsed_then_returns_validation_error() {
    let result = "YYYYXYYYY".parse::<FaceCells>();

    assert!(result.is_err());
}

/// **VALUE**: Verifies face identifiers accept both letters and names.
///
/// **WHY THIS MATTERS**: The service reports faces as `"Y"` in some messages and as
/// `"yellow"` in calibration messages.
#[test]
fn given_letter_or_name_when_face_id_parsed_then_both_resolve() {
    assert_eq!("y".parse::<FaceId>().unwrap(), FaceId::Yellow);
    assert_eq!("Orange".parse::<FaceId>().unwrap(), FaceId::Orange);
    assert_eq!(" W ".parse::<FaceId>().unwrap(), FaceId::White);
    assert!("purple".parse::<FaceId>().is_err());
}

/// **VALUE**: Verifies canonical order is Y, W, R, G, B, O and `index()` matches it.
///
/// **WHY THIS MATTERS**: Calibration steps and registry slots both index by this order.
/// Reordering the enum would silently calibrate the wrong color.
///
/// **BUG THIS CATCHES**: Would catch if enum variants are reordered.
#[test]
fn given_canonical_faces_when_indexed_then_order_is_ywrgbo() {
    // GIVEN / WHEN
    let symbols: String = FaceId::ALL.iter().map(|face| face.symbol()).collect();

    // THEN
    assert_eq!(symbols, "YWRGBO");
    for (position, face) in FaceId::ALL.iter().enumerate() {
        assert_eq!(face.index(), position);
    }
}

/// **VALUE**: Verifies serde uses the string forms for faces and cells.
///
/// **BUG THIS CATCHES**: Would catch if derive attributes change the wire format to
/// the enum variant names.
#[test]
fn given_face_and_cells_when_serialized_then_uses_symbol_strings() {
    // GIVEN
    let cells = FaceCells::uniform(FaceId::Green);

    // WHEN
    let face_json = serde_json::to_string(&FaceId::Green).unwrap();
    let cells_json = serde_json::to_string(&cells).unwrap();

    // THEN
    assert_eq!(face_json, "\"G\"");
    assert_eq!(cells_json, "\"GGGGGGGGG\"");
}

/// **VALUE**: Verifies a placeholder record is neither detected nor confirmed.
///
/// **WHY THIS MATTERS**: The registry starts with six placeholders. If a placeholder
/// counted as detected, confirming a face that was never scanned would succeed.
#[test]
fn given_placeholder_record_when_inspected_then_not_detected() {
    let record = FaceRecord::placeholder(FaceId::Blue);

    assert!(!record.is_detected());
    assert!(!record.confirmed);
    assert!(record.cells.is_unknown());
}
