use cargodesk::model::{AirWaybill, CargoPiece, Dimensions};
use cargodesk::session::{AppState, SavedSearch};
use cargodesk::weight::NewPiece;

fn awb(no: &str) -> AirWaybill {
    AirWaybill {
        awb_no: no.into(),
        ..AirWaybill::default()
    }
}

fn piece(number: &str, weight: f64) -> CargoPiece {
    CargoPiece::new(
        "176-12345675",
        NewPiece {
            piece_number: number.into(),
            dimensions: Dimensions::new(100.0, 100.0, 100.0),
            actual_weight_kg: weight,
            ..NewPiece::default()
        },
    )
    .unwrap()
}

#[test]
fn missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::load(&dir.path().join("session.json")).unwrap();
    assert!(state.awb_details().is_none());
    assert!(state.pieces().is_empty());
    assert_eq!(state.last_search(), &SavedSearch::default());
}

#[test]
fn pieces_refresh_awb_totals() {
    let mut state = AppState::default();
    state.select_awb(awb("176-12345675"));
    state.set_pieces(vec![piece("1", 50.0), piece("2", 200.0)]);

    let details = state.awb_details().unwrap();
    assert_eq!(details.pieces, 2);
    assert_eq!(details.weight, Some(250.0));
    assert_eq!(details.chargeable_weight, Some(366.67));
}

#[test]
fn switching_awb_drops_pieces() {
    let mut state = AppState::default();
    state.select_awb(awb("176-12345675"));
    state.set_pieces(vec![piece("1", 50.0)]);

    state.select_awb(awb("176-12345675"));
    assert_eq!(state.pieces().len(), 1);

    state.select_awb(awb("020-00000001"));
    assert!(state.pieces().is_empty());
}

#[test]
fn clear_forgets_awb_and_pieces() {
    let mut state = AppState::default();
    state.select_awb(awb("176-12345675"));
    state.set_pieces(vec![piece("1", 50.0)]);
    state.clear_awb();
    assert!(state.awb_details().is_none());
    assert!(state.pieces().is_empty());
}

#[test]
fn state_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let mut state = AppState::default();
    state.select_awb(awb("176-12345675"));
    state.set_pieces(vec![piece("1", 50.0)]);
    state.set_last_search(SavedSearch {
        query: "john doe".into(),
        statuses: vec!["Booked".into()],
        from: Some("2024-01-01".into()),
        to: None,
    });
    state.save(&path).unwrap();

    let loaded = AppState::load(&path).unwrap();
    assert_eq!(loaded.last_search().query, "john doe");
    assert_eq!(loaded.awb_details().unwrap().awb_no, "176-12345675");
    assert_eq!(loaded.pieces().len(), 1);
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert_eq!(AppState::load(&path).unwrap_err().kind(), "decode_error");
}
