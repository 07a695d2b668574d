use cargodesk::error::CargoError;
use cargodesk::model::{AirWaybill, CargoPiece, Dimensions, PieceStatus, SpecialHandling};
use cargodesk::weight::{
    chargeable_weight_kg, compute_chargeable_weight, compute_total_weight, compute_volume,
    ensure_unique_piece_number, summarize_pieces, validate_dimensions, validate_weight, NewPiece,
};
use serde_json::json;

fn cube(side: f64) -> Dimensions {
    Dimensions::new(side, side, side)
}

fn piece(number: &str, dims: Dimensions, weight: f64) -> CargoPiece {
    CargoPiece::new(
        "176-12345675",
        NewPiece {
            piece_number: number.into(),
            dimensions: dims,
            actual_weight_kg: weight,
            ..NewPiece::default()
        },
    )
    .unwrap()
}

#[test]
fn volume_is_product_of_sides() {
    assert_eq!(compute_volume(Some(100.0), Some(50.0), Some(40.0)), 200_000.0);
}

#[test]
fn volume_is_zero_when_a_side_is_missing_or_zero() {
    assert_eq!(compute_volume(None, Some(50.0), Some(40.0)), 0.0);
    assert_eq!(compute_volume(Some(100.0), Some(0.0), Some(40.0)), 0.0);
}

#[test]
fn volumetric_weight_wins_for_light_bulky_piece() {
    assert_eq!(compute_chargeable_weight("50", &cube(100.0)), "166.67");
}

#[test]
fn actual_weight_wins_for_dense_piece() {
    assert_eq!(compute_chargeable_weight("200", &cube(100.0)), "200.00");
}

#[test]
fn no_dimensions_means_actual_weight() {
    assert_eq!(compute_chargeable_weight("12.5", &Dimensions::default()), "12.50");
}

#[test]
fn non_numeric_weight_gives_empty_string() {
    assert_eq!(compute_chargeable_weight("", &cube(100.0)), "");
    assert_eq!(compute_chargeable_weight("heavy", &cube(100.0)), "");
}

#[test]
fn numeric_chargeable_weight_is_rounded() {
    assert_eq!(chargeable_weight_kg(50.0, &cube(100.0)), 166.67);
}

#[test]
fn total_weight_of_empty_list_is_zero() {
    assert_eq!(compute_total_weight(&json!([])), 0.0);
}

#[test]
fn total_weight_accepts_strings_and_numbers() {
    let pieces = json!([{ "actualWeight": "10" }, { "actualWeight": 5 }]);
    assert_eq!(compute_total_weight(&pieces), 15.0);
}

#[test]
fn total_weight_treats_garbage_as_zero() {
    let pieces = json!([{ "actualWeight": "n/a" }, {}, { "actualWeight": 2.5 }]);
    assert_eq!(compute_total_weight(&pieces), 2.5);
    assert_eq!(compute_total_weight(&json!(null)), 0.0);
}

#[test]
fn negative_dimension_is_rejected() {
    let err = validate_dimensions(&Dimensions::new(-1.0, 10.0, 10.0)).unwrap_err();
    assert_eq!(err.to_string(), "Dimensions cannot be negative");
}

#[test]
fn oversized_dimension_is_rejected() {
    let err = validate_dimensions(&Dimensions::new(3001.0, 10.0, 10.0)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Dimensions exceed maximum allowed size of 3000 cm"
    );
    assert!(validate_dimensions(&Dimensions::new(3000.0, 10.0, 10.0)).is_ok());
}

#[test]
fn weight_bounds() {
    assert_eq!(
        validate_weight(0.0).unwrap_err().to_string(),
        "Weight must be greater than 0"
    );
    assert_eq!(
        validate_weight(1000.5).unwrap_err().to_string(),
        "Weight exceeds maximum allowed of 1000 kg"
    );
    assert!(validate_weight(1000.0).is_ok());
}

#[test]
fn new_piece_derives_volume_and_chargeable_weight() {
    let p = piece("1", cube(100.0), 50.0);
    assert_eq!(p.volume_cm3, Some(1_000_000.0));
    assert_eq!(p.chargeable_weight_kg, Some(166.67));
    assert_eq!(p.status, PieceStatus::Pending);
    assert_eq!(p.special_handling, SpecialHandling::Normal);
    assert_eq!(p.awb_no.as_deref(), Some("176-12345675"));
}

#[test]
fn new_piece_requires_piece_number() {
    let err = CargoPiece::new(
        "176-12345675",
        NewPiece {
            piece_number: "  ".into(),
            actual_weight_kg: 5.0,
            ..NewPiece::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, CargoError::Validation(_)));
}

#[test]
fn refresh_derived_follows_edits() {
    let mut p = piece("1", cube(10.0), 5.0);
    p.dimensions = cube(100.0);
    p.refresh_derived();
    assert_eq!(p.chargeable_weight_kg, Some(166.67));
}

#[test]
fn duplicate_piece_number_is_rejected() {
    let existing = vec![piece("1", cube(10.0), 5.0)];
    assert!(ensure_unique_piece_number(&existing, " 1 ").is_err());
    assert!(ensure_unique_piece_number(&existing, "2").is_ok());
}

#[test]
fn piece_totals_roll_up_into_awb() {
    let pieces = vec![piece("1", cube(100.0), 50.0), piece("2", cube(10.0), 20.0)];
    let totals = summarize_pieces(&pieces);
    assert_eq!(totals.pieces, 2);
    assert_eq!(totals.weight_kg, 70.0);
    assert_eq!(totals.chargeable_weight_kg, 186.67);

    let mut awb = AirWaybill::default();
    awb.apply_piece_totals(&totals);
    assert_eq!(awb.pieces, 2);
    assert_eq!(awb.chargeable_weight, Some(186.67));
    assert_eq!(awb.volume, Some(1_001_000.0));
}
