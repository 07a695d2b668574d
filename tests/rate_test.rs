use cargodesk::error::CargoError;
use cargodesk::model::{AirWaybill, RateSource};
use cargodesk::rate::{
    compute_breakdown, derive_base_charge, generate_awb_rate, override_total, parse_base_rate,
    piece_rate, would_discard_override, PieceRateEntry,
};

fn awb_with_weight(chargeable: f64) -> AirWaybill {
    AirWaybill {
        awb_no: "176-12345675".into(),
        chargeable_weight: Some(chargeable),
        ..AirWaybill::default()
    }
}

#[test]
fn generated_rate_breakdown() {
    let mut awb = awb_with_weight(100.0);
    let rates = generate_awb_rate(&mut awb, Some(2.5), 10.0).unwrap();
    let b = &rates.rates.breakdown;
    assert_eq!(b.base_charge, 250.0);
    assert_eq!(b.fuel_surcharge, 15.0);
    assert_eq!(b.security_surcharge, 20.0);
    assert_eq!(b.other_charges, 10.0);
    assert_eq!(b.total, 295.0);
    assert!(!rates.is_manually_adjusted());
    assert_eq!(awb.total_amount(), Some(295.0));
}

#[test]
fn generated_components_are_rounded() {
    let b = compute_breakdown(1.333, 40.0, 0.004, "EUR");
    assert_eq!(b.base_charge, 53.32);
    assert_eq!(b.fuel_surcharge, 6.0);
    assert_eq!(b.other_charges, 0.0);
    assert_eq!(b.total, 79.32);
    assert_eq!(b.currency, "EUR");
}

#[test]
fn zero_chargeable_weight_is_rejected_and_awb_unchanged() {
    let mut awb = awb_with_weight(0.0);
    let before = awb.clone();
    let err = generate_awb_rate(&mut awb, Some(2.5), 0.0).unwrap_err();
    assert_eq!(err, CargoError::ZeroChargeableWeight);
    assert_eq!(
        err.to_string(),
        "Chargeable Weight must be greater than 0 to generate rates"
    );
    assert_eq!(awb, before);
}

#[test]
fn missing_chargeable_weight_counts_as_zero() {
    let mut awb = AirWaybill::default();
    assert_eq!(
        generate_awb_rate(&mut awb, Some(2.5), 0.0).unwrap_err(),
        CargoError::ZeroChargeableWeight
    );
}

#[test]
fn base_rate_is_checked_before_weight() {
    let mut awb = awb_with_weight(0.0);
    assert_eq!(
        generate_awb_rate(&mut awb, None, 0.0).unwrap_err(),
        CargoError::InvalidBaseRate
    );
    assert_eq!(
        generate_awb_rate(&mut awb, parse_base_rate("-1"), 0.0).unwrap_err(),
        CargoError::InvalidBaseRate
    );
    assert!(awb.rates.is_none());
}

#[test]
fn parse_base_rate_ignores_blank_and_text() {
    assert_eq!(parse_base_rate(" 2.75 "), Some(2.75));
    assert_eq!(parse_base_rate(""), None);
    assert_eq!(parse_base_rate("abc"), None);
}

#[test]
fn override_then_generate_clears_manual_flag() {
    let mut awb = awb_with_weight(100.0);
    assert_eq!(override_total(&mut awb, "500").unwrap(), 500.0);
    assert_eq!(awb.total_amount(), Some(500.0));
    assert!(awb.rates.as_ref().unwrap().is_manually_adjusted());
    assert!(would_discard_override(&awb));

    generate_awb_rate(&mut awb, Some(2.5), 10.0).unwrap();
    let rates = awb.rates.as_ref().unwrap();
    assert!(!rates.is_manually_adjusted());
    assert_eq!(rates.total(), 295.0);
    assert!(!would_discard_override(&awb));
}

#[test]
fn override_keeps_generated_components() {
    let mut awb = awb_with_weight(100.0);
    generate_awb_rate(&mut awb, Some(2.5), 10.0).unwrap();
    override_total(&mut awb, "280.50").unwrap();

    let rates = awb.rates.as_ref().unwrap();
    assert_eq!(rates.rates.source, RateSource::ManualOverride(280.5));
    assert_eq!(rates.rates.breakdown.base_charge, 250.0);
    assert_eq!(rates.total(), 280.5);
}

#[test]
fn invalid_total_is_rejected() {
    let mut awb = awb_with_weight(100.0);
    let err = override_total(&mut awb, "lots").unwrap_err();
    assert!(matches!(err, CargoError::InvalidTotalAmount(ref s) if s == "lots"));
    assert!(override_total(&mut awb, "-5").is_err());
    assert!(awb.rates.is_none());
}

#[test]
fn generating_keeps_existing_currency() {
    let mut awb = awb_with_weight(10.0);
    override_total(&mut awb, "100").unwrap();
    awb.rates.as_mut().unwrap().rates.breakdown.currency = "EUR".into();
    let rates = generate_awb_rate(&mut awb, Some(1.0), 0.0).unwrap();
    assert_eq!(rates.rates.breakdown.currency, "EUR");
}

#[test]
fn piece_base_charge_from_rate() {
    assert_eq!(derive_base_charge(Some(3.0), 166.67).unwrap(), 500.01);
    assert_eq!(
        derive_base_charge(Some(3.0), 0.0).unwrap_err(),
        CargoError::ZeroChargeableWeight
    );
}

#[test]
fn generated_piece_rate_is_not_manual() {
    let mut entry = PieceRateEntry::default();
    entry.generate_base_charge(Some(2.0), 50.0).unwrap();
    entry.fuel_surcharge = 7.5;
    entry.security_surcharge = 20.0;

    let rates = piece_rate(&entry).unwrap();
    assert!(!rates.is_manually_adjusted());
    assert_eq!(rates.total(), 127.5);
}

#[test]
fn hand_entered_piece_rate_is_manual() {
    let mut entry = PieceRateEntry::default();
    entry.generate_base_charge(Some(2.0), 50.0).unwrap();
    entry.set_base_charge(80.0);
    entry.other_charges = 5.0;

    let rates = piece_rate(&entry).unwrap();
    assert!(rates.is_manually_adjusted());
    assert_eq!(rates.total(), 85.0);
}

#[test]
fn negative_piece_charge_is_rejected() {
    let mut entry = PieceRateEntry::default();
    entry.fuel_surcharge = -1.0;
    assert!(matches!(piece_rate(&entry), Err(CargoError::Validation(_))));
}

#[test]
fn piece_entry_prefills_from_saved_rates() {
    let mut entry = PieceRateEntry::default();
    entry.generate_base_charge(Some(2.0), 10.0).unwrap();
    let rates = piece_rate(&entry).unwrap();

    let reopened = PieceRateEntry::from_rates(&rates);
    assert_eq!(reopened.base_rate_per_kg, Some(2.0));
    assert_eq!(reopened.base_charge, 20.0);
    assert!(!piece_rate(&reopened).unwrap().is_manually_adjusted());
}
