use cargodesk::error::CargoError;
use cargodesk::model::{AirWaybill, Airport, AirportStatus, AwbStatus, User};
use cargodesk::search::{
    apply_filters, matches_universal, AirportField, AwbField, DateRange, FilterCriteria,
    UserField,
};

fn awb(no: &str, shipper: &str, consignee: &str, status: AwbStatus) -> AirWaybill {
    AirWaybill {
        awb_no: no.into(),
        airline: "Lufthansa Cargo".into(),
        shipper_name: shipper.into(),
        consignee_name: consignee.into(),
        origin: "FRA".into(),
        destination: "JFK".into(),
        status,
        ..AirWaybill::default()
    }
}

fn dated(no: &str, ready: &str) -> AirWaybill {
    AirWaybill {
        ready_date: Some(ready.into()),
        ..awb(no, "Acme", "Globex", AwbStatus::Booked)
    }
}

fn numbers(awbs: &[AirWaybill]) -> Vec<&str> {
    awbs.iter().map(|a| a.awb_no.as_str()).collect()
}

#[test]
fn empty_criteria_returns_input_unchanged() {
    let input = vec![
        awb("020-00000002", "B", "C", AwbStatus::Booked),
        awb("020-00000001", "A", "C", AwbStatus::Canceled),
    ];
    let out = apply_filters(input.clone(), &FilterCriteria::default());
    assert_eq!(out, input);
}

#[test]
fn blank_values_do_not_activate_filters() {
    let criteria = FilterCriteria::default()
        .with_field(AwbField::Airline, "   ")
        .with_query("  ");
    assert!(criteria.is_empty());
}

#[test]
fn phrase_matches_inside_one_field_in_any_case() {
    let input = vec![
        awb("020-00000001", "JOHN DOE Trading", "Globex", AwbStatus::Booked),
        awb("020-00000002", "Acme", "Globex", AwbStatus::Booked),
    ];
    for query in ["john doe", "John Doe"] {
        let out = apply_filters(input.clone(), &FilterCriteria::default().with_query(query));
        assert_eq!(numbers(&out), vec!["020-00000001"]);
    }
}

#[test]
fn words_split_across_fields_still_match() {
    let input = vec![awb("020-00000003", "John Smith", "Jane Doe", AwbStatus::Booked)];
    let out = apply_filters(input, &FilterCriteria::default().with_query("john doe"));
    assert_eq!(out.len(), 1);
}

#[test]
fn every_word_must_appear_somewhere() {
    let input = vec![awb("020-00000004", "John Smith", "Jane Roe", AwbStatus::Booked)];
    let out = apply_filters(input, &FilterCriteria::default().with_query("john doe"));
    assert!(out.is_empty());
}

#[test]
fn universal_search_skips_nested_values() {
    let mut record = awb("020-00000005", "Acme", "Globex", AwbStatus::Booked);
    record.shipper_address.city = "Springfield".into();
    let out = apply_filters(vec![record], &FilterCriteria::default().with_query("springfield"));
    assert!(out.is_empty());
}

#[test]
fn universal_matcher_on_plain_strings() {
    let fields = vec!["Invoice 12345".to_string(), "KJFK".to_string()];
    assert!(matches_universal(&fields, "12345 kjfk"));
    assert!(matches_universal(&fields, ""));
    assert!(!matches_universal(&fields, "egll"));
}

#[test]
fn date_range_is_inclusive_of_whole_end_day() {
    let input = vec![
        dated("020-00000001", "2024-01-01"),
        dated("020-00000002", "2024-01-15T10:30:00Z"),
        dated("020-00000003", "2024-01-31T23:59:59Z"),
        dated("020-00000004", "2024-02-01"),
        dated("020-00000005", "2023-12-31T23:59:59Z"),
    ];
    let range = DateRange::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap();
    let out = apply_filters(input, &FilterCriteria::default().with_dates(range));
    assert_eq!(
        numbers(&out),
        vec!["020-00000001", "020-00000002", "020-00000003"]
    );
}

#[test]
fn open_ended_range() {
    let input = vec![
        dated("020-00000001", "2024-01-10"),
        dated("020-00000002", "2024-03-10"),
    ];
    let range = DateRange::parse(Some("2024-02-01"), None).unwrap();
    let out = apply_filters(input, &FilterCriteria::default().with_dates(range));
    assert_eq!(numbers(&out), vec!["020-00000002"]);
}

#[test]
fn records_without_dates_fail_a_bounded_range() {
    let input = vec![awb("020-00000001", "A", "B", AwbStatus::Booked)];
    let range = DateRange::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap();
    assert!(apply_filters(input, &FilterCriteria::default().with_dates(range)).is_empty());
}

#[test]
fn invalid_date_bound_is_rejected() {
    assert!(matches!(
        DateRange::parse(Some("31/01/2024"), None),
        Err(CargoError::InvalidDate(_))
    ));
    assert!(DateRange::parse(Some(""), Some("  ")).unwrap().is_unbounded());
}

#[test]
fn status_map_keeps_enabled_statuses() {
    let input = vec![
        awb("020-00000001", "A", "B", AwbStatus::Booked),
        awb("020-00000002", "A", "B", AwbStatus::InTransit),
        awb("020-00000003", "A", "B", AwbStatus::Canceled),
    ];
    let criteria = FilterCriteria::default()
        .with_status("Booked", true)
        .with_status("In Transit", true)
        .with_status("Canceled", false);
    assert_eq!(
        numbers(&apply_filters(input, &criteria)),
        vec!["020-00000001", "020-00000002"]
    );
}

#[test]
fn field_filters_are_substring_and_case_insensitive() {
    let input = vec![
        awb("020-00000001", "A", "B", AwbStatus::Booked),
        AirWaybill {
            airline: "Finnair".into(),
            ..awb("020-00000002", "A", "B", AwbStatus::Booked)
        },
    ];
    let criteria = FilterCriteria::default()
        .with_field(AwbField::Airline, "LUFTHANSA")
        .with_field(AwbField::Destination, "jf");
    assert_eq!(numbers(&apply_filters(input, &criteria)), vec!["020-00000001"]);
}

#[test]
fn all_categories_must_pass() {
    let input = vec![
        dated("020-00000001", "2024-01-10"),
        AirWaybill {
            status: AwbStatus::Delivered,
            ..dated("020-00000002", "2024-01-10")
        },
    ];
    let criteria = FilterCriteria::default()
        .with_field(AwbField::Shipper, "acme")
        .with_status("Delivered", true)
        .with_dates(DateRange::parse(Some("2024-01-01"), None).unwrap())
        .with_query("globex");
    assert_eq!(numbers(&apply_filters(input, &criteria)), vec!["020-00000002"]);
}

#[test]
fn airports_filter_by_country_and_status() {
    let airports = vec![
        Airport {
            icao: "EFHK".into(),
            iata: "HEL".into(),
            name: "Helsinki-Vantaa".into(),
            country: "Finland".into(),
            ..Airport::default()
        },
        Airport {
            icao: "EFOU".into(),
            iata: "OUL".into(),
            name: "Oulu".into(),
            country: "Finland".into(),
            status: AirportStatus::Closed,
            ..Airport::default()
        },
    ];
    let criteria = FilterCriteria::default()
        .with_field(AirportField::Country, "fin")
        .with_status("Active", true);
    let out = apply_filters(airports, &criteria);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].icao, "EFHK");
}

#[test]
fn users_filter_by_email() {
    let users = vec![
        User {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            ..User::default()
        },
        User {
            name: "Ben".into(),
            email: "ben@example.org".into(),
            ..User::default()
        },
    ];
    let criteria = FilterCriteria::default().with_field(UserField::Email, "example.org");
    let out = apply_filters(users, &criteria);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].name, "Ben");
}

#[test]
fn highlight_query_joins_active_values() {
    let criteria = FilterCriteria::default()
        .with_field(AwbField::Origin, " FRA ")
        .with_field(AwbField::Airline, "")
        .with_query("john doe");
    assert_eq!(criteria.highlight_query(), "FRA john doe");
}
