//! Client-side filtering over fetched AWB, airport and user collections.
//!
//! A record is kept only when every active category passes: field filters,
//! status set, date range and the universal query.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::CargoError;
use crate::highlight::generate_highlight_search_query;
use crate::model::{AirWaybill, Airport, User};

pub trait Filterable: Serialize {
    type Field: Copy + Eq + Debug;

    fn field_text(&self, field: Self::Field) -> Cow<'_, str>;

    fn status_key(&self) -> Cow<'_, str>;

    /// Timestamps checked by the date-range filter.
    fn tracked_dates(&self) -> Vec<&str>;

    /// Top-level string values; nested objects, numbers and flags are skipped.
    fn searchable_strings(&self) -> Vec<String> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map
                .into_iter()
                .filter_map(|(_, v)| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwbField {
    AwbNo,
    MawbNo,
    Airline,
    Customer,
    Origin,
    Destination,
    Shipper,
    Consignee,
}

impl Filterable for AirWaybill {
    type Field = AwbField;

    fn field_text(&self, field: AwbField) -> Cow<'_, str> {
        Cow::Borrowed(match field {
            AwbField::AwbNo => &self.awb_no,
            AwbField::MawbNo => &self.mawb_no,
            AwbField::Airline => &self.airline,
            AwbField::Customer => &self.customer,
            AwbField::Origin => &self.origin,
            AwbField::Destination => &self.destination,
            AwbField::Shipper => &self.shipper_name,
            AwbField::Consignee => &self.consignee_name,
        })
    }

    fn status_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.status.as_str())
    }

    fn tracked_dates(&self) -> Vec<&str> {
        [&self.ready_date, &self.arrival_date, &self.created_at]
            .into_iter()
            .filter_map(|d| d.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirportField {
    Icao,
    Iata,
    Name,
    City,
    Country,
}

impl Filterable for Airport {
    type Field = AirportField;

    fn field_text(&self, field: AirportField) -> Cow<'_, str> {
        Cow::Borrowed(match field {
            AirportField::Icao => &self.icao,
            AirportField::Iata => &self.iata,
            AirportField::Name => &self.name,
            AirportField::City => &self.city,
            AirportField::Country => &self.country,
        })
    }

    fn status_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.status.as_str())
    }

    fn tracked_dates(&self) -> Vec<&str> {
        self.created_at.as_deref().into_iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Name,
    Email,
    Role,
}

impl Filterable for User {
    type Field = UserField;

    fn field_text(&self, field: UserField) -> Cow<'_, str> {
        match field {
            UserField::Name => Cow::Borrowed(&self.name),
            UserField::Email => Cow::Borrowed(&self.email),
            UserField::Role => Cow::Borrowed(self.role.as_str()),
        }
    }

    fn status_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.status.as_str())
    }

    fn tracked_dates(&self) -> Vec<&str> {
        [&self.created_at, &self.updated_at]
            .into_iter()
            .filter_map(|d| d.as_deref())
            .collect()
    }
}

/// Inclusive calendar-day range; `to` covers the whole day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

fn parse_day(input: &str) -> Result<NaiveDate, CargoError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| CargoError::InvalidDate(input.to_string()))
}

impl DateRange {
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, CargoError> {
        let from = from.filter(|s| !s.trim().is_empty()).map(parse_day).transpose()?;
        let to = to.filter(|s| !s.trim().is_empty()).map(parse_day).transpose()?;
        Ok(Self { from, to })
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    fn start(&self) -> Option<DateTime<Utc>> {
        self.from.map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    fn end(&self) -> Option<DateTime<Utc>> {
        self.to.map(|d| {
            (d.and_time(NaiveTime::MIN) + TimeDelta::days(1) - TimeDelta::milliseconds(1))
                .and_utc()
        })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start().is_none_or(|s| instant >= s) && self.end().is_none_or(|e| instant <= e)
    }
}

/// Accepts RFC 3339 timestamps, naive timestamps (read as UTC) and bare dates.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

#[derive(Debug, Clone)]
pub struct FilterCriteria<F> {
    pub fields: Vec<(F, String)>,
    pub statuses: BTreeMap<String, bool>,
    pub dates: DateRange,
    pub query: String,
}

impl<F> Default for FilterCriteria<F> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            statuses: BTreeMap::new(),
            dates: DateRange::default(),
            query: String::new(),
        }
    }
}

impl<F: Copy + Eq> FilterCriteria<F> {
    pub fn with_field(mut self, field: F, value: impl Into<String>) -> Self {
        self.fields.push((field, value.into()));
        self
    }

    pub fn with_status(mut self, status: impl Into<String>, enabled: bool) -> Self {
        self.statuses.insert(status.into(), enabled);
        self
    }

    pub fn with_dates(mut self, dates: DateRange) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    fn active_fields(&self) -> impl Iterator<Item = (F, &str)> {
        self.fields
            .iter()
            .map(|(f, v)| (*f, v.trim()))
            .filter(|(_, v)| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.active_fields().next().is_none()
            && self.statuses.is_empty()
            && self.dates.is_unbounded()
            && self.query.trim().is_empty()
    }

    /// Every active search value joined into one string for highlighting.
    pub fn highlight_query(&self) -> String {
        generate_highlight_search_query(
            self.active_fields()
                .map(|(_, v)| v)
                .chain(std::iter::once(self.query.as_str())),
        )
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

pub fn matches_fields<T: Filterable>(record: &T, criteria: &FilterCriteria<T::Field>) -> bool {
    criteria
        .active_fields()
        .all(|(field, value)| contains_ci(&record.field_text(field), &value.to_lowercase()))
}

pub fn matches_status(status_key: &str, statuses: &BTreeMap<String, bool>) -> bool {
    statuses.is_empty() || statuses.get(status_key).copied().unwrap_or(false)
}

pub fn matches_date_range(dates: &[&str], range: &DateRange) -> bool {
    if range.is_unbounded() {
        return true;
    }
    dates
        .iter()
        .filter_map(|d| parse_timestamp(d))
        .any(|instant| range.contains(instant))
}

/// Free-text match over a record's string values. A multi-word query passes
/// as a contiguous phrase in one field, or when every word appears in some
/// field.
pub fn matches_universal(fields: &[String], query: &str) -> bool {
    let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if words.is_empty() {
        return true;
    }
    let lowered: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();
    let phrase = words.join(" ");

    if lowered.iter().any(|f| f.contains(&phrase)) {
        return true;
    }
    words.len() > 1
        && words
            .iter()
            .all(|w| lowered.iter().any(|f| f.contains(w.as_str())))
}

pub fn matches<T: Filterable>(record: &T, criteria: &FilterCriteria<T::Field>) -> bool {
    matches_fields(record, criteria)
        && matches_status(&record.status_key(), &criteria.statuses)
        && matches_date_range(&record.tracked_dates(), &criteria.dates)
        && (criteria.query.trim().is_empty()
            || matches_universal(&record.searchable_strings(), &criteria.query))
}

/// Keeps matching records in their original order.
pub fn apply_filters<T: Filterable>(records: Vec<T>, criteria: &FilterCriteria<T::Field>) -> Vec<T> {
    if criteria.is_empty() {
        return records;
    }
    let before = records.len();
    let kept: Vec<T> = records
        .into_iter()
        .filter(|r| matches(r, criteria))
        .collect();
    debug!(before, after = kept.len(), "applied record filters");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_of_day_is_inclusive() {
        let range = DateRange::parse(None, Some("2024-01-31")).unwrap();
        let late = parse_timestamp("2024-01-31T23:59:59.999Z").unwrap();
        let next = parse_timestamp("2024-02-01T00:00:00Z").unwrap();
        assert!(range.contains(late));
        assert!(!range.contains(next));
    }

    #[test]
    fn parse_timestamp_variants() {
        assert!(parse_timestamp("2024-01-15").is_some());
        assert!(parse_timestamp("2024-01-15T10:00:00").is_some());
        assert!(parse_timestamp("2024-01-15T10:00:00+02:00").is_some());
        assert!(parse_timestamp("15/01/2024").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn status_map_with_only_false_entries_rejects() {
        let mut statuses = BTreeMap::new();
        statuses.insert("Booked".to_string(), false);
        assert!(!matches_status("Booked", &statuses));
        assert!(!matches_status("Arrived", &statuses));
    }

    #[test]
    fn invalid_range_bound_is_an_error() {
        assert!(DateRange::parse(Some("01/02/2024"), None).is_err());
        assert!(DateRange::parse(Some(""), Some("  ")).unwrap().is_unbounded());
    }
}
