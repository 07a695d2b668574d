//! Clipboard text and `.xlsx` workbooks for selected records.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, Workbook};
use tracing::{error, info};

use crate::error::CargoError;
use crate::model::{AirWaybill, Airport, Runway};

pub const NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_COLUMN_WIDTH: f64 = 20.0;
const HEADER_FILL: u32 = 0xD9E1F2;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Missing,
}

impl CellValue {
    fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    fn number(n: Option<f64>) -> Self {
        n.map_or(Self::Missing, Self::Number)
    }
}

pub struct Column<T> {
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub value: fn(&T) -> CellValue,
}

impl<T> Column<T> {
    fn new(label: &'static str, value: fn(&T) -> CellValue) -> Self {
        Self {
            label,
            unit: None,
            value,
        }
    }

    fn with_unit(label: &'static str, unit: &'static str, value: fn(&T) -> CellValue) -> Self {
        Self {
            label,
            unit: Some(unit),
            value,
        }
    }

    pub fn render(&self, record: &T) -> String {
        format_cell(&(self.value)(record), self.unit)
    }
}

/// Records that can be copied or exported over a fixed column list.
pub trait Exportable: Sized {
    const SHEET_NAME: &'static str;

    fn columns() -> Vec<Column<Self>>;
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{:.2}", n)
    }
}

pub fn format_cell(value: &CellValue, unit: Option<&str>) -> String {
    match value {
        CellValue::Text(s) if s.trim().is_empty() => NOT_AVAILABLE.to_string(),
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => match unit {
            Some(u) => format!("{} {u}", format_number(*n)),
            None => format_number(*n),
        },
        CellValue::Flag(true) => "Yes".to_string(),
        CellValue::Flag(false) => "No".to_string(),
        CellValue::Missing => NOT_AVAILABLE.to_string(),
    }
}

/// One `Label: value | Label: value` line per record, blank line between
/// records.
pub fn format_for_clipboard<T: Exportable>(records: &[T]) -> String {
    let columns = T::columns();
    records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| format!("{}: {}", c.label, c.render(record)))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Serialises the workbook in memory; nothing touches disk here.
pub fn build_workbook<T: Exportable>(records: &[T], column_width: f64) -> Result<Vec<u8>, CargoError> {
    let columns = T::columns();
    let header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL));

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(T::SHEET_NAME)?;

    for (col, column) in columns.iter().enumerate() {
        let col = col as u16;
        let title = match column.unit {
            Some(unit) => format!("{} ({unit})", column.label),
            None => column.label.to_string(),
        };
        sheet.write_string_with_format(0, col, title, &header)?;
        sheet.set_column_width(col, column_width)?;
    }

    for (row, record) in records.iter().enumerate() {
        let row = row as u32 + 1;
        for (col, column) in columns.iter().enumerate() {
            sheet.write_string(row, col as u16, column.render(record))?;
        }
    }
    sheet.set_freeze_panes(1, 0)?;

    Ok(workbook.save_to_buffer()?)
}

pub fn export_file_name(stem: &str) -> String {
    format!("{stem}_{}.xlsx", chrono::Utc::now().format("%Y-%m-%d"))
}

/// Writes `<stem>_<YYYY-MM-DD>.xlsx` (UTC date) into `dir`. The file is created only
/// after the workbook serialised successfully.
pub fn export_workbook<T: Exportable>(
    records: &[T],
    dir: &Path,
    stem: &str,
    column_width: f64,
) -> Result<PathBuf, CargoError> {
    let buffer = build_workbook(records, column_width).inspect_err(|e| {
        error!(error = %e, "failed to build export workbook");
    })?;

    let path = dir.join(export_file_name(stem));
    std::fs::write(&path, buffer).map_err(|e| {
        error!(error = %e, path = %path.display(), "failed to write export file");
        CargoError::Export(format!("cannot write {}: {e}", path.display()))
    })?;

    info!(records = records.len(), path = %path.display(), "exported workbook");
    Ok(path)
}

fn longest_runway(runways: &[Runway]) -> Option<f64> {
    runways
        .iter()
        .filter_map(|r| r.length_meters)
        .fold(None, |acc: Option<f64>, l| Some(acc.map_or(l, |a| a.max(l))))
}

impl Exportable for Airport {
    const SHEET_NAME: &'static str = "Airports";

    fn columns() -> Vec<Column<Self>> {
        type C = Column<Airport>;

        vec![
            C::new("ICAO", |a| CellValue::text(&a.icao)),
            C::new("IATA", |a| CellValue::text(&a.iata)),
            C::new("Name", |a| CellValue::text(&a.name)),
            C::new("City", |a| CellValue::text(&a.city)),
            C::new("Country", |a| CellValue::text(&a.country)),
            C::new("Timezone", |a| CellValue::text(&a.timezone)),
            C::with_unit("Elevation", "ft", |a| CellValue::number(a.elevation_ft)),
            C::new("Runways", |a| CellValue::Number(a.runways.len() as f64)),
            C::with_unit("Longest Runway", "m", |a| {
                CellValue::number(longest_runway(&a.runways))
            }),
            C::new("Cargo Terminal", |a| {
                a.cargo_facilities
                    .as_ref()
                    .map_or(CellValue::Missing, |f| CellValue::Flag(f.has_cargo_terminal))
            }),
            C::new("Cold Storage", |a| {
                a.cargo_facilities
                    .as_ref()
                    .map_or(CellValue::Missing, |f| CellValue::Flag(f.cold_storage))
            }),
            C::new("Dangerous Goods Handling", |a| {
                a.cargo_facilities
                    .as_ref()
                    .map_or(CellValue::Missing, |f| CellValue::Flag(f.dangerous_goods))
            }),
            C::new("Bonded Warehouse", |a| {
                a.cargo_facilities
                    .as_ref()
                    .map_or(CellValue::Missing, |f| CellValue::Flag(f.bonded_warehouse))
            }),
            C::with_unit("Storage Capacity", "m³", |a| {
                CellValue::number(a.cargo_facilities.as_ref().and_then(|f| f.storage_capacity_m3))
            }),
            C::new("Handling Agent", |a| {
                a.handling_agent
                    .as_ref()
                    .map_or(CellValue::Missing, |h| CellValue::text(&h.name))
            }),
            C::new("Agent Contact", |a| {
                a.handling_agent
                    .as_ref()
                    .map_or(CellValue::Missing, |h| CellValue::text(&h.contact_person))
            }),
            C::new("Agent Phone", |a| {
                a.handling_agent
                    .as_ref()
                    .map_or(CellValue::Missing, |h| CellValue::text(&h.phone))
            }),
            C::new("Agent Email", |a| {
                a.handling_agent
                    .as_ref()
                    .map_or(CellValue::Missing, |h| CellValue::text(&h.email))
            }),
            C::new("Freight Forwarding", |a| CellValue::Flag(a.freight_forwarding)),
            C::new("Perishables", |a| CellValue::Flag(a.accepts_perishables)),
            C::new("Live Animals", |a| CellValue::Flag(a.accepts_live_animals)),
            C::new("Dangerous Goods", |a| CellValue::Flag(a.accepts_dangerous_goods)),
            C::new("Serviced Airlines", |a| CellValue::Text(a.serviced_airlines.join(", "))),
            C::new("Routes", |a| CellValue::Text(a.routes.join(", "))),
            C::new("Status", |a| CellValue::text(a.status.as_str())),
        ]
    }
}

impl Exportable for AirWaybill {
    const SHEET_NAME: &'static str = "AWBs";

    fn columns() -> Vec<Column<Self>> {
        type C = Column<AirWaybill>;

        vec![
            C::new("AWB No", |a| CellValue::text(&a.awb_no)),
            C::new("MAWB No", |a| CellValue::text(&a.mawb_no)),
            C::new("Airline", |a| CellValue::text(&a.airline)),
            C::new("Customer", |a| CellValue::text(&a.customer)),
            C::new("Shipper", |a| CellValue::text(&a.shipper_name)),
            C::new("Shipper Address", |a| CellValue::Text(a.shipper_address.one_line())),
            C::new("Consignee", |a| CellValue::text(&a.consignee_name)),
            C::new("Consignee Address", |a| {
                CellValue::Text(a.consignee_address.one_line())
            }),
            C::new("Origin", |a| CellValue::text(&a.origin)),
            C::new("Destination", |a| CellValue::text(&a.destination)),
            C::new("Pieces", |a| CellValue::Number(a.pieces as f64)),
            C::with_unit("Weight", "kg", |a| CellValue::number(a.weight)),
            C::with_unit("Chargeable Weight", "kg", |a| {
                CellValue::number(a.chargeable_weight)
            }),
            C::with_unit("Volume", "cm³", |a| CellValue::number(a.volume)),
            C::new("Ready Date", |a| {
                a.ready_date.as_deref().map_or(CellValue::Missing, CellValue::text)
            }),
            C::new("Arrival Date", |a| {
                a.arrival_date.as_deref().map_or(CellValue::Missing, CellValue::text)
            }),
            C::new("Status", |a| CellValue::text(a.status.as_str())),
            C::new("Approval", |a| CellValue::text(a.approval_status.as_str())),
            C::new("Customs", |a| CellValue::text(a.customs_clearance.as_str())),
            C::new("Insurance", |a| CellValue::text(a.insurance.as_str())),
            C::new("Currency", |a| {
                a.rates
                    .as_ref()
                    .map_or(CellValue::Missing, |r| CellValue::text(&r.rates.breakdown.currency))
            }),
            C::new("Total Amount", |a| CellValue::number(a.total_amount())),
            C::new("Manually Adjusted", |a| {
                a.rates
                    .as_ref()
                    .map_or(CellValue::Missing, |r| CellValue::Flag(r.is_manually_adjusted()))
            }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_drop_trailing_zeros_only_when_whole() {
        assert_eq!(format_number(1000.0), "1000");
        assert_eq!(format_number(166.666), "166.67");
    }

    #[test]
    fn longest_runway_ignores_missing_lengths() {
        let runways = vec![
            Runway {
                length_meters: Some(3200.0),
                ..Runway::default()
            },
            Runway::default(),
            Runway {
                length_meters: Some(4400.0),
                ..Runway::default()
            },
        ];
        assert_eq!(longest_runway(&runways), Some(4400.0));
        assert_eq!(longest_runway(&[]), None);
    }
}
