//! Volume, volumetric weight and chargeable weight for cargo pieces.

use serde::Serialize;
use serde_json::Value;

use crate::error::CargoError;
use crate::model::{AirWaybill, CargoPiece, Dimensions, PieceStatus, SpecialHandling};

/// IATA density divisor, cm³ per kg.
pub const VOLUMETRIC_DIVISOR: f64 = 6000.0;
pub const MAX_DIMENSION_CM: f64 = 3000.0;
pub const MAX_PIECE_WEIGHT_KG: f64 = 1000.0;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `length × width × height` in cm³; 0 when any side is missing or zero.
pub fn compute_volume(length: Option<f64>, width: Option<f64>, height: Option<f64>) -> f64 {
    match (length, width, height) {
        (Some(l), Some(w), Some(h)) if l != 0.0 && w != 0.0 && h != 0.0 => l * w * h,
        _ => 0.0,
    }
}

pub fn volume_of(dims: &Dimensions) -> f64 {
    compute_volume(dims.length_cm, dims.width_cm, dims.height_cm)
}

pub fn volumetric_weight_kg(dims: &Dimensions) -> f64 {
    volume_of(dims) / VOLUMETRIC_DIVISOR
}

/// Greater of actual and volumetric weight, rounded to 2 decimals.
pub fn chargeable_weight_kg(actual_weight_kg: f64, dims: &Dimensions) -> f64 {
    round2(actual_weight_kg.max(volumetric_weight_kg(dims)))
}

/// Form-field variant: takes the weight as typed and returns the chargeable
/// weight with 2 decimals, or an empty string when the weight is not numeric.
pub fn compute_chargeable_weight(actual_weight: &str, dims: &Dimensions) -> String {
    match actual_weight.trim().parse::<f64>() {
        Ok(actual) if actual.is_finite() => {
            format!("{:.2}", actual.max(volumetric_weight_kg(dims)))
        }
        _ => String::new(),
    }
}

fn coerce_weight(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Sums `actualWeight` across a JSON array of pieces. Non-arrays sum to 0.
pub fn compute_total_weight(pieces: &Value) -> f64 {
    match pieces {
        Value::Array(items) => items
            .iter()
            .map(|p| coerce_weight(p.get("actualWeight").or_else(|| p.get("actualWeightKg"))))
            .sum(),
        _ => 0.0,
    }
}

pub fn total_actual_weight(pieces: &[CargoPiece]) -> f64 {
    pieces.iter().map(|p| p.actual_weight_kg.unwrap_or(0.0)).sum()
}

pub fn validate_dimensions(dims: &Dimensions) -> Result<(), CargoError> {
    for value in [dims.length_cm, dims.width_cm, dims.height_cm].into_iter().flatten() {
        if value < 0.0 {
            return Err(CargoError::InvalidDimension(
                "Dimensions cannot be negative".into(),
            ));
        }
        if value > MAX_DIMENSION_CM {
            return Err(CargoError::InvalidDimension(format!(
                "Dimensions exceed maximum allowed size of {MAX_DIMENSION_CM} cm"
            )));
        }
    }
    Ok(())
}

pub fn validate_weight(weight_kg: f64) -> Result<(), CargoError> {
    if weight_kg.is_nan() || weight_kg <= 0.0 {
        return Err(CargoError::InvalidWeight(
            "Weight must be greater than 0".into(),
        ));
    }
    if weight_kg > MAX_PIECE_WEIGHT_KG {
        return Err(CargoError::InvalidWeight(format!(
            "Weight exceeds maximum allowed of {MAX_PIECE_WEIGHT_KG} kg"
        )));
    }
    Ok(())
}

/// Fields a user fills in before "add piece".
#[derive(Debug, Clone, Default)]
pub struct NewPiece {
    pub piece_number: String,
    pub dimensions: Dimensions,
    pub actual_weight_kg: f64,
    pub content: String,
    pub special_handling: SpecialHandling,
    pub notes: String,
}

impl CargoPiece {
    /// Validates the entry and derives volume and chargeable weight.
    pub fn new(awb_no: &str, entry: NewPiece) -> Result<Self, CargoError> {
        if entry.piece_number.trim().is_empty() {
            return Err(CargoError::Validation("piece number is required".into()));
        }
        validate_dimensions(&entry.dimensions)?;
        validate_weight(entry.actual_weight_kg)?;

        Ok(Self {
            id: None,
            piece_number: entry.piece_number.trim().to_string(),
            awb_no: Some(awb_no.to_string()),
            dimensions: entry.dimensions,
            actual_weight_kg: Some(entry.actual_weight_kg),
            volume_cm3: Some(volume_of(&entry.dimensions)),
            chargeable_weight_kg: Some(chargeable_weight_kg(
                entry.actual_weight_kg,
                &entry.dimensions,
            )),
            content: entry.content,
            special_handling: entry.special_handling,
            status: PieceStatus::Pending,
            notes: entry.notes,
            rates: None,
        })
    }

    /// Recomputes derived fields after a dimension or weight edit.
    pub fn refresh_derived(&mut self) {
        self.volume_cm3 = Some(volume_of(&self.dimensions));
        self.chargeable_weight_kg = self
            .actual_weight_kg
            .map(|w| chargeable_weight_kg(w, &self.dimensions));
    }
}

/// Rejects a piece number already used within the same AWB.
pub fn ensure_unique_piece_number(
    existing: &[CargoPiece],
    piece_number: &str,
) -> Result<(), CargoError> {
    let wanted = piece_number.trim();
    if existing.iter().any(|p| p.piece_number.trim() == wanted) {
        return Err(CargoError::Validation(format!(
            "piece number {wanted} already exists on this AWB"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PieceTotals {
    pub pieces: u32,
    pub weight_kg: f64,
    pub volume_cm3: f64,
    pub chargeable_weight_kg: f64,
}

pub fn summarize_pieces(pieces: &[CargoPiece]) -> PieceTotals {
    let mut totals = PieceTotals {
        pieces: pieces.len() as u32,
        ..PieceTotals::default()
    };
    for piece in pieces {
        let actual = piece.actual_weight_kg.unwrap_or(0.0);
        totals.weight_kg += actual;
        totals.volume_cm3 += piece.volume_cm3.unwrap_or_else(|| volume_of(&piece.dimensions));
        totals.chargeable_weight_kg += piece
            .chargeable_weight_kg
            .unwrap_or_else(|| chargeable_weight_kg(actual, &piece.dimensions));
    }
    totals.weight_kg = round2(totals.weight_kg);
    totals.chargeable_weight_kg = round2(totals.chargeable_weight_kg);
    totals
}

impl AirWaybill {
    pub fn apply_piece_totals(&mut self, totals: &PieceTotals) {
        self.pieces = totals.pieces;
        self.weight = Some(totals.weight_kg);
        self.volume = Some(totals.volume_cm3);
        self.chargeable_weight = Some(totals.chargeable_weight_kg);
    }
}
