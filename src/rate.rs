//! Freight charge computation for pieces and AWBs.
//!
//! Generated rates and manual overrides are mutually exclusive: generating
//! always replaces an override, and an override replaces the generated total.

use tracing::{debug, info};

use crate::error::CargoError;
use crate::model::{AirWaybill, AwbRates, RateBreakdown, RateInputs, RateSource, Rates};
use crate::weight::round2;

pub const FUEL_SURCHARGE_RATE_PER_KG: f64 = 0.15;
pub const FIXED_SECURITY_SURCHARGE: f64 = 20.00;

fn parse_amount(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn positive_base_rate(base_rate_per_kg: Option<f64>) -> Result<f64, CargoError> {
    match base_rate_per_kg {
        Some(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
        _ => Err(CargoError::InvalidBaseRate),
    }
}

fn non_negative(label: &str, value: f64) -> Result<f64, CargoError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CargoError::Validation(format!(
            "{label} must be a non-negative number"
        )));
    }
    Ok(value)
}

/// Parses a base rate typed into a form; blank or non-numeric text is `None`.
pub fn parse_base_rate(input: &str) -> Option<f64> {
    parse_amount(input)
}

/// The full formula breakdown for an AWB-level rate.
pub fn compute_breakdown(
    base_rate_per_kg: f64,
    chargeable_weight_kg: f64,
    other_charges: f64,
    currency: &str,
) -> RateBreakdown {
    let base_charge = round2(chargeable_weight_kg * base_rate_per_kg);
    let fuel_surcharge = round2(chargeable_weight_kg * FUEL_SURCHARGE_RATE_PER_KG);
    let security_surcharge = FIXED_SECURITY_SURCHARGE;
    let other_charges = round2(other_charges);
    RateBreakdown {
        base_rate_per_kg,
        base_charge,
        fuel_surcharge,
        security_surcharge,
        other_charges,
        total: round2(base_charge + fuel_surcharge + security_surcharge + other_charges),
        currency: currency.to_string(),
    }
}

/// Generates the AWB rate from its chargeable weight. On error the AWB is
/// left untouched.
pub fn generate_awb_rate(
    awb: &mut AirWaybill,
    base_rate_per_kg: Option<f64>,
    other_charges: f64,
) -> Result<&AwbRates, CargoError> {
    let base_rate = positive_base_rate(base_rate_per_kg)?;
    let chargeable_weight = awb.chargeable_weight.unwrap_or(0.0);
    if !chargeable_weight.is_finite() || chargeable_weight <= 0.0 {
        return Err(CargoError::ZeroChargeableWeight);
    }
    let other_charges = non_negative("Other charges", other_charges)?;

    let currency = awb
        .rates
        .as_ref()
        .map(|r| r.rates.breakdown.currency.clone())
        .unwrap_or_else(|| "USD".to_string());
    let breakdown = compute_breakdown(base_rate, chargeable_weight, other_charges, &currency);

    if would_discard_override(awb) {
        debug!(awb = %awb.awb_no, "generated rate replaces manual override");
    }
    info!(
        awb = %awb.awb_no,
        chargeable_weight,
        base_rate,
        total = breakdown.total,
        "generated AWB rate"
    );

    let rates = Rates {
        breakdown,
        source: RateSource::Generated(RateInputs {
            base_rate_per_kg: base_rate,
            other_charges,
        }),
    };
    let slot = awb.rates.get_or_insert_with(|| AwbRates {
        rates: rates.clone(),
        rate_type: String::new(),
        classification: String::new(),
        iata_zone: String::new(),
    });
    slot.rates = rates;
    Ok(slot)
}

/// Sets the payable total by hand. Non-numeric or negative input is rejected
/// and nothing changes.
pub fn override_total(awb: &mut AirWaybill, input: &str) -> Result<f64, CargoError> {
    let total = parse_amount(input)
        .filter(|v| *v >= 0.0)
        .ok_or_else(|| CargoError::InvalidTotalAmount(input.trim().to_string()))?;
    let total = round2(total);

    info!(awb = %awb.awb_no, total, "manual rate override");

    let slot = awb.rates.get_or_insert_with(|| AwbRates {
        rates: Rates {
            breakdown: RateBreakdown::default(),
            source: RateSource::ManualOverride(total),
        },
        rate_type: String::new(),
        classification: String::new(),
        iata_zone: String::new(),
    });
    slot.rates.source = RateSource::ManualOverride(total);
    Ok(total)
}

/// True when re-generating would erase a manual override; the caller should
/// warn first.
pub fn would_discard_override(awb: &AirWaybill) -> bool {
    awb.rates.as_ref().is_some_and(AwbRates::is_manually_adjusted)
}

/// Charges entered in the per-piece rate dialog.
#[derive(Debug, Clone)]
pub struct PieceRateEntry {
    pub base_rate_per_kg: Option<f64>,
    pub base_charge: f64,
    pub fuel_surcharge: f64,
    pub security_surcharge: f64,
    pub other_charges: f64,
    pub currency: String,
    generated: bool,
}

impl Default for PieceRateEntry {
    fn default() -> Self {
        Self {
            base_rate_per_kg: None,
            base_charge: 0.0,
            fuel_surcharge: 0.0,
            security_surcharge: 0.0,
            other_charges: 0.0,
            currency: "USD".to_string(),
            generated: false,
        }
    }
}

impl PieceRateEntry {
    /// Prefills the dialog from a piece's saved rates.
    pub fn from_rates(rates: &Rates) -> Self {
        let b = &rates.breakdown;
        Self {
            base_rate_per_kg: (b.base_rate_per_kg > 0.0).then_some(b.base_rate_per_kg),
            base_charge: b.base_charge,
            fuel_surcharge: b.fuel_surcharge,
            security_surcharge: b.security_surcharge,
            other_charges: b.other_charges,
            currency: b.currency.clone(),
            generated: !rates.is_manually_adjusted(),
        }
    }

    /// The explicit "generate" action: base charge from rate × chargeable weight.
    pub fn generate_base_charge(
        &mut self,
        base_rate_per_kg: Option<f64>,
        chargeable_weight_kg: f64,
    ) -> Result<f64, CargoError> {
        let base_charge = derive_base_charge(base_rate_per_kg, chargeable_weight_kg)?;
        self.base_rate_per_kg = base_rate_per_kg;
        self.base_charge = base_charge;
        self.generated = true;
        Ok(base_charge)
    }

    /// Editing the base charge by hand makes the entry manual again.
    pub fn set_base_charge(&mut self, base_charge: f64) {
        self.base_charge = base_charge;
        self.generated = false;
    }

    pub fn total(&self) -> f64 {
        round2(self.base_charge + self.fuel_surcharge + self.security_surcharge + self.other_charges)
    }
}

pub fn derive_base_charge(
    base_rate_per_kg: Option<f64>,
    chargeable_weight_kg: f64,
) -> Result<f64, CargoError> {
    let base_rate = positive_base_rate(base_rate_per_kg)?;
    if !chargeable_weight_kg.is_finite() || chargeable_weight_kg <= 0.0 {
        return Err(CargoError::ZeroChargeableWeight);
    }
    Ok(round2(base_rate * chargeable_weight_kg))
}

/// Builds piece rates from the dialog. The caller persists them explicitly.
pub fn piece_rate(entry: &PieceRateEntry) -> Result<Rates, CargoError> {
    let breakdown = RateBreakdown {
        base_rate_per_kg: entry.base_rate_per_kg.unwrap_or(0.0),
        base_charge: non_negative("Base charge", entry.base_charge)?,
        fuel_surcharge: non_negative("Fuel surcharge", entry.fuel_surcharge)?,
        security_surcharge: non_negative("Security surcharge", entry.security_surcharge)?,
        other_charges: non_negative("Other charges", entry.other_charges)?,
        total: entry.total(),
        currency: entry.currency.clone(),
    };
    let source = if entry.generated {
        RateSource::Generated(RateInputs {
            base_rate_per_kg: breakdown.base_rate_per_kg,
            other_charges: breakdown.other_charges,
        })
    } else {
        RateSource::ManualOverride(breakdown.total)
    };
    Ok(Rates { breakdown, source })
}
