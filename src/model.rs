use serde::{Deserialize, Serialize};

use crate::error::CargoError;

/// Accepts numbers, numeric strings, empty strings and nulls, the way form
/// fields arrive from the cargo API.
mod flex {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Raw>::deserialize(d)? {
            Some(Raw::Num(n)) => Some(n),
            Some(Raw::Text(s)) => s.trim().parse().ok(),
            None => None,
        })
    }

    pub fn f64_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        opt_f64(d).map(|v| v.unwrap_or(0.0))
    }

    /// Counts arrive as `3`, `3.0` or `"3"`. Anything else counts as zero.
    pub fn u32_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(match opt_f64(d)? {
            Some(n) if n.is_finite() && n >= 0.0 && n <= u32::MAX as f64 => n.round() as u32,
            _ => 0,
        })
    }
}

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        ///
        /// Labels the API sends that this build does not know decode to
        /// `Unknown` instead of failing the whole record.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
        pub enum $name {
            #[default]
            $(#[serde(rename = $label)] $variant,)+
            Unknown,
        }

        impl $name {
            /// Every known label; `Unknown` is never offered as a choice.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Unknown => "Unknown",
                }
            }

            pub fn from_str_loose(s: &str) -> Result<Self, CargoError> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| CargoError::Validation(format!(
                        "invalid {}: {s}",
                        stringify!($name)
                    )))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                Ok(match Option::<serde_json::Value>::deserialize(d)? {
                    None | Some(serde_json::Value::Null) => Self::default(),
                    Some(serde_json::Value::String(raw)) if raw.trim().is_empty() => Self::default(),
                    Some(serde_json::Value::String(raw)) => {
                        Self::from_str_loose(&raw).unwrap_or(Self::Unknown)
                    }
                    Some(_) => Self::Unknown,
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

labelled_enum!(SpecialHandling {
    Normal => "Normal",
    Fragile => "Fragile",
    Perishable => "Perishable",
    Dangerous => "Dangerous",
    Valuable => "Valuable",
    LiveAnimals => "Live Animals",
});

labelled_enum!(PieceStatus {
    Pending => "Pending",
    Loaded => "Loaded",
    Active => "Active",
    Delivered => "Delivered",
    Damaged => "Damaged",
    Missing => "Missing",
});

labelled_enum!(
    /// Operational lifecycle of an AWB, in the order the planning screens move it.
    AwbStatus {
        Request => "Request",
        Waiting => "Waiting",
        Confirmed => "Confirmed",
        Booked => "Booked",
        Received => "Received",
        Manifested => "Manifested",
        Departed => "Departed",
        InTransit => "In Transit",
        Arrived => "Arrived",
        Customs => "Customs",
        OutForDelivery => "Out for Delivery",
        Delivered => "Delivered",
        OnHold => "On Hold",
        Canceled => "Canceled",
    }
);

labelled_enum!(ApprovalStatus {
    Pending => "Pending",
    Approved => "Approved",
    Rejected => "Rejected",
});

labelled_enum!(CustomsClearance {
    Pending => "Pending",
    Cleared => "Cleared",
    Held => "Held",
});

labelled_enum!(InsuranceStatus {
    Paid => "Paid",
    Approved => "Approved",
    Declined => "Declined",
    Expired => "Expired",
});

labelled_enum!(AirportStatus {
    Active => "Active",
    Inactive => "Inactive",
    Closed => "Closed",
});

labelled_enum!(Role {
    User => "user",
    Admin => "admin",
});

labelled_enum!(AccountStatus {
    Pending => "pending",
    Active => "active",
    Rejected => "rejected",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    #[serde(default, deserialize_with = "flex::opt_f64", skip_serializing_if = "Option::is_none")]
    pub length_cm: Option<f64>,
    #[serde(default, deserialize_with = "flex::opt_f64", skip_serializing_if = "Option::is_none")]
    pub width_cm: Option<f64>,
    #[serde(default, deserialize_with = "flex::opt_f64", skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
}

impl Dimensions {
    pub fn new(length_cm: f64, width_cm: f64, height_cm: f64) -> Self {
        Self {
            length_cm: Some(length_cm),
            width_cm: Some(width_cm),
            height_cm: Some(height_cm),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateBreakdown {
    pub base_rate_per_kg: f64,
    pub base_charge: f64,
    pub fuel_surcharge: f64,
    pub security_surcharge: f64,
    pub other_charges: f64,
    /// Sum of the four charge components.
    pub total: f64,
    pub currency: String,
}

impl Default for RateBreakdown {
    fn default() -> Self {
        Self {
            base_rate_per_kg: 0.0,
            base_charge: 0.0,
            fuel_surcharge: 0.0,
            security_surcharge: 0.0,
            other_charges: 0.0,
            total: 0.0,
            currency: default_currency(),
        }
    }
}

impl RateBreakdown {
    pub fn component_sum(&self) -> f64 {
        self.base_charge + self.fuel_surcharge + self.security_surcharge + self.other_charges
    }
}

/// Formula inputs recorded when a rate was produced by the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateInputs {
    pub base_rate_per_kg: f64,
    pub other_charges: f64,
}

/// Where the payable total comes from. A generated rate and a manual override
/// never coexist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateSource {
    Generated(RateInputs),
    ManualOverride(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PieceRatesWire", into = "PieceRatesWire")]
pub struct Rates {
    pub breakdown: RateBreakdown,
    pub source: RateSource,
}

impl Rates {
    pub fn total(&self) -> f64 {
        match self.source {
            RateSource::ManualOverride(total) => total,
            RateSource::Generated(_) => self.breakdown.total,
        }
    }

    pub fn is_manually_adjusted(&self) -> bool {
        matches!(self.source, RateSource::ManualOverride(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AwbRatesWire", into = "AwbRatesWire")]
pub struct AwbRates {
    pub rates: Rates,
    pub rate_type: String,
    pub classification: String,
    pub iata_zone: String,
}

impl AwbRates {
    pub fn total(&self) -> f64 {
        self.rates.total()
    }

    pub fn is_manually_adjusted(&self) -> bool {
        self.rates.is_manually_adjusted()
    }
}

// Flat API shapes. `isManuallyAdjusted` on the wire picks the RateSource variant.

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateComponentsWire {
    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    base_rate_per_kg: f64,
    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    base_charge: f64,
    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    fuel_surcharge: f64,
    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    security_surcharge: f64,
    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    other_charges: f64,
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default)]
    is_manually_adjusted: bool,
}

impl RateComponentsWire {
    fn into_rates(self, total: f64) -> Rates {
        let mut breakdown = RateBreakdown {
            base_rate_per_kg: self.base_rate_per_kg,
            base_charge: self.base_charge,
            fuel_surcharge: self.fuel_surcharge,
            security_surcharge: self.security_surcharge,
            other_charges: self.other_charges,
            total: 0.0,
            currency: self.currency,
        };
        breakdown.total = breakdown.component_sum();
        let source = if self.is_manually_adjusted {
            RateSource::ManualOverride(total)
        } else {
            breakdown.total = total;
            RateSource::Generated(RateInputs {
                base_rate_per_kg: self.base_rate_per_kg,
                other_charges: self.other_charges,
            })
        };
        Rates { breakdown, source }
    }

    fn from_rates(rates: &Rates) -> Self {
        let b = &rates.breakdown;
        Self {
            base_rate_per_kg: b.base_rate_per_kg,
            base_charge: b.base_charge,
            fuel_surcharge: b.fuel_surcharge,
            security_surcharge: b.security_surcharge,
            other_charges: b.other_charges,
            currency: b.currency.clone(),
            is_manually_adjusted: rates.is_manually_adjusted(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PieceRatesWire {
    #[serde(flatten)]
    components: RateComponentsWire,
    #[serde(default, alias = "totalAmount", deserialize_with = "flex::f64_or_zero")]
    total_rate: f64,
}

impl From<PieceRatesWire> for Rates {
    fn from(w: PieceRatesWire) -> Self {
        w.components.into_rates(w.total_rate)
    }
}

impl From<Rates> for PieceRatesWire {
    fn from(r: Rates) -> Self {
        Self {
            components: RateComponentsWire::from_rates(&r),
            total_rate: r.total(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AwbRatesWire {
    #[serde(flatten)]
    components: RateComponentsWire,
    #[serde(default, alias = "totalRate", deserialize_with = "flex::f64_or_zero")]
    total_amount: f64,
    #[serde(default)]
    rate_type: String,
    #[serde(default)]
    classification: String,
    #[serde(default)]
    iata_zone: String,
}

impl From<AwbRatesWire> for AwbRates {
    fn from(w: AwbRatesWire) -> Self {
        Self {
            rates: w.components.into_rates(w.total_amount),
            rate_type: w.rate_type,
            classification: w.classification,
            iata_zone: w.iata_zone,
        }
    }
}

impl From<AwbRates> for AwbRatesWire {
    fn from(r: AwbRates) -> Self {
        Self {
            components: RateComponentsWire::from_rates(&r.rates),
            total_amount: r.total(),
            rate_type: r.rate_type,
            classification: r.classification,
            iata_zone: r.iata_zone,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoPiece {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub piece_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awb_no: Option<String>,
    #[serde(flatten)]
    pub dimensions: Dimensions,
    #[serde(default, alias = "actualWeight", deserialize_with = "flex::opt_f64")]
    pub actual_weight_kg: Option<f64>,
    #[serde(default, alias = "volume", deserialize_with = "flex::opt_f64")]
    pub volume_cm3: Option<f64>,
    #[serde(default, alias = "chargeableWeight", deserialize_with = "flex::opt_f64")]
    pub chargeable_weight_kg: Option<f64>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub special_handling: SpecialHandling,
    #[serde(default)]
    pub status: PieceStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<Rates>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub postal_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Street,
    City,
    State,
    Country,
    PostalCode,
}

impl Address {
    pub fn set(&mut self, field: AddressField, value: impl Into<String>) {
        let slot = match field {
            AddressField::Street => &mut self.street,
            AddressField::City => &mut self.city,
            AddressField::State => &mut self.state,
            AddressField::Country => &mut self.country,
            AddressField::PostalCode => &mut self.postal_code,
        };
        *slot = value.into();
    }

    pub fn is_empty(&self) -> bool {
        [&self.street, &self.city, &self.state, &self.country, &self.postal_code]
            .iter()
            .all(|s| s.trim().is_empty())
    }

    /// Single-line rendering, skipping blank parts.
    pub fn one_line(&self) -> String {
        [&self.street, &self.city, &self.state, &self.postal_code, &self.country]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    Shipper,
    Consignee,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirWaybill {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub awb_no: String,
    #[serde(default)]
    pub mawb_no: String,
    #[serde(default)]
    pub airline: String,
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub shipper_name: String,
    #[serde(default)]
    pub shipper_contact: String,
    #[serde(default)]
    pub shipper_address: Address,
    #[serde(default)]
    pub consignee_name: String,
    #[serde(default)]
    pub consignee_contact: String,
    #[serde(default)]
    pub consignee_address: Address,
    #[serde(default, deserialize_with = "flex::u32_or_zero")]
    pub pieces: u32,
    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub chargeable_weight: Option<f64>,
    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub volume: Option<f64>,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: AwbStatus,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub customs_clearance: CustomsClearance,
    #[serde(default)]
    pub insurance: InsuranceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<AwbRates>,
    #[serde(default)]
    pub notes: String,
}

impl AirWaybill {
    pub fn address_mut(&mut self, role: PartyRole) -> &mut Address {
        match role {
            PartyRole::Shipper => &mut self.shipper_address,
            PartyRole::Consignee => &mut self.consignee_address,
        }
    }

    pub fn set_address_field(
        &mut self,
        role: PartyRole,
        field: AddressField,
        value: impl Into<String>,
    ) {
        self.address_mut(role).set(field, value);
    }

    /// Payable total, whichever rate path produced it.
    pub fn total_amount(&self) -> Option<f64> {
        self.rates.as_ref().map(AwbRates::total)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runway {
    #[serde(default)]
    pub designation: String,
    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub length_meters: Option<f64>,
    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub width_meters: Option<f64>,
    #[serde(default)]
    pub surface: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoFacilities {
    #[serde(default)]
    pub has_cargo_terminal: bool,
    #[serde(default)]
    pub cold_storage: bool,
    #[serde(default)]
    pub dangerous_goods: bool,
    #[serde(default)]
    pub bonded_warehouse: bool,
    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub storage_capacity_m3: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlingAgent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub icao: String,
    #[serde(default)]
    pub iata: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub elevation_ft: Option<f64>,
    #[serde(default)]
    pub runways: Vec<Runway>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo_facilities: Option<CargoFacilities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handling_agent: Option<HandlingAgent>,
    #[serde(default)]
    pub freight_forwarding: bool,
    #[serde(default)]
    pub accepts_perishables: bool,
    #[serde(default)]
    pub accepts_live_animals: bool,
    #[serde(default)]
    pub accepts_dangerous_goods: bool,
    #[serde(default)]
    pub serviced_airlines: Vec<String>,
    #[serde(default)]
    pub routes: Vec<String>,
    #[serde(default)]
    pub status: AirportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Airport {
    pub fn runway_mut(&mut self, index: usize) -> Option<&mut Runway> {
        self.runways.get_mut(index)
    }

    pub fn add_runway(&mut self, runway: Runway) {
        self.runways.push(runway);
    }

    pub fn remove_runway(&mut self, index: usize) -> Option<Runway> {
        (index < self.runways.len()).then(|| self.runways.remove(index))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl User {
    pub fn is_pending(&self) -> bool {
        self.status == AccountStatus::Pending
    }
}
