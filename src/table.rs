use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::highlight::{highlight_text, mark_segments};
use crate::model::{AirWaybill, Airport, Rates, User};

const MARK_OPEN: &str = "[";
const MARK_CLOSE: &str = "]";

pub fn format_amount(amount: Option<f64>, currency: &str) -> String {
    let a = match amount {
        Some(a) => a,
        None => return "—".to_string(),
    };
    match currency {
        "USD" => format!("${a:.2}"),
        "EUR" => format!("€{a:.2}"),
        "GBP" => format!("£{a:.2}"),
        "JPY" | "CNY" => format!("¥{a:.2}"),
        "INR" => format!("₹{a:.2}"),
        "THB" => format!("฿{a:.2}"),
        _ => format!("{a:.2} {currency}"),
    }
}

pub fn format_weight(kg: Option<f64>) -> String {
    kg.map(|w| format!("{w:.2} kg"))
        .unwrap_or_else(|| "—".to_string())
}

fn date_only(value: Option<&str>) -> String {
    value
        .map(|d| d.get(..10).unwrap_or(d).to_string())
        .unwrap_or_else(|| "—".to_string())
}

fn marked(query: &str, value: &str) -> String {
    if query.is_empty() {
        return value.to_string();
    }
    mark_segments(&highlight_text(query, value), MARK_OPEN, MARK_CLOSE)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// AWB list view. Matches of `highlight` are wrapped in brackets.
pub fn render_awbs(awbs: &[AirWaybill], highlight: &str) -> String {
    let mut table = new_table(vec![
        "AWB", "Airline", "Customer", "Route", "Pcs", "Weight", "Chargeable", "Ready", "Status",
        "Total",
    ]);

    for awb in awbs {
        let route = format!(
            "{} → {}",
            marked(highlight, &awb.origin),
            marked(highlight, &awb.destination)
        );
        let currency = awb
            .rates
            .as_ref()
            .map(|r| r.rates.breakdown.currency.as_str())
            .unwrap_or("USD");
        let mut total = format_amount(awb.total_amount(), currency);
        if awb.rates.as_ref().is_some_and(|r| r.is_manually_adjusted()) {
            total.push_str(" (manual)");
        }

        table.add_row(vec![
            marked(highlight, &awb.awb_no),
            marked(highlight, &awb.airline),
            marked(highlight, &awb.customer),
            route,
            awb.pieces.to_string(),
            format_weight(awb.weight),
            format_weight(awb.chargeable_weight),
            date_only(awb.ready_date.as_deref()),
            marked(highlight, awb.status.as_str()),
            total,
        ]);
    }

    table.to_string()
}

pub fn render_airports(airports: &[Airport], highlight: &str) -> String {
    let mut table = new_table(vec![
        "ICAO", "IATA", "Name", "City", "Country", "Runways", "Cargo", "Agent", "Status",
    ]);

    for airport in airports {
        let cargo = match &airport.cargo_facilities {
            Some(f) if f.has_cargo_terminal => "Terminal",
            Some(_) => "Limited",
            None => "—",
        };
        let agent = airport
            .handling_agent
            .as_ref()
            .map(|h| h.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "—".to_string());

        table.add_row(vec![
            marked(highlight, &airport.icao),
            marked(highlight, &airport.iata),
            marked(highlight, &airport.name),
            marked(highlight, &airport.city),
            marked(highlight, &airport.country),
            airport.runways.len().to_string(),
            cargo.to_string(),
            marked(highlight, &agent),
            airport.status.to_string(),
        ]);
    }

    table.to_string()
}

pub fn render_users(users: &[User], highlight: &str) -> String {
    let mut table = new_table(vec!["Name", "Email", "Role", "Status", "Created"]);

    for user in users {
        table.add_row(vec![
            marked(highlight, &user.name),
            marked(highlight, &user.email),
            user.role.to_string(),
            user.status.to_string(),
            date_only(user.created_at.as_deref()),
        ]);
    }

    table.to_string()
}

/// One line per AWB, for scripts.
pub fn compact_awb(awb: &AirWaybill) -> String {
    let currency = awb
        .rates
        .as_ref()
        .map(|r| r.rates.breakdown.currency.as_str())
        .unwrap_or("USD");
    format!(
        "{} | {}>{} | {} pcs | {} | {} | {}",
        awb.awb_no,
        awb.origin,
        awb.destination,
        awb.pieces,
        format_weight(awb.chargeable_weight),
        awb.status,
        format_amount(awb.total_amount(), currency)
    )
}

pub fn compact_airport(airport: &Airport) -> String {
    format!(
        "{}/{} | {} | {}, {} | {}",
        airport.icao, airport.iata, airport.name, airport.city, airport.country, airport.status
    )
}

/// Charge lines for a piece or AWB rate.
pub fn render_rates(rates: &Rates) -> String {
    let b = &rates.breakdown;
    let mut table = new_table(vec!["Charge", "Amount"]);
    let rows = [
        ("Base rate / kg", b.base_rate_per_kg),
        ("Base charge", b.base_charge),
        ("Fuel surcharge", b.fuel_surcharge),
        ("Security surcharge", b.security_surcharge),
        ("Other charges", b.other_charges),
    ];
    for (label, amount) in rows {
        table.add_row(vec![label.to_string(), format_amount(Some(amount), &b.currency)]);
    }
    let total_label = if rates.is_manually_adjusted() {
        "Total (manual override)"
    } else {
        "Total"
    };
    table.add_row(vec![
        total_label.to_string(),
        format_amount(Some(rates.total()), &b.currency),
    ]);
    table.to_string()
}
