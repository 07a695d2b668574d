use crate::error::CargoError;
use crate::model::{AirWaybill, Airport, User};
use crate::search::parse_timestamp;
use validator::ValidateEmail;

/// `XXX-XXXXXXXX`: 3-digit airline prefix, dash, 8-digit serial.
pub fn validate_awb_number(awb_no: &str) -> Result<(), CargoError> {
    let ok = match awb_no.split_once('-') {
        Some((prefix, serial)) => {
            prefix.len() == 3
                && serial.len() == 8
                && prefix.chars().all(|c| c.is_ascii_digit())
                && serial.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    };
    if !ok {
        return Err(CargoError::InvalidAwbNumber(awb_no.to_string()));
    }
    Ok(())
}

pub fn validate_icao(code: &str) -> Result<(), CargoError> {
    if code.len() != 4 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(CargoError::InvalidIcao(code.to_string()));
    }
    Ok(())
}

pub fn validate_iata(code: &str) -> Result<(), CargoError> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(CargoError::InvalidIata(code.to_string()));
    }
    Ok(())
}

/// Address shape per `validator`; the domain must also contain a dot.
pub fn validate_email(email: &str) -> Result<(), CargoError> {
    let dotted = email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.'));
    if !dotted || !email.validate_email() {
        return Err(CargoError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

fn require(value: &str, label: &str) -> Result<(), CargoError> {
    if value.trim().is_empty() {
        return Err(CargoError::Validation(format!("{label} is required")));
    }
    Ok(())
}

fn optional_date(value: &Option<String>) -> Result<(), CargoError> {
    match value.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() && parse_timestamp(d).is_none() => {
            Err(CargoError::InvalidDate(d.to_string()))
        }
        _ => Ok(()),
    }
}

impl AirWaybill {
    pub fn validate(&self) -> Result<(), CargoError> {
        validate_awb_number(&self.awb_no)?;
        if !self.mawb_no.is_empty() {
            validate_awb_number(&self.mawb_no)?;
        }
        require(&self.shipper_name, "shipper name")?;
        require(&self.consignee_name, "consignee name")?;
        validate_iata(&self.origin)?;
        validate_iata(&self.destination)?;
        if self.origin == self.destination {
            return Err(CargoError::Validation(
                "origin and destination must differ".into(),
            ));
        }
        optional_date(&self.ready_date)?;
        optional_date(&self.arrival_date)?;

        if let (Some(ready), Some(arrival)) = (
            self.ready_date.as_deref().and_then(parse_timestamp),
            self.arrival_date.as_deref().and_then(parse_timestamp),
        ) {
            if arrival < ready {
                return Err(CargoError::Validation(
                    "arrival date cannot be before ready date".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Airport {
    pub fn validate(&self) -> Result<(), CargoError> {
        validate_icao(&self.icao)?;
        validate_iata(&self.iata)?;
        require(&self.name, "airport name")?;
        require(&self.city, "city")?;
        require(&self.country, "country")?;
        for (i, runway) in self.runways.iter().enumerate() {
            if runway.length_meters.is_some_and(|l| l <= 0.0) {
                return Err(CargoError::Validation(format!(
                    "runway {} length must be greater than 0",
                    i + 1
                )));
            }
        }
        if let Some(agent) = &self.handling_agent {
            if !agent.email.trim().is_empty() {
                validate_email(agent.email.trim())?;
            }
        }
        Ok(())
    }
}

/// Rejects an ICAO/IATA pair already used by another airport.
pub fn ensure_unique_airport(existing: &[Airport], candidate: &Airport) -> Result<(), CargoError> {
    for other in existing {
        if other.id.is_some() && other.id == candidate.id {
            continue;
        }
        if other.icao == candidate.icao {
            return Err(CargoError::Conflict(format!(
                "ICAO code {} already exists",
                candidate.icao
            )));
        }
        if other.iata == candidate.iata {
            return Err(CargoError::Conflict(format!(
                "IATA code {} already exists",
                candidate.iata
            )));
        }
    }
    Ok(())
}

impl User {
    pub fn validate(&self) -> Result<(), CargoError> {
        require(&self.name, "name")?;
        validate_email(&self.email)
    }
}
