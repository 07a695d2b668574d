use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CargoError {
    InvalidDimension(String),
    InvalidWeight(String),
    InvalidAwbNumber(String),
    InvalidIcao(String),
    InvalidIata(String),
    InvalidEmail(String),
    InvalidDate(String),
    Validation(String),
    InvalidBaseRate,
    ZeroChargeableWeight,
    InvalidTotalAmount(String),
    Timeout,
    ConnectionFailed(String),
    NotFound(String),
    Conflict(String),
    Remote { status: u16, message: String },
    Decode(String),
    Export(String),
    Io(String),
    Config(String),
}

impl CargoError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidDimension(_) => "invalid_dimension",
            Self::InvalidWeight(_) => "invalid_weight",
            Self::InvalidAwbNumber(_) => "invalid_awb_number",
            Self::InvalidIcao(_) => "invalid_icao",
            Self::InvalidIata(_) => "invalid_iata",
            Self::InvalidEmail(_) => "invalid_email",
            Self::InvalidDate(_) => "invalid_date",
            Self::Validation(_) => "validation_error",
            Self::InvalidBaseRate => "invalid_base_rate",
            Self::ZeroChargeableWeight => "zero_chargeable_weight",
            Self::InvalidTotalAmount(_) => "invalid_total_amount",
            Self::Timeout => "timeout",
            Self::ConnectionFailed(_) => "connection_failed",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Remote { .. } => "remote_error",
            Self::Decode(_) => "decode_error",
            Self::Export(_) => "export_error",
            Self::Io(_) => "io_error",
            Self::Config(_) => "config_error",
        }
    }

    /// Validation and business-rule failures are caught before any network call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimension(_)
                | Self::InvalidWeight(_)
                | Self::InvalidAwbNumber(_)
                | Self::InvalidIcao(_)
                | Self::InvalidIata(_)
                | Self::InvalidEmail(_)
                | Self::InvalidDate(_)
                | Self::Validation(_)
                | Self::InvalidBaseRate
                | Self::ZeroChargeableWeight
                | Self::InvalidTotalAmount(_)
        )
    }
}

impl fmt::Display for CargoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension(msg) | Self::InvalidWeight(msg) => write!(f, "{msg}"),
            Self::InvalidAwbNumber(no) => write!(
                f,
                "invalid AWB number \"{no}\" — must be XXX-XXXXXXXX (3-digit airline prefix, 8 digits)"
            ),
            Self::InvalidIcao(code) => write!(
                f,
                "invalid ICAO code \"{code}\" — must be exactly 4 letters (e.g. KJFK, EFHK)"
            ),
            Self::InvalidIata(code) => write!(
                f,
                "invalid IATA code \"{code}\" — must be exactly 3 letters (e.g. JFK, HEL)"
            ),
            Self::InvalidEmail(email) => write!(f, "invalid email address \"{email}\""),
            Self::InvalidDate(date) => write!(
                f,
                "invalid date \"{date}\" — must be YYYY-MM-DD or an ISO 8601 timestamp"
            ),
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::InvalidBaseRate => write!(
                f,
                "please enter a valid positive Base Rate per Kg before generating rates"
            ),
            Self::ZeroChargeableWeight => write!(
                f,
                "Chargeable Weight must be greater than 0 to generate rates"
            ),
            Self::InvalidTotalAmount(input) => write!(
                f,
                "Invalid total amount \"{input}\" — must be a non-negative number"
            ),
            Self::Timeout => write!(
                f,
                "request timed out — the cargo API may be slow or unreachable. \
                 Try increasing --timeout or check your connection"
            ),
            Self::ConnectionFailed(detail) => write!(
                f,
                "connection failed — check the API base URL and your network ({detail})"
            ),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Conflict(msg) => write!(f, "{msg}"),
            Self::Remote { status, message } => write!(f, "{message} (HTTP {status})"),
            Self::Decode(detail) => write!(
                f,
                "failed to decode response from the cargo API — {detail}"
            ),
            Self::Export(detail) => write!(f, "export failed — {detail}"),
            Self::Io(detail) => write!(f, "{detail}"),
            Self::Config(detail) => write!(f, "configuration error — {detail}"),
        }
    }
}

impl std::error::Error for CargoError {}

impl From<rust_xlsxwriter::XlsxError> for CargoError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<config::ConfigError> for CargoError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub fn from_http_error(err: wreq::Error) -> CargoError {
    let msg = err.to_string();

    if err.is_timeout() {
        return CargoError::Timeout;
    }

    CargoError::ConnectionFailed(msg)
}

/// Fallback used when an error body carries no `message`.
pub const GENERIC_REMOTE_MESSAGE: &str = "request to the cargo API failed";

/// Maps a non-success HTTP status and its body to an error, pulling the
/// user-facing text from the body's `message` field when present.
pub fn from_status(status: u16, body: &str) -> CargoError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_REMOTE_MESSAGE.to_string());

    match status {
        404 => CargoError::NotFound(message),
        409 => CargoError::Conflict(message),
        _ => CargoError::Remote { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_comes_from_body() {
        let err = from_status(404, r#"{"message":"AWB 176-12345675 not found"}"#);
        assert_eq!(err, CargoError::NotFound("AWB 176-12345675 not found".into()));
    }

    #[test]
    fn status_without_body_uses_fallback() {
        let err = from_status(500, "<html>oops</html>");
        assert_eq!(
            err,
            CargoError::Remote {
                status: 500,
                message: GENERIC_REMOTE_MESSAGE.into()
            }
        );
    }

    #[test]
    fn duplicate_key_maps_to_conflict() {
        let err = from_status(409, r#"{"message":"ICAO code already exists"}"#);
        assert_eq!(err.kind(), "conflict");
        assert_eq!(err.to_string(), "ICAO code already exists");
    }

    #[test]
    fn business_rule_errors_are_local() {
        assert!(CargoError::ZeroChargeableWeight.is_local());
        assert!(!CargoError::Timeout.is_local());
    }
}
