//! Thin client for the cargo REST API. Every call is a single request with no
//! retry; failures come back as `CargoError` carrying the server's message.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use wreq::Client;

use crate::error::{self, CargoError};
use crate::model::{AirWaybill, Airport, AwbRates, CargoPiece, Rates, User};

#[derive(Debug, Clone, Deserialize)]
pub struct ApiOptions {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            token: None,
        }
    }
}

/// Request paths, relative to the API base URL.
pub mod routes {
    use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

    /// Characters that cannot appear raw inside one path segment.
    const SEGMENT: &AsciiSet = &CONTROLS
        .add(b' ')
        .add(b'"')
        .add(b'#')
        .add(b'%')
        .add(b'/')
        .add(b'<')
        .add(b'>')
        .add(b'?')
        .add(b'`')
        .add(b'{')
        .add(b'}');

    fn segment(raw: &str) -> String {
        utf8_percent_encode(raw.trim(), SEGMENT).to_string()
    }

    pub fn awbs() -> String {
        "/awbs".to_string()
    }

    pub fn awb(awb_no: &str) -> String {
        format!("/awbs/{}", segment(awb_no))
    }

    pub fn awb_rates(awb_no: &str) -> String {
        format!("/awbs/{}/rates", segment(awb_no))
    }

    pub fn pieces(awb_no: &str) -> String {
        format!("/awbs/{}/pieces", segment(awb_no))
    }

    pub fn piece(awb_no: &str, piece_id: &str) -> String {
        format!("/awbs/{}/pieces/{}", segment(awb_no), segment(piece_id))
    }

    pub fn piece_rates(awb_no: &str, piece_id: &str) -> String {
        format!("{}/rates", piece(awb_no, piece_id))
    }

    pub fn airports() -> String {
        "/airports".to_string()
    }

    pub fn airport(icao: &str) -> String {
        format!("/airports/{}", segment(icao))
    }

    pub fn users() -> String {
        "/admin/users".to_string()
    }

    pub fn pending_users() -> String {
        "/admin/pending-users".to_string()
    }

    pub fn approve_user(id: &str) -> String {
        format!("/admin/approve-user/{}", segment(id))
    }

    pub fn reject_user(id: &str) -> String {
        format!("/admin/reject-user/{}", segment(id))
    }

    pub fn delete_user(id: &str) -> String {
        format!("/admin/delete-user/{}", segment(id))
    }
}

#[derive(Debug, Clone, Copy)]
enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

/// Accepts either a bare payload or one wrapped in `{"data": ...}`.
fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CargoError> {
    let text = if text.trim().is_empty() { "null" } else { text };
    let value: Value = serde_json::from_str(text).map_err(|e| CargoError::Decode(e.to_string()))?;
    match serde_json::from_value::<T>(value.clone()) {
        Ok(v) => Ok(v),
        Err(first) => match value.get("data") {
            Some(inner) => serde_json::from_value(inner.clone())
                .map_err(|e| CargoError::Decode(e.to_string())),
            None => Err(CargoError::Decode(first.to_string())),
        },
    }
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(options: &ApiOptions) -> Result<Self, CargoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(error::from_http_error)?;
        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            token: options.token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        verb: Verb,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T, CargoError> {
        let url = self.url(path);
        debug!(?verb, %url, "cargo API request");

        let mut request = match verb {
            Verb::Get => self.client.get(url.as_str()),
            Verb::Post => self.client.post(url.as_str()),
            Verb::Put => self.client.put(url.as_str()),
            Verb::Delete => self.client.delete(url.as_str()),
        };
        request = request.header("accept", "application/json");
        if let Some(ref token) = self.token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        if let Some(bytes) = body {
            request = request.header("content-type", "application/json").body(bytes);
        }

        let response = request.send().await.map_err(error::from_http_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(error::from_http_error)?;

        if status >= 400 {
            let err = error::from_status(status, &text);
            warn!(status, %url, error = %err, "cargo API call failed");
            return Err(err);
        }
        decode(&text)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        verb: Verb,
        path: &str,
        body: &B,
    ) -> Result<T, CargoError> {
        let bytes = serde_json::to_vec(body).map_err(|e| CargoError::Decode(e.to_string()))?;
        self.send(verb, path, Some(bytes)).await
    }

    pub async fn list_awbs(&self) -> Result<Vec<AirWaybill>, CargoError> {
        self.send(Verb::Get, &routes::awbs(), None).await
    }

    pub async fn get_awb(&self, awb_no: &str) -> Result<AirWaybill, CargoError> {
        self.send(Verb::Get, &routes::awb(awb_no), None).await
    }

    pub async fn create_awb(&self, awb: &AirWaybill) -> Result<AirWaybill, CargoError> {
        awb.validate()?;
        self.send_json(Verb::Post, &routes::awbs(), awb).await
    }

    pub async fn update_awb(&self, awb: &AirWaybill) -> Result<AirWaybill, CargoError> {
        awb.validate()?;
        self.send_json(Verb::Put, &routes::awb(&awb.awb_no), awb).await
    }

    pub async fn delete_awb(&self, awb_no: &str) -> Result<(), CargoError> {
        self.send::<Value>(Verb::Delete, &routes::awb(awb_no), None)
            .await
            .map(|_| ())
    }

    pub async fn save_awb_rates(&self, awb_no: &str, rates: &AwbRates) -> Result<AwbRates, CargoError> {
        self.send_json(Verb::Put, &routes::awb_rates(awb_no), rates).await
    }

    pub async fn list_pieces(&self, awb_no: &str) -> Result<Vec<CargoPiece>, CargoError> {
        self.send(Verb::Get, &routes::pieces(awb_no), None).await
    }

    pub async fn add_piece(&self, awb_no: &str, piece: &CargoPiece) -> Result<CargoPiece, CargoError> {
        self.send_json(Verb::Post, &routes::pieces(awb_no), piece).await
    }

    pub async fn update_piece(
        &self,
        awb_no: &str,
        piece_id: &str,
        piece: &CargoPiece,
    ) -> Result<CargoPiece, CargoError> {
        self.send_json(Verb::Put, &routes::piece(awb_no, piece_id), piece)
            .await
    }

    pub async fn delete_piece(&self, awb_no: &str, piece_id: &str) -> Result<(), CargoError> {
        self.send::<Value>(Verb::Delete, &routes::piece(awb_no, piece_id), None)
            .await
            .map(|_| ())
    }

    pub async fn save_piece_rates(
        &self,
        awb_no: &str,
        piece_id: &str,
        rates: &Rates,
    ) -> Result<Rates, CargoError> {
        self.send_json(Verb::Put, &routes::piece_rates(awb_no, piece_id), rates)
            .await
    }

    pub async fn list_airports(&self) -> Result<Vec<Airport>, CargoError> {
        self.send(Verb::Get, &routes::airports(), None).await
    }

    pub async fn get_airport(&self, icao: &str) -> Result<Airport, CargoError> {
        self.send(Verb::Get, &routes::airport(icao), None).await
    }

    pub async fn create_airport(&self, airport: &Airport) -> Result<Airport, CargoError> {
        airport.validate()?;
        self.send_json(Verb::Post, &routes::airports(), airport).await
    }

    pub async fn update_airport(&self, airport: &Airport) -> Result<Airport, CargoError> {
        airport.validate()?;
        self.send_json(Verb::Put, &routes::airport(&airport.icao), airport)
            .await
    }

    pub async fn delete_airport(&self, icao: &str) -> Result<(), CargoError> {
        self.send::<Value>(Verb::Delete, &routes::airport(icao), None)
            .await
            .map(|_| ())
    }

    pub async fn list_users(&self) -> Result<Vec<User>, CargoError> {
        self.send(Verb::Get, &routes::users(), None).await
    }

    pub async fn list_pending_users(&self) -> Result<Vec<User>, CargoError> {
        self.send(Verb::Get, &routes::pending_users(), None).await
    }

    pub async fn approve_user(&self, id: &str) -> Result<User, CargoError> {
        self.send(Verb::Put, &routes::approve_user(id), None).await
    }

    pub async fn reject_user(&self, id: &str) -> Result<User, CargoError> {
        self.send(Verb::Put, &routes::reject_user(id), None).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), CargoError> {
        self.send::<Value>(Verb::Delete, &routes::delete_user(id), None)
            .await
            .map(|_| ())
    }
}
