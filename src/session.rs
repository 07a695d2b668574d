//! Working state carried between commands: the AWB being edited and the last
//! search. Loaded once at session start and saved once at the end; nothing
//! persists implicitly.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CargoError;
use crate::model::{AirWaybill, CargoPiece};
use crate::weight::summarize_pieces;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    awb_details: Option<AirWaybill>,
    #[serde(default)]
    pieces: Vec<CargoPiece>,
    #[serde(default)]
    last_search: SavedSearch,
}

impl AppState {
    pub fn load(path: &Path) -> Result<Self, CargoError> {
        if !path.exists() {
            debug!(path = %path.display(), "no saved session, starting fresh");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| CargoError::Io(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| CargoError::Decode(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), CargoError> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| CargoError::Decode(e.to_string()))?;
        std::fs::write(path, text)
            .map_err(|e| CargoError::Io(format!("cannot write {}: {e}", path.display())))
    }

    pub fn awb_details(&self) -> Option<&AirWaybill> {
        self.awb_details.as_ref()
    }

    /// Switching AWBs drops the pieces of the previous one.
    pub fn select_awb(&mut self, awb: AirWaybill) {
        if self.awb_details.as_ref().map(|a| &a.awb_no) != Some(&awb.awb_no) {
            self.pieces.clear();
        }
        self.awb_details = Some(awb);
    }

    pub fn clear_awb(&mut self) {
        self.awb_details = None;
        self.pieces.clear();
    }

    pub fn pieces(&self) -> &[CargoPiece] {
        &self.pieces
    }

    /// Replaces the piece list and refreshes the AWB aggregates from it.
    pub fn set_pieces(&mut self, pieces: Vec<CargoPiece>) {
        let totals = summarize_pieces(&pieces);
        if let Some(awb) = self.awb_details.as_mut() {
            awb.apply_piece_totals(&totals);
        }
        self.pieces = pieces;
    }

    pub fn last_search(&self) -> &SavedSearch {
        &self.last_search
    }

    pub fn set_last_search(&mut self, search: SavedSearch) {
        self.last_search = search;
    }
}
