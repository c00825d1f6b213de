//! Preconstructed deck records.

use serde::{Deserialize, Serialize};

/// One deck entry from `DeckList.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub deck_type: Option<String>,
    pub release_date: Option<String>,
    pub file_name: Option<String>,
}
