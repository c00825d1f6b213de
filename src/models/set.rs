//! Set metadata records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One MTG set from the `sets` view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSummary {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub set_type: Option<String>,
    pub release_date: Option<String>,
    pub block: Option<String>,
    pub base_set_size: Option<i64>,
    pub total_set_size: Option<i64>,
    pub keyrune_code: Option<String>,
    pub parent_code: Option<String>,
    pub languages: Option<Vec<String>>,
    pub is_online_only: Option<bool>,
    pub is_foil_only: Option<bool>,
    pub is_non_foil_only: Option<bool>,
    pub is_partial_preview: Option<bool>,
    pub mcm_id: Option<i64>,
    pub mcm_name: Option<String>,
    pub mtgo_code: Option<String>,
    pub tcgplayer_group_id: Option<i64>,
    pub token_set_code: Option<String>,
    pub translations: Option<Value>,
}
