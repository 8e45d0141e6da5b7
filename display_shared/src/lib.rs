use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Element id -> new value. Values stay loosely typed: booleans and numbers
/// drive logic button state, strings carry text or HTML fragments.
pub type ItemMap = HashMap<String, Value>;

/// Server to browser envelope.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum DisplayUpdate {
    /// Full HTML replacing the visible document.
    Page(String),
    /// In-place patches for single elements.
    Items(ItemMap),
}

/// Browser to server envelope: one user interaction on the current screen.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ControlEvent {
    pub page: String,
    pub id: String,
    pub pressed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
}

impl ControlEvent {
    pub fn new(page: &str, id: &str, pressed: bool) -> Self {
        Self {
            page: page.to_string(),
            id: id.to_string(),
            pressed,
            data: None,
        }
    }
}
