//! Client model matching the frontend Client interface.

use serde::{Deserialize, Serialize};

/// A registered client in the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub parent_name: String,
    pub instagram: String,
    pub tiktok: String,
    pub phone_number: String,
    pub whatsapp_number: String,
    pub notes: String,
    /// RFC3339 timestamp, set once at creation and preserved on edits.
    pub created_at: String,
}

/// Raw form input for creating or editing a client.
///
/// All fields arrive as plain strings; the validator decides what is
/// acceptable. Missing fields deserialize as empty strings so a partial
/// payload fails validation instead of deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub tiktok: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub whatsapp_number: String,
    #[serde(default)]
    pub notes: String,
}
