use serde::{Deserialize, Serialize};

/// Inbound payload for meta description generation. Absent fields
/// deserialize to the empty string, so "missing" and "empty" are the same
/// observable input.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MetaRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MetaResponse {
    pub meta: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ErrorResponse {
    pub error: String,
}
