use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of the generate-package endpoint. Both fields are required; actix
/// rejects a body missing either with a 400 before any processing starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePackageRequest {
    /// Opaque field-name → scalar mapping, passed through to the fillers.
    pub lease_data: Map<String, Value>,
    /// Ordered template file names; order determines output page order.
    pub documents: Vec<String>,
    /// Optional form-field-name → data-key (or `literal:<value>`) overrides.
    #[serde(default)]
    pub field_overrides: Option<HashMap<String, String>>,
}

/// Body of the single-document test endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFillRequest {
    #[serde(default)]
    pub lease_data: Map<String, Value>,
    #[serde(default)]
    pub field_overrides: Option<HashMap<String, String>>,
}
