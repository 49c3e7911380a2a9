use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inferred template handling, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Word,
    Pdf,
    Unknown,
}

impl DocumentKind {
    pub fn from_name(name: &str) -> Self {
        let extension = std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("docx") | Some("doc") => DocumentKind::Word,
            Some("pdf") => DocumentKind::Pdf,
            _ => DocumentKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentOutcome {
    Success,
    Skipped,
    Error,
}

/// Per-template status record for the response manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    pub name: String,
    pub kind: DocumentKind,
    pub outcome: DocumentOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    pub documents_requested: usize,
    pub documents_processed: usize,
    pub documents: Vec<DocumentResult>,
}

/// Successful response of the generate-package endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageResponse {
    pub success: bool,
    pub pdf_url: String,
    pub preview_url: String,
    pub file_name: String,
    pub generated_at: DateTime<Utc>,
    pub metadata: PackageMetadata,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

/// Entry of the template-listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub name: String,
    pub kind: DocumentKind,
}

/// Entry of the form-field inspection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldInfo {
    pub name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<String>,
}
