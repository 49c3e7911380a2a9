//! Sequential assembly of a lease package.
//!
//! Documents are processed strictly in request order: the external office
//! converter is treated as a serialized resource, and output page order must
//! equal the request order. Per-document failures become warnings; the
//! request only fails outright when nothing could be processed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::{AppConfig, AssemblyError, AssemblyResult, LeaseData};
use crate::models::{DocumentKind, DocumentOutcome, DocumentResult};
use crate::pdf;
use crate::word::{self, OfficeConverter};

/// Result of one assembly run, before storage upload.
#[derive(Debug)]
pub struct AssemblyOutcome {
    pub pdf: Vec<u8>,
    pub results: Vec<DocumentResult>,
    pub warnings: Vec<String>,
    pub documents_processed: usize,
}

/// Run the full fill-convert-merge pipeline over the requested document
/// list. Does not touch object storage.
pub async fn assemble(
    config: &AppConfig,
    converter: &OfficeConverter,
    data: &LeaseData,
    overrides: Option<&HashMap<String, String>>,
    documents: &[String],
) -> AssemblyResult<AssemblyOutcome> {
    if documents.is_empty() {
        return Err(AssemblyError::Validation(
            "documents list is empty".to_string(),
        ));
    }

    let mut filled: Vec<Vec<u8>> = Vec::new();
    let mut results: Vec<DocumentResult> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    for name in documents {
        let kind = DocumentKind::from_name(name);

        let Some(path) = resolve_template(config, name) else {
            warnings.push(format!("template not found: {name}"));
            results.push(record(name, kind, DocumentOutcome::Skipped, "not found"));
            continue;
        };

        if kind == DocumentKind::Unknown {
            warnings.push(format!("unsupported template type: {name}"));
            results.push(record(
                name,
                kind,
                DocumentOutcome::Skipped,
                "unsupported extension",
            ));
            continue;
        }

        match process_document(converter, data, overrides, &path, kind).await {
            Ok(bytes) => {
                info!(template = %name, "document processed");
                filled.push(bytes);
                results.push(DocumentResult {
                    name: name.clone(),
                    kind,
                    outcome: DocumentOutcome::Success,
                    detail: None,
                });
            }
            Err(e) => {
                warn!(template = %name, "document failed: {e}");
                warnings.push(format!("{name}: {e}"));
                results.push(record(name, kind, DocumentOutcome::Error, &e.to_string()));
            }
        }
    }

    let documents_processed = filled.len();
    if documents_processed == 0 {
        return Err(AssemblyError::Document(
            "no documents processed".to_string(),
        ));
    }

    // A single document skips merging entirely; its content must reach the
    // package untouched.
    let pdf = if filled.len() == 1 {
        filled.pop().expect("exactly one element")
    } else {
        let buffers = std::mem::take(&mut filled);
        tokio::task::spawn_blocking(move || pdf::merge_pdfs(&buffers))
            .await
            .map_err(|e| AssemblyError::Merge(format!("merge task failed: {e}")))??
    };

    Ok(AssemblyOutcome {
        pdf,
        results,
        warnings,
        documents_processed,
    })
}

/// Fill and convert one resolved template into PDF bytes.
pub async fn process_document(
    converter: &OfficeConverter,
    data: &LeaseData,
    overrides: Option<&HashMap<String, String>>,
    path: &Path,
    kind: DocumentKind,
) -> AssemblyResult<Vec<u8>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AssemblyError::Document(format!("failed to read template: {e}")))?;

    match kind {
        DocumentKind::Word => {
            let is_docx = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("docx"));

            // Placeholder filling only applies to the .docx package format;
            // legacy .doc goes straight to the converter.
            let staged = if is_docx {
                let data = data.clone();
                tokio::task::spawn_blocking(move || word::fill_docx(&bytes, &data))
                    .await
                    .map_err(|e| AssemblyError::Document(format!("fill task failed: {e}")))??
            } else {
                bytes
            };

            converter.docx_to_pdf(&staged).await
        }
        DocumentKind::Pdf => {
            let data = data.clone();
            let overrides = overrides.cloned();
            let (filled, class) = tokio::task::spawn_blocking(move || {
                pdf::classify_and_fill(&bytes, &data, overrides.as_ref())
            })
            .await
            .map_err(|e| AssemblyError::Document(format!("fill task failed: {e}")))??;

            info!(template = %path.display(), ?class, "classified PDF template");
            Ok(filled)
        }
        DocumentKind::Unknown => Err(AssemblyError::Document(
            "unsupported template type".to_string(),
        )),
    }
}

/// Resolve a requested name inside the flat templates directory, rejecting
/// anything that could escape it.
pub fn resolve_template(config: &AppConfig, name: &str) -> Option<PathBuf> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return None;
    }
    let path = config.templates_dir.join(name);
    path.is_file().then_some(path)
}

fn record(name: &str, kind: DocumentKind, outcome: DocumentOutcome, detail: &str) -> DocumentResult {
    DocumentResult {
        name: name.to_string(),
        kind,
        outcome,
        detail: Some(detail.to_string()),
    }
}
