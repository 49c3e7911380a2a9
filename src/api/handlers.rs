use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::assembly::{self, orchestrator};
use crate::core::LeaseData;
use crate::models::{
    DocumentKind, FormFieldInfo, GeneratePackageRequest, PackageMetadata, PackageResponse,
    TemplateInfo, TestFillRequest,
};
use crate::pdf;

use super::error::{ApiError, ApiResult};
use super::state::ApiState;

/// Run the full assembly pipeline: fill every requested template, merge,
/// upload, and answer with the signed preview URL and per-document manifest.
pub async fn generate_package(
    body: web::Json<GeneratePackageRequest>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let request = body.into_inner();
    if request.documents.is_empty() {
        return Err(ApiError::bad_request("documents list is empty"));
    }

    let data = LeaseData::new(request.lease_data);
    let documents_requested = request.documents.len();
    info!(documents = documents_requested, "assembling lease package");

    let outcome = assembly::assemble(
        &state.config,
        &state.converter,
        &data,
        request.field_overrides.as_ref(),
        &request.documents,
    )
    .await?;

    let published = state
        .s3_client
        .publish_package(outcome.pdf, data.lease_id())
        .await?;

    info!(key = %published.key, "lease package published");

    Ok(HttpResponse::Ok().json(PackageResponse {
        success: true,
        pdf_url: published.pdf_url,
        preview_url: published.preview_url,
        file_name: published.file_name,
        generated_at: Utc::now(),
        metadata: PackageMetadata {
            documents_requested,
            documents_processed: outcome.documents_processed,
            documents: outcome.results,
        },
        warnings: outcome.warnings,
    }))
}

/// List every template in the flat templates directory with its inferred
/// handling.
pub async fn list_templates(state: web::Data<ApiState>) -> ApiResult<HttpResponse> {
    let mut templates: Vec<TemplateInfo> = Vec::new();

    let mut entries = tokio::fs::read_dir(&state.config.templates_dir)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("templates directory: {e}")))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?
    {
        if !entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let kind = DocumentKind::from_name(&name);
        templates.push(TemplateInfo { name, kind });
    }
    templates.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(HttpResponse::Ok().json(json!({ "templates": templates })))
}

/// Inspect the form fields of a named PDF template.
pub async fn inspect_form_fields(
    path: web::Path<String>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let name = path.into_inner();
    let template = resolve_or_404(&state, &name)?;
    if DocumentKind::from_name(&name) != DocumentKind::Pdf {
        return Err(ApiError::bad_request("form inspection only applies to PDF templates"));
    }

    let bytes = tokio::fs::read(&template).await?;
    let fields = web::block(move || pdf::inspect_fields(&bytes))
        .await
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let fields: Vec<FormFieldInfo> = fields
        .into_iter()
        .map(|f| FormFieldInfo {
            name: f.name,
            kind: f.kind.as_str().to_string(),
            options: f.options,
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({ "name": name, "fields": fields })))
}

/// Test endpoint: fill and convert a single Word template, returning the raw
/// PDF bytes without touching storage.
pub async fn test_fill_word(
    path: web::Path<String>,
    body: web::Json<TestFillRequest>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let name = path.into_inner();
    let template = resolve_or_404(&state, &name)?;
    if DocumentKind::from_name(&name) != DocumentKind::Word {
        return Err(ApiError::bad_request("not a Word template"));
    }

    let data = LeaseData::new(body.into_inner().lease_data);
    let pdf = orchestrator::process_document(
        &state.converter,
        &data,
        None,
        &template,
        DocumentKind::Word,
    )
    .await?;

    Ok(raw_pdf_response(pdf))
}

/// Test endpoint: classify and fill a single PDF template, returning the raw
/// PDF bytes without touching storage.
pub async fn test_fill_pdf(
    path: web::Path<String>,
    body: web::Json<TestFillRequest>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let name = path.into_inner();
    let template = resolve_or_404(&state, &name)?;
    if DocumentKind::from_name(&name) != DocumentKind::Pdf {
        return Err(ApiError::bad_request("not a PDF template"));
    }

    let request = body.into_inner();
    let data = LeaseData::new(request.lease_data);
    let pdf = orchestrator::process_document(
        &state.converter,
        &data,
        request.field_overrides.as_ref(),
        &template,
        DocumentKind::Pdf,
    )
    .await?;

    Ok(raw_pdf_response(pdf))
}

fn resolve_or_404(state: &ApiState, name: &str) -> Result<std::path::PathBuf, ApiError> {
    orchestrator::resolve_template(&state.config, name)
        .ok_or_else(|| ApiError::not_found(format!("template not found: {name}")))
}

fn raw_pdf_response(pdf: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .body(pdf)
}
