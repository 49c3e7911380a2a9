use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use serde_json::{json, Value};
use tempfile::TempDir;

use lease_packager::api::{configure_routes, ApiState};
use lease_packager::core::AppConfig;

fn static_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Object::Stream(Stream::new(
        Dictionary::new(),
        b"BT ET".to_vec(),
    )));
    let page_id = doc.add_object(dictionary! {
        "Type" => Object::Name(b"Page".to_vec()),
        "Parent" => Object::Reference(pages_id),
        "Contents" => Object::Reference(content_id),
        "MediaBox" => Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => Object::Name(b"Pages".to_vec()),
            "Kids" => Object::Array(vec![Object::Reference(page_id)]),
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => Object::Name(b"Catalog".to_vec()),
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

async fn test_state(templates: &TempDir) -> ApiState {
    // Static credentials so client construction never reaches out to the
    // instance metadata service.
    std::env::set_var("AWS_ACCESS_KEY_ID", "test");
    std::env::set_var("AWS_SECRET_ACCESS_KEY", "test");
    std::env::set_var("AWS_REGION", "us-east-1");

    let config = AppConfig {
        templates_dir: templates.path().to_path_buf(),
        ..AppConfig::default()
    };
    ApiState::new(config).await.unwrap()
}

#[actix_web::test]
async fn health_endpoint_reports_healthy() {
    let templates = TempDir::new().unwrap();
    let state = test_state(&templates).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn generate_package_rejects_empty_document_list() {
    let templates = TempDir::new().unwrap();
    let state = test_state(&templates).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/generate-package")
        .set_json(json!({ "leaseData": {}, "documents": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn generate_package_rejects_missing_lease_data() {
    let templates = TempDir::new().unwrap();
    let state = test_state(&templates).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/generate-package")
        .set_json(json!({ "documents": ["addendum.pdf"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn templates_endpoint_lists_directory_sorted() {
    let templates = TempDir::new().unwrap();
    std::fs::write(templates.path().join("rules.pdf"), static_pdf()).unwrap();
    std::fs::write(templates.path().join("lease.docx"), b"stub").unwrap();
    let state = test_state(&templates).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/templates").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let listed = body["templates"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["name"], "lease.docx");
    assert_eq!(listed[0]["kind"], "word");
    assert_eq!(listed[1]["name"], "rules.pdf");
    assert_eq!(listed[1]["kind"], "pdf");
}

#[actix_web::test]
async fn field_inspection_of_static_pdf_is_empty() {
    let templates = TempDir::new().unwrap();
    std::fs::write(templates.path().join("rules.pdf"), static_pdf()).unwrap();
    let state = test_state(&templates).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/templates/rules.pdf/fields")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["name"], "rules.pdf");
    assert_eq!(body["fields"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn field_inspection_of_unknown_template_is_404() {
    let templates = TempDir::new().unwrap();
    let state = test_state(&templates).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/templates/missing.pdf/fields")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_fill_returns_static_pdf_unchanged() {
    let templates = TempDir::new().unwrap();
    let original = static_pdf();
    std::fs::write(templates.path().join("rules.pdf"), &original).unwrap();
    let state = test_state(&templates).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/test/pdf/rules.pdf")
        .set_json(json!({ "leaseData": { "tenantName": "John" } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), original.as_slice());
}

#[actix_web::test]
async fn test_fill_pdf_rejects_word_template() {
    let templates = TempDir::new().unwrap();
    std::fs::write(templates.path().join("lease.docx"), b"stub").unwrap();
    let state = test_state(&templates).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/test/pdf/lease.docx")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
