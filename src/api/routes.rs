use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, HttpResponse};

use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(health_check))
        // API
        .service(
            web::scope("/api")
                .wrap(Logger::default())
                .wrap(
                    Cors::default()
                        .allowed_origin_fn(|origin, _req_head| {
                            origin.as_bytes().starts_with(b"http://localhost")
                                || origin.as_bytes().starts_with(b"https://")
                        })
                        .allowed_methods(vec!["GET", "POST"])
                        .allowed_headers(vec!["Content-Type"])
                        .max_age(3600),
                )
                .route(
                    "/generate-package",
                    web::post().to(handlers::generate_package),
                )
                .route("/templates", web::get().to(handlers::list_templates))
                .route(
                    "/templates/{name}/fields",
                    web::get().to(handlers::inspect_form_fields),
                )
                .route("/test/word/{name}", web::post().to(handlers::test_fill_word))
                .route("/test/pdf/{name}", web::post().to(handlers::test_fill_pdf)),
        );
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "message": "Lease Package Assembly API"
    }))
}
