//! OpenAPI specification endpoints

use actix_web::{get, HttpResponse, Responder};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ticket Triage Agent",
        description = "Classifies support tickets by category, severity, and matched knowledge-base issue"
    ),
    paths(
        crate::api::triage::triage_ticket,
        crate::api::health::liveness,
        crate::api::health::readiness
    ),
    components(schemas(
        crate::api::triage::TriageRequest,
        crate::api::error::ErrorResponse,
        crate::api::health::HealthStatus,
        crate::api::health::ReadinessStatus,
        crate::api::health::DependencyHealth,
        crate::model::ClassificationResult,
        crate::model::LlmExtraction,
        crate::model::AnalysisSource,
        crate::model::Severity
    )),
    tags(
        (name = "triage", description = "Ticket classification"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json);
}
