//! REST API endpoint for ticket triage

use actix_web::{post, web, HttpResponse, Responder};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::service::TriageService;

/// Triage request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct TriageRequest {
    /// Identifier for the client raising the ticket
    #[serde(default)]
    pub client_id: Option<String>,
    /// The support ticket text to classify
    pub ticket: String,
}

/// Classify a support ticket.
///
/// Always returns a complete classification for non-empty ticket text; the
/// pipeline degrades through heuristics rather than failing.
#[utoipa::path(
    post,
    path = "/v1/triage",
    request_body = TriageRequest,
    responses(
        (status = 200, description = "Ticket classified", body = crate::model::ClassificationResult),
        (status = 400, description = "Empty ticket text", body = crate::api::error::ErrorResponse)
    ),
    tag = "triage"
)]
#[post("/v1/triage")]
pub async fn triage_ticket(
    service: web::Data<TriageService>,
    request: web::Json<TriageRequest>,
) -> Result<impl Responder, ApiError> {
    if request.ticket.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "ticket text must not be empty".to_string(),
        ));
    }

    let result = service
        .classify(&request.ticket, request.client_id.as_deref())
        .await;

    Ok(HttpResponse::Ok().json(result))
}

/// Configure triage routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(triage_ticket);
}
