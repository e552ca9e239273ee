use actix_web::HttpResponse;

use crate::domain::SubscriptionOutcome;

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(SubscriptionOutcome::failure("Endpoint not found"))
}
