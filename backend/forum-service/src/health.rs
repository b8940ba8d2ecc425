//! HTTP side server routes: liveness, readiness and metrics.

use crate::metrics::serve_metrics;
use crate::repository::ForumStore;
use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::error;

async fn ready(store: web::Data<Arc<dyn ForumStore>>) -> HttpResponse {
    match store.health_check().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "ready" })),
        Err(e) => {
            error!(error = %e, "Readiness check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "not_ready",
                "error": e.to_string(),
            }))
        }
    }
}

/// Register `/health`, `/ready` and `/metrics`.
pub fn configure(store: Arc<dyn ForumStore>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(store))
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/ready", web::get().to(ready))
            .route("/metrics", web::get().to(serve_metrics));
    }
}
