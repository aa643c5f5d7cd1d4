use actix_web::{get, web::Data, HttpResponse};

use crate::components::app::AppComponents;

pub const METRICS_URI: &str = "/metrics";

const PROMETHEUS_MIME: &str = "text/plain; version=0.0.4";

/// Access is checked by the bearer guard, see [`GuardPolicy::MetricsScrape`](crate::api::middlewares::bearer_guard::GuardPolicy).
#[get("/metrics")]
pub async fn metrics(app_data: Data<AppComponents>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(PROMETHEUS_MIME)
        .body(app_data.metrics.encode())
}
