use std::collections::HashMap;

use actix_web::{get, http::StatusCode, web::Data, HttpResponse};

use serde::Serialize;

use super::consts::{FAILED_STATUS, MIME, SUCCESSFUL_STATUS};
use crate::components::{
    app::AppComponents,
    health::{ComponentHealthStatus, FAIL, PASS},
};

#[derive(Debug, Default, Serialize)]
struct ReadinessResponse {
    details: HashMap<String, ComponentHealthStatus>,
    status: String,
}

pub async fn is_app_healthy(app_data: Data<AppComponents>) -> HttpResponse {
    let checks = app_data.health.calculate_status().await;
    let is_ready = !checks
        .values()
        .any(|value| value.status.eq_ignore_ascii_case(FAIL));

    let (status, label) = if is_ready {
        (SUCCESSFUL_STATUS, PASS)
    } else {
        (FAILED_STATUS, FAIL)
    };

    let response = ReadinessResponse {
        details: checks,
        status: label.to_string(),
    };

    HttpResponse::build(StatusCode::from_u16(status).unwrap_or(StatusCode::SERVICE_UNAVAILABLE))
        .content_type(MIME)
        .json(response)
}

/**
 * Readiness probes indicate whether the dispatcher can reach the realtime
 * database. While it can't, trigger calls would only end up as skipped
 * notifications, so the pod is taken out of the pool until it recovers.
 */
#[get("/health/ready")]
pub async fn health(app_data: Data<AppComponents>) -> HttpResponse {
    is_app_healthy(app_data).await
}

#[get("/health/startup")]
pub async fn startup(app_data: Data<AppComponents>) -> HttpResponse {
    is_app_healthy(app_data).await
}

#[get("/health/live")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().json("alive")
}
