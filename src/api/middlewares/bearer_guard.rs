use std::future::{ready, Ready};

use actix_web::{
    body::EitherBody,
    dev::{self, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpResponse,
};
use futures_util::future::LocalBoxFuture;

use crate::domain::error::CommonError;

/// How a guarded route reacts to the configured secret and the presented token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPolicy {
    /// Open while no secret is configured, `400` without a token.
    TriggerIngress,
    /// `500` while no secret is configured, `401` without a token.
    MetricsScrape,
}

impl GuardPolicy {
    pub fn verdict(self, expected: &str, presented: Option<&str>) -> Result<(), CommonError> {
        match (self, expected.is_empty(), presented) {
            (Self::TriggerIngress, true, _) => Ok(()),
            (Self::MetricsScrape, true, _) => Err(CommonError::Unknown(
                "Metrics token is not configured".to_string(),
            )),
            (Self::TriggerIngress, false, None) => Err(CommonError::BadRequest(
                "Missing authorization token".to_string(),
            )),
            (_, false, Some(token)) if token == expected => Ok(()),
            (Self::TriggerIngress, false, Some(_)) => {
                Err(CommonError::Unauthorized("Invalid trigger token".to_string()))
            }
            (Self::MetricsScrape, false, _) => {
                Err(CommonError::Unauthorized("Invalid metrics token".to_string()))
            }
        }
    }
}

/// Token of an `Authorization: Bearer <token>` header, if present.
pub fn bearer_token(request: &ServiceRequest) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Checks a shared bearer secret on `routes`, other routes pass through untouched.
pub struct BearerGuard {
    routes: Vec<String>,
    expected: String,
    policy: GuardPolicy,
}

impl BearerGuard {
    pub fn new(routes: &[&str], expected: String, policy: GuardPolicy) -> Self {
        BearerGuard {
            routes: routes.iter().map(|route| route.to_string()).collect(),
            expected,
            policy,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerGuardMiddleware {
            service,
            routes: self.routes.clone(),
            expected: self.expected.clone(),
            policy: self.policy,
        }))
    }
}

pub struct BearerGuardMiddleware<S> {
    service: S,
    routes: Vec<String>,
    expected: String,
    policy: GuardPolicy,
}

impl<S> BearerGuardMiddleware<S> {
    fn guards(&self, request: &ServiceRequest) -> bool {
        request
            .match_pattern()
            .map_or(false, |pattern| self.routes.iter().any(|route| *route == pattern))
    }
}

impl<S, B> Service<ServiceRequest> for BearerGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, request: ServiceRequest) -> Self::Future {
        if self.guards(&request) {
            if let Err(error) = self.policy.verdict(&self.expected, bearer_token(&request)) {
                if let CommonError::Unknown(reason) = &error {
                    log::error!("{} on {}", reason, request.path());
                }
                let (request, _pl) = request.into_parts();
                let response = HttpResponse::from_error(error).map_into_right_body();
                return Box::pin(async { Ok(ServiceResponse::new(request, response)) });
            }
        }

        let res = self.service.call(request);
        Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
    }
}
