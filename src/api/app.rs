use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory};
use actix_web::middleware;
use actix_web::web::{self, Data};
use actix_web::{App, HttpResponse, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::components::app::{AppComponents, CustomComponents};
use crate::components::configuration::Config;
use crate::components::tracing::init_telemetry;
use crate::domain::error::CommonError;

use super::middlewares::bearer_guard::{BearerGuard, GuardPolicy};
use super::routes::events::handlers::{change_event_handler, EVENTS_URI};
use super::routes::health::handlers::{health, live, startup};
use super::routes::metrics::handlers::{metrics, METRICS_URI};

pub fn run_service(data: Data<AppComponents>) -> Result<Server, std::io::Error> {
    init_telemetry();

    let server_host = data.config.server.host.clone();
    let server_port = data.config.server.port;

    log::info!(
        "System is running on {}:{} with {:?} delivery",
        server_host,
        server_port,
        data.dispatcher.delivery_mode()
    );

    let server = HttpServer::new(move || get_app_router(&data))
        .bind((server_host, server_port))?
        .run();

    Ok(server)
}

pub fn get_app_data(
    custom_config: Option<Config>,
    custom_components: Option<CustomComponents>,
) -> Data<AppComponents> {
    let app_data = AppComponents::new(custom_config, custom_components);
    Data::new(app_data)
}

async fn not_found() -> HttpResponse {
    HttpResponse::from_error(CommonError::NotFound("".to_owned()))
}

pub fn get_app_router(
    data: &Data<AppComponents>,
) -> App<
    impl ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| CommonError::BadRequest(err.to_string()).into());

    App::new()
        .app_data(data.clone())
        .app_data(json_config)
        .wrap(BearerGuard::new(
            &[EVENTS_URI],
            data.config.trigger_token.clone(),
            GuardPolicy::TriggerIngress,
        ))
        .wrap(BearerGuard::new(
            &[METRICS_URI],
            data.config.wkc_metrics_bearer_token.clone(),
            GuardPolicy::MetricsScrape,
        ))
        .wrap(middleware::NormalizePath::trim())
        .wrap(TracingLogger::default())
        .service(live)
        .service(health)
        .service(startup)
        .service(metrics)
        .service(change_event_handler)
        .default_service(web::route().to(not_found))
}
