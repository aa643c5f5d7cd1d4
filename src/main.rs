use notification_dispatcher::{
    components::tracing::init_telemetry, get_app_data, run_service,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    let app_data = get_app_data(None, None);

    run_service(app_data)?.await
}
