pub mod api;
pub mod components;
pub mod dispatcher;
pub mod domain;
pub mod metrics;

pub use api::app::{get_app_data, get_app_router, run_service};

fn generate_uuid_v4() -> String {
    uuid::Uuid::new_v4().to_string()
}
