pub mod app;
pub mod configuration;
pub mod health;
pub mod messaging;
pub mod store;
pub mod tracing;
