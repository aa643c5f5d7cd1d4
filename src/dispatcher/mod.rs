pub mod counterpart;
pub mod delivery;
pub mod handlers;

pub use counterpart::{resolve_counterpart, Counterpart};
pub use delivery::{Delivery, DeliveryMode};
pub use handlers::{HandlerOutcome, NotificationDispatcher};
