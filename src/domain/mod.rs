// Contains files that define objects representing business logic concepts used across the service.
pub mod change_event;
pub mod error;
pub mod feeling;
pub mod notification;
pub mod room;
pub mod trigger;
pub mod zone;
