pub mod bearer_guard;
