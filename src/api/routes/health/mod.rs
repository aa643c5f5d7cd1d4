pub mod consts;
pub mod handlers;
