pub const SUCCESSFUL_STATUS: u16 = 200;
pub const FAILED_STATUS: u16 = 503;
pub const MIME: &str = "application/health+json";
