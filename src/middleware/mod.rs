pub mod request_logging;
pub mod security_headers;

pub use request_logging::RequestLogging;
pub use security_headers::SecurityHeaders;
