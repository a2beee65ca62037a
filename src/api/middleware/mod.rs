//! API middleware components

pub mod deadline;
pub mod logging;
pub mod resource;
pub mod user_auth;

pub use deadline::request_deadline;
pub use logging::logging_middleware;
pub use resource::{load_resource, Loaded};
pub use user_auth::require_bearer;
