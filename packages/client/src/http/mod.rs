//! HTTP request/response values and status classification

pub mod request;
pub mod response;
pub mod status;

pub use request::HttpRequest;
pub use response::HttpResponse;
pub use status::{StatusPredicate, default_predicate, is_ok};
