//! Response classification
//!
//! A status predicate decides whether a response takes the success path or the
//! failure path of a responder.

use std::sync::Arc;

use http::StatusCode;

use super::response::HttpResponse;

/// Classifies a response as "ok" (success target) or "not ok" (failure target)
pub type StatusPredicate = Arc<dyn Fn(StatusCode, &HttpResponse) -> bool + Send + Sync>;

/// Default classification: status in `200..=299`
#[inline]
pub fn is_ok(status: StatusCode, _response: &HttpResponse) -> bool {
    (200..=299).contains(&status.as_u16())
}

/// The default predicate as a shareable value
#[must_use]
pub fn default_predicate() -> StatusPredicate {
    Arc::new(is_ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_hundreds_are_ok() {
        let response = HttpResponse::new(StatusCode::OK, "");
        for code in [200u16, 201, 204, 299] {
            let status = StatusCode::from_u16(code).expect("valid status");
            assert!(is_ok(status, &response), "{code} should be ok");
        }
        for code in [100u16, 301, 304, 400, 404, 500] {
            let status = StatusCode::from_u16(code).expect("valid status");
            assert!(!is_ok(status, &response), "{code} should not be ok");
        }
    }
}
