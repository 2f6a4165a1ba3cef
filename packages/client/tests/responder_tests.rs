//! Responder behaviour across the variants

use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use bytes::Bytes;
use http::StatusCode;
use meteor_client::http::HttpResponse;
use meteor_client::responder::{
    BinaryResponder, GenericResponder, JsonResponder, Responder, SharedSink, Target,
};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct Widget {
    id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct ApiError {
    message: String,
}

fn response(status: StatusCode, body: &'static str) -> HttpResponse {
    HttpResponse::new(status, body)
}

#[test]
fn widget_is_decoded_on_ok() {
    let responder = JsonResponder::<Widget, ApiError>::default();
    let returned = responder
        .respond(None, Ok(response(StatusCode::OK, r#"{"id":7}"#)))
        .do_response()
        .expect("valid widget");

    assert_eq!(returned.status(), StatusCode::OK);
    assert_eq!(responder.success(), Some(Widget { id: 7 }));
    assert_eq!(responder.failure(), Some(ApiError::default()));
    assert!(responder.error().is_none());
}

#[test]
fn empty_bad_request_is_not_an_error() {
    let responder = JsonResponder::<Widget, ApiError>::default();
    let returned = responder
        .respond(None, Ok(response(StatusCode::BAD_REQUEST, "")))
        .do_response()
        .expect("empty body is nothing to decode");

    assert_eq!(returned.status(), StatusCode::BAD_REQUEST);
    assert_eq!(responder.failure(), Some(ApiError::default()));
    assert!(responder.error().is_none());
}

#[test]
fn classification_picks_exactly_one_target() {
    // both shapes accept this body, so only classification decides
    let body = r#"{"id":7,"message":"boom"}"#;

    for code in 200..=299 {
        let status = StatusCode::from_u16(code).expect("valid status");
        let responder = JsonResponder::<Widget, ApiError>::default();
        responder
            .respond(None, Ok(response(status, body)))
            .do_response()
            .expect("decodes");
        assert_eq!(responder.success(), Some(Widget { id: 7 }), "status {code}");
        assert_eq!(responder.failure(), Some(ApiError::default()), "status {code}");
    }

    for code in [100, 101, 199, 300, 301, 304, 399, 400, 401, 404, 418, 429, 500, 502, 503, 599] {
        let status = StatusCode::from_u16(code).expect("valid status");
        let responder = JsonResponder::<Widget, ApiError>::default();
        responder
            .respond(None, Ok(response(status, body)))
            .do_response()
            .expect("decodes");
        assert_eq!(responder.success(), Some(Widget::default()), "status {code}");
        assert_eq!(
            responder.failure(),
            Some(ApiError {
                message: "boom".to_owned()
            }),
            "status {code}"
        );
    }
}

#[test]
fn binary_keeps_body() {
    let responder = BinaryResponder::new();
    responder
        .respond(None, Ok(response(StatusCode::OK, "abc")))
        .do_response()
        .expect("bytes");
    assert_eq!(responder.success(), Some(Bytes::from_static(b"abc")));

    let erased = responder
        .success_any()
        .and_then(|value| value.downcast::<Bytes>().ok());
    assert_eq!(erased.as_deref(), Some(&Bytes::from_static(b"abc")));
}

#[test]
fn transport_error_skips_decode() {
    let responder = JsonResponder::<Widget, ApiError>::default();
    let err = responder
        .respond(None, Err(meteor_client::error::timeout(meteor_client::error::TimedOut)))
        .do_response()
        .expect_err("transport failed");

    assert!(err.is_timeout());
    assert!(responder.response().is_none());
    assert!(responder.error().is_some_and(|e| e.is_timeout()));
    assert_eq!(responder.success(), Some(Widget::default()));
}

#[test]
fn decode_failure_falls_back_to_raw_body() {
    let responder = JsonResponder::<Widget, ApiError>::default();
    let err = responder
        .respond(None, Ok(response(StatusCode::BAD_GATEWAY, "<html>upstream down</html>")))
        .do_response()
        .expect_err("html is not json");

    assert!(err.is_decode());
    assert_eq!(responder.failure(), None);
    assert_eq!(
        responder.failure_raw(),
        Some(Bytes::from_static(b"<html>upstream down</html>"))
    );
    // the raw response stays available
    assert_eq!(
        responder.response().map(|r| r.status()),
        Some(StatusCode::BAD_GATEWAY)
    );
}

#[test]
fn sink_target_receives_failure_body() {
    let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
    let sink: SharedSink = buffer.clone();
    let responder = JsonResponder::<Widget, ApiError>::with_targets(
        Target::Value(Widget::default()),
        Target::Sink(sink),
    );
    responder
        .respond(None, Ok(response(StatusCode::NOT_FOUND, "no such widget")))
        .do_response()
        .expect("sink write");

    assert_eq!(buffer.lock().expect("lock").as_slice(), b"no such widget");
}

#[test]
fn concurrent_do_response_decodes_once() {
    let responder = Arc::new(JsonResponder::<Widget, ApiError>::default());
    responder.respond(None, Ok(response(StatusCode::OK, r#"{"id":42}"#)));

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let responder = Arc::clone(&responder);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let outcome = responder.do_response().map(|r| r.status());
                (outcome.ok(), responder.success())
            })
        })
        .collect();

    for handle in handles {
        let (status, success) = handle.join().expect("reader thread");
        assert_eq!(status, Some(StatusCode::OK));
        assert_eq!(success, Some(Widget { id: 42 }));
    }
}

#[test]
fn readers_run_alongside_decode() {
    let responder = Arc::new(JsonResponder::<Widget, ApiError>::default());
    responder.respond(None, Ok(response(StatusCode::OK, r#"{"id":5}"#)));

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..100 {
                    // before decode the initial value, after it the decoded one
                    let seen = responder.success().expect("typed target");
                    assert!(seen == Widget::default() || seen == Widget { id: 5 });
                }
            });
        }
        scope.spawn(|| responder.do_response().expect("decodes"));
    });

    assert_eq!(responder.success(), Some(Widget { id: 5 }));
}

#[test]
fn fresh_responders_are_independent() {
    let original: Arc<dyn Responder> = Arc::new(JsonResponder::<Widget, ApiError>::default());
    let copy = original.fresh();

    copy.respond(None, Ok(response(StatusCode::OK, r#"{"id":1}"#)))
        .do_response()
        .expect("decodes");

    assert!(original.response().is_none());
    assert!(original.success_any().is_some_and(|v| v.downcast_ref::<Widget>() == Some(&Widget::default())));
    assert!(copy.success_any().is_some_and(|v| v.downcast_ref::<Widget>() == Some(&Widget { id: 1 })));
}

#[test]
fn generic_responder_passes_through() {
    let responder = GenericResponder::new();
    let returned = responder
        .respond(None, Ok(response(StatusCode::IM_A_TEAPOT, "short and stout")))
        .do_response()
        .expect("passthrough");
    assert_eq!(returned.text(), "short and stout");
    assert!(!responder.is_ok(returned.status(), &returned));
}
