//! Public API tests

use std::sync::{Arc, Mutex};

use meteor::{
    Credentials, Doer, HttpRequest, HttpResponse, JsonResponder, Meteor, Result, USER_AGENT,
};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct Forecast {
    summary: String,
    high: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct ApiError {
    message: String,
}

fn weather_api() -> (Arc<dyn Doer>, Arc<Mutex<Vec<HttpRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let transport = move |request: HttpRequest| -> Result<HttpResponse> {
        let authorized = request
            .url()
            .query_pairs()
            .any(|(key, value)| key == "key" && value == "k-123");
        let response = if authorized {
            HttpResponse::new(
                http::StatusCode::OK,
                r#"{"summary":"sunny","high":24}"#,
            )
        } else {
            HttpResponse::new(http::StatusCode::UNAUTHORIZED, r#"{"message":"bad key"}"#)
        };
        log.lock().expect("request log").push(request);
        Ok(response)
    };
    let transport: Arc<dyn Doer> = Arc::new(transport);
    (transport, seen)
}

#[test]
fn common_service_uses_client_transport_and_agent() {
    env_logger::try_init().ok();

    let (transport, seen) = weather_api();
    let credentials = Credentials::new().with("api_key", "k-123");
    let client = Meteor::new(credentials, Some(transport));

    let forecast = Arc::new(JsonResponder::<Forecast, ApiError>::default());
    let path = format!("forecast?key={}", client.credential("api_key"));
    client
        .common()
        .base("http://weather.test/v2")
        .get(&[path.as_str()])
        .responder(forecast.clone())
        .receive()
        .expect("forecast");

    assert_eq!(
        forecast.success(),
        Some(Forecast {
            summary: "sunny".into(),
            high: 24
        })
    );
    let requests = seen.lock().expect("request log");
    assert_eq!(requests[0].headers()["user-agent"], USER_AGENT);
    assert_eq!(requests[0].url().path(), "/v2/forecast");
}

#[test]
fn unauthorized_decodes_failure() {
    env_logger::try_init().ok();

    let (transport, _) = weather_api();
    let client = Meteor::new(Credentials::new(), Some(transport));
    let forecast = Arc::new(JsonResponder::<Forecast, ApiError>::default());
    let response = client
        .common()
        .raw_base("http://weather.test/v2/forecast?key=nope")
        .responder(forecast.clone())
        .receive()
        .expect("decoded failure");

    assert_eq!(response.status(), http::StatusCode::UNAUTHORIZED);
    assert_eq!(forecast.failure().map(|e| e.message), Some("bad key".to_owned()));
}

#[test]
fn common_services_are_independent() {
    env_logger::try_init().ok();

    let (transport, _) = weather_api();
    let client = Meteor::new(Credentials::new(), Some(transport))
        .with_user_agent("forecaster/3");

    let first = client.common().json_responder(Forecast::default(), ApiError::default());
    let second = client.common();
    first
        .raw_base("http://weather.test/v2/forecast?key=k-123")
        .receive()
        .expect("forecast");

    assert!(second.current_responder().response().is_none());
    assert_eq!(second.headers()["user-agent"], "forecaster/3");
    assert_eq!(client.user_agent(), "forecaster/3");
}

#[test]
fn fan_out_through_the_public_api() {
    env_logger::try_init().ok();

    let (transport, seen) = weather_api();
    let client = Meteor::new(Credentials::new(), Some(transport));
    let cities = ["oslo", "lima", "pune"];
    let api = client
        .common()
        .base("http://weather.test/v2")
        .json_responder(Forecast::default(), ApiError::default());
    let requests = cities
        .iter()
        .map(|&city| {
            api.child()
                .get(&["forecast", city])
                .path("?key=k-123")
                .async_request()
        })
        .collect();

    let responses = api.do_async(requests);
    assert_eq!(responses.len(), 3);
    assert!(
        responses
            .iter()
            .all(|r| r.success::<Forecast>().is_some_and(|f| f.high == 24))
    );
    assert_eq!(seen.lock().expect("request log").len(), 3);
}
