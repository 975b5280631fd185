//! Drive a real server over TCP, the way a browser or `curl` would
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use wordtok::{IdStrategy, Service};
use wordtok_http::{HttpServer, ServerConfig};

#[derive(Debug, Deserialize)]
struct Encoded {
    tokens: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct Decoded {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Failed {
    error: String,
}

/// Start a server on an ephemeral port in the background and return the URL prefix for it.
///
/// The server thread is never stopped; it goes away with the test process.
fn start_server(id_strategy: IdStrategy) -> String {
    let config = ServerConfig {
        bind: SocketAddr::from(([127, 0, 0, 1], 0)),
        id_strategy,
        ..ServerConfig::default()
    };
    let server = HttpServer::bind(&config, Service::new(id_strategy)).unwrap();
    let addr = server.local_addr().unwrap();

    std::thread::spawn(move || server.run());

    format!("http://{addr}")
}

#[test]
fn greeting() {
    let base = start_server(IdStrategy::Random);

    let response = reqwest::blocking::get(format!("{base}/")).unwrap();

    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(
        Some("*"),
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok())
    );
    assert_eq!("Hello from custom-tokeniser!", response.text().unwrap());
}

#[test]
fn encode_decode_round_trip() {
    let base = start_server(IdStrategy::Random);
    let client = Client::new();

    let encoded: Encoded = client
        .post(format!("{base}/encode"))
        .json(&json!({ "text": "the  quick\tbrown fox" }))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(6, encoded.tokens.len());

    let again: Encoded = client
        .post(format!("{base}/encode"))
        .json(&json!({ "text": "the quick brown fox" }))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(encoded.tokens, again.tokens);

    let decoded: Decoded = client
        .post(format!("{base}/decode"))
        .json(&json!({ "tokens": encoded.tokens }))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!("the quick brown fox", decoded.text);
}

#[test]
fn bad_requests() {
    let base = start_server(IdStrategy::Sequential);
    let client = Client::new();

    let response = client
        .post(format!("{base}/encode"))
        .json(&json!({ "text": 42 }))
        .send()
        .unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!(
        "Missing or invalid text field",
        response.json::<Failed>().unwrap().error
    );

    let response = client
        .post(format!("{base}/decode"))
        .json(&json!({ "tokens": "not-an-array" }))
        .send()
        .unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!(
        "Missing or invalid tokens field (must be array)",
        response.json::<Failed>().unwrap().error
    );

    let response = client.get(format!("{base}/nowhere")).send().unwrap();
    assert_eq!(StatusCode::NOT_FOUND, response.status());
}

#[test]
fn oversized_bodies_are_refused() {
    let base = start_server(IdStrategy::Random);
    let client = Client::new();
    let huge = "word ".repeat(wordtok_http::DEFAULT_MAX_BODY_BYTES / 5 + 1);

    let response = client
        .post(format!("{base}/encode"))
        .json(&json!({ "text": huge }))
        .send()
        .unwrap();
    assert_eq!(StatusCode::PAYLOAD_TOO_LARGE, response.status());
    assert_eq!(
        "Request body too large",
        response.json::<Failed>().unwrap().error
    );

    // Nothing from the refused body was learned
    let vocab: Value = client
        .get(format!("{base}/vocab"))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(4, vocab["vocab"].as_object().unwrap().len());
}

#[test]
fn vocabulary_is_shared_between_requests() {
    let base = start_server(IdStrategy::Sequential);
    let client = Client::new();

    client
        .post(format!("{base}/encode"))
        .json(&json!({ "text": "remembered" }))
        .send()
        .unwrap();

    let vocab: Value = client
        .get(format!("{base}/vocab"))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(json!(5), vocab["vocab"]["remembered"]);

    let decoded: Decoded = client
        .post(format!("{base}/decode"))
        .json(&json!({ "tokens": [3, 5, 1, 4, 1234] }))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!("remembered <UNK>", decoded.text);
}

#[test]
fn cors_preflight() {
    let base = start_server(IdStrategy::Random);

    let response = Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/encode"))
        .header("Origin", "http://example.com")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .unwrap();

    assert_eq!(StatusCode::NO_CONTENT, response.status());
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    assert_eq!(Some("*".to_owned()), header("access-control-allow-origin"));
    assert_eq!(
        Some("content-type".to_owned()),
        header("access-control-allow-headers")
    );
    assert!(header("access-control-allow-methods")
        .unwrap()
        .contains("POST"));
}
