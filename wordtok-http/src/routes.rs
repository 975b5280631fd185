//! Mapping of HTTP requests onto [`Service`] operations.
use serde_json::{json, Value};
use tiny_http::Method;
use tracing::*;
use wordtok::{ErrorKind, Service, WordtokError};

/// Plain text body of `GET /`
pub const GREETING: &str = "Hello from custom-tokeniser!";

/// Methods listed in the response to a CORS preflight request
pub const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Response to a single request, before it is turned into bytes on the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: ReplyBody,

    /// Headers beyond `Content-Type` and the ones every response carries
    pub headers: Vec<(&'static str, String)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReplyBody {
    Empty,
    Text(String),
    Json(Value),
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ReplyBody::Json(body),
            headers: Vec::new(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: ReplyBody::Text(body.into()),
            headers: Vec::new(),
        }
    }

    /// `{ "error": message }` with the given status
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }

    /// Answer to a CORS preflight (`OPTIONS`) request
    pub fn preflight() -> Self {
        Self {
            status: 204,
            body: ReplyBody::Empty,
            headers: vec![("Access-Control-Allow-Methods", ALLOWED_METHODS.to_owned())],
        }
    }

    fn from_service_error(err: WordtokError) -> Self {
        match err.kind() {
            ErrorKind::InvalidInput => {
                warn!(%err, "Rejected invalid input");
                Self::error(400, err.to_string())
            }
            ErrorKind::InternalError => {
                error!(%err, "Tokenizer failed");
                Self::error(500, err.to_string())
            }
        }
    }
}

/// Route a request to the matching operation.
///
/// Query strings are ignored.  A request that doesn't match any route gets a 404, whatever its
/// method.
pub fn route(service: &Service, method: &Method, url: &str, body: &[u8]) -> Reply {
    let path = url.split_once('?').map_or(url, |(path, _query)| path);

    match (method, path) {
        (Method::Options, _) => Reply::preflight(),
        (Method::Get | Method::Head, "/") => Reply::text(200, GREETING),
        (Method::Get, "/vocab") => Reply::json(200, json!({ "vocab": service.vocabulary() })),
        (Method::Post, "/encode") => with_json_body(body, |body| encode(service, body)),
        (Method::Post, "/decode") => with_json_body(body, |body| decode(service, body)),
        _ => Reply::error(404, "Not Found"),
    }
}

fn with_json_body(body: &[u8], handler: impl FnOnce(&Value) -> Reply) -> Reply {
    // A request without a body behaves like one with an empty object, so the field checks
    // produce the error
    if body.iter().all(u8::is_ascii_whitespace) {
        return handler(&json!({}));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(body) => handler(&body),
        Err(err) => {
            warn!(%err, "Request body is not valid JSON");
            Reply::error(400, format!("Invalid JSON body: {err}"))
        }
    }
}

fn encode(service: &Service, body: &Value) -> Reply {
    let Some(text) = body.get("text").filter(|text| text.is_string()) else {
        return Reply::error(400, "Missing or invalid text field");
    };

    match service.encode(text) {
        Ok(tokens) => Reply::json(200, json!({ "tokens": tokens })),
        Err(err) => Reply::from_service_error(err),
    }
}

fn decode(service: &Service, body: &Value) -> Reply {
    let Some(tokens) = body.get("tokens").filter(|tokens| tokens.is_array()) else {
        return Reply::error(400, "Missing or invalid tokens field (must be array)");
    };

    match service.decode(tokens) {
        Ok(text) => Reply::json(200, json!({ "text": text })),
        Err(err) => Reply::from_service_error(err),
    }
}
