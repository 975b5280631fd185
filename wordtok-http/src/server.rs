use crate::config::ServerConfig;
use crate::routes::{route, Reply, ReplyBody};
use anyhow::Result;
use std::io::{Cursor, Read};
use std::net::SocketAddr;
use std::thread;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::*;
use wordtok::Service;

/// A bound HTTP listener serving one shared [`Service`].
pub struct HttpServer {
    server: tiny_http::Server,
    service: Service,
    max_body_bytes: usize,
}

impl HttpServer {
    /// Start listening on `config.bind`.  Requests aren't answered until [`Self::run`] is called.
    pub fn bind(config: &ServerConfig, service: Service) -> Result<Self> {
        let server = tiny_http::Server::http(config.bind)
            .map_err(|e| anyhow::anyhow!("Failed to listen on {}: {}", config.bind, e))?;

        Ok(Self {
            server,
            service,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// The address actually bound, which differs from the configured one when port 0 was asked
    /// for
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests forever, one thread per request.
    pub fn run(self) {
        for request in self.server.incoming_requests() {
            let service = self.service.clone();
            let max_body_bytes = self.max_body_bytes;
            thread::spawn(move || handle_request(&service, request, max_body_bytes));
        }
    }
}

/// Bind according to `config` and serve until the process exits.
pub fn serve(config: ServerConfig) -> Result<()> {
    let service = Service::new(config.id_strategy);
    let server = HttpServer::bind(&config, service)?;

    info!(
        addr = ?server.local_addr(),
        id_strategy = %config.id_strategy,
        "Server running"
    );
    server.run();

    Ok(())
}

/// Read a request body of at most `limit` bytes.
///
/// Returns `None` if the body is bigger than that, either by its declared length or by what was
/// actually sent.  At most `limit + 1` bytes are ever read.
fn read_body(
    reader: impl Read,
    declared_len: Option<usize>,
    limit: usize,
) -> std::io::Result<Option<Vec<u8>>> {
    if declared_len.is_some_and(|len| len > limit) {
        return Ok(None);
    }

    let mut body = Vec::with_capacity(declared_len.unwrap_or(0));
    reader.take(limit as u64 + 1).read_to_end(&mut body)?;

    Ok((body.len() <= limit).then_some(body))
}

fn handle_request(service: &Service, mut request: Request, max_body_bytes: usize) {
    let declared_len = request.body_length();
    let read = read_body(request.as_reader(), declared_len, max_body_bytes);
    let reply = match read {
        Ok(Some(body)) => route(service, request.method(), request.url(), &body),
        Ok(None) => {
            warn!(
                ?declared_len,
                limit = max_body_bytes,
                "Rejected oversized request body"
            );
            Reply::error(413, "Request body too large")
        }
        Err(err) => {
            warn!(%err, "Failed to read request body");
            Reply::error(400, "Failed to read request body")
        }
    };

    debug!(method = %request.method(), url = request.url(), status = reply.status, "Handled request");

    // Preflights may ask for arbitrary headers; allow whatever was asked for
    let requested_headers = (*request.method() == Method::Options)
        .then(|| {
            request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Access-Control-Request-Headers"))
                .map(|header| header.value.as_str().to_owned())
        })
        .flatten();

    let response = into_response(reply, requested_headers);
    if let Err(err) = request.respond(response) {
        warn!(%err, "Failed to send response");
    }
}

fn into_response(reply: Reply, requested_headers: Option<String>) -> Response<Cursor<Vec<u8>>> {
    let (content_type, data) = match reply.body {
        ReplyBody::Empty => (None, Vec::new()),
        ReplyBody::Text(text) => (Some("text/html; charset=utf-8"), text.into_bytes()),
        ReplyBody::Json(value) => (
            Some("application/json; charset=utf-8"),
            value.to_string().into_bytes(),
        ),
    };

    let mut headers = reply.headers;
    headers.push(("Access-Control-Allow-Origin", "*".to_owned()));
    if let Some(content_type) = content_type {
        headers.push(("Content-Type", content_type.to_owned()));
    }
    if let Some(requested_headers) = requested_headers {
        headers.push(("Access-Control-Allow-Headers", requested_headers));
    }

    let mut response = Response::from_data(data).with_status_code(StatusCode(reply.status));
    for (name, value) in headers {
        match Header::from_bytes(name, value.as_bytes()) {
            Ok(header) => response.add_header(header),
            Err(()) => warn!(name, value = %value, "Dropping malformed response header"),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(response: &'a Response<Cursor<Vec<u8>>>, name: &'static str) -> Option<&'a str> {
        response
            .headers()
            .iter()
            .find(|header| header.field.equiv(name))
            .map(|header| header.value.as_str())
    }

    #[test]
    fn bodies_within_the_limit_are_read_whole() {
        let body = read_body(Cursor::new(b"{\"text\":\"a\"}".to_vec()), Some(12), 12).unwrap();
        assert_eq!(Some(b"{\"text\":\"a\"}".to_vec()), body);

        let body = read_body(Cursor::new(Vec::new()), None, 0).unwrap();
        assert_eq!(Some(Vec::new()), body);
    }

    #[test]
    fn oversized_bodies_are_refused() {
        // Declared too long: nothing is read at all
        let mut reader = Cursor::new(vec![b' '; 64]);
        assert_eq!(None, read_body(&mut reader, Some(64), 16).unwrap());
        assert_eq!(0, reader.position());

        // Undeclared, e.g. chunked: reading stops one byte past the limit
        let mut reader = Cursor::new(vec![b' '; 64]);
        assert_eq!(None, read_body(&mut reader, None, 16).unwrap());
        assert_eq!(17, reader.position());
    }

    #[test]
    fn text_replies_are_html_like_express() {
        let response = into_response(Reply::text(200, "hi"), None);

        assert_eq!(
            Some("text/html; charset=utf-8"),
            header(&response, "Content-Type")
        );
    }

    #[test]
    fn every_response_allows_any_origin() {
        for reply in [
            Reply::text(200, "hi"),
            Reply::error(404, "Not Found"),
            Reply::preflight(),
        ] {
            let response = into_response(reply, None);
            assert_eq!(Some("*"), header(&response, "Access-Control-Allow-Origin"));
        }
    }

    #[test]
    fn json_replies_are_labelled() {
        let response = into_response(Reply::error(400, "nope"), None);

        assert_eq!(400, response.status_code().0);
        assert_eq!(
            Some("application/json; charset=utf-8"),
            header(&response, "Content-Type")
        );
    }

    #[test]
    fn preflight_echoes_requested_headers() {
        let response = into_response(Reply::preflight(), Some("content-type, x-trace".to_owned()));

        assert_eq!(204, response.status_code().0);
        assert_eq!(None, header(&response, "Content-Type"));
        assert_eq!(
            Some("GET,HEAD,PUT,PATCH,POST,DELETE"),
            header(&response, "Access-Control-Allow-Methods")
        );
        assert_eq!(
            Some("content-type, x-trace"),
            header(&response, "Access-Control-Allow-Headers")
        );
    }
}
