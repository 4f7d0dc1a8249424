// Narrow HTTP transport: execute one request with its own timeouts and hand
// back status, headers and the fully read body. The reqwest client lives only
// for the duration of a call, so the connection is released when `execute`
// returns on every path.

use crate::config::Timeouts;
use crate::error::TransportError;
use reqwest::blocking::Client;
use reqwest::Method;
use tracing::debug;

/// A single outgoing request. Timeouts travel with the request so each call
/// site picks its own pair.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeouts: Timeouts,
}

impl HttpRequest {
    pub fn post(url: impl Into<String>, timeouts: Timeouts) -> Self {
        HttpRequest {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeouts,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// Response captured fully in memory.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Executes one HTTP request. Implementations must not return until the body
/// has been read and the connection released.
pub trait HttpTransport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `HttpTransport` over `reqwest::blocking`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockingTransport;

impl BlockingTransport {
    pub fn new() -> Self {
        BlockingTransport
    }
}

impl HttpTransport for BlockingTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeouts,
        } = request;

        // reqwest has no separate read timeout in blocking mode, so the read value
        // caps the whole request.
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.read)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let mut builder = client.request(method.clone(), &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        debug!(%method, %url, "sending request");
        let response = builder.send().map_err(|e| classify(&url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        // `text` consumes the response, returning the connection.
        let body = response.text().map_err(|e| classify(&url, e))?;
        debug!(%url, status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            body,
            headers,
        })
    }
}

fn classify(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Io {
            url: url.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    #[test]
    fn execute_captures_status_body_and_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/echo").header("X-Probe", "1").body("ping");
            then.status(418).header("X-Reply", "yes").body("pong");
        });

        let request = HttpRequest::post(server.url("/echo"), Timeouts::from_millis(1000, 2000))
            .header("X-Probe", "1")
            .body(b"ping".to_vec());
        let response = BlockingTransport::new().execute(request).expect("response");

        mock.assert();
        assert_eq!(response.status, 418);
        assert_eq!(response.body, "pong");
        assert_eq!(response.header("x-reply"), Some("yes"));
    }

    #[test]
    fn slow_response_surfaces_as_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/slow");
            then.status(200).delay(Duration::from_millis(1500)).body("late");
        });

        let request = HttpRequest::post(server.url("/slow"), Timeouts::from_millis(500, 200));
        let err = BlockingTransport::new().execute(request).unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }), "got {err:?}");
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let request =
            HttpRequest::post("http://127.0.0.1:9/nothing", Timeouts::from_millis(300, 300));
        assert!(BlockingTransport::new().execute(request).is_err());
    }
}
