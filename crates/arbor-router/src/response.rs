//! HTTP response type.

use std::collections::HashMap;

/// An HTTP response: a status code, headers, and a byte body.
///
/// The router hands this value back to the transport adapter, which is
/// responsible for flushing it onto the wire.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a new response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a 200 OK response.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Creates a response with JSON content.
    pub fn json<T: serde::Serialize>(data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self {
                status: 200,
                headers: [("Content-Type".to_string(), "application/json".to_string())]
                    .into_iter()
                    .collect(),
                body,
            },
            Err(_) => Self::internal_server_error(),
        }
    }

    /// Creates a response with plain text content.
    pub fn text(body: impl Into<String>) -> Self {
        let body_str = body.into();
        Self {
            status: 200,
            headers: [(
                "Content-Type".to_string(),
                "text/plain; charset=utf-8".to_string(),
            )]
            .into_iter()
            .collect(),
            body: body_str.into_bytes(),
        }
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self {
            status: 404,
            headers: HashMap::new(),
            body: b"Not Found".to_vec(),
        }
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_server_error() -> Self {
        Self {
            status: 500,
            headers: HashMap::new(),
            body: b"Internal Server Error".to_vec(),
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_json() {
        let data = serde_json::json!({"name": "test"});
        let res = Response::json(&data);
        assert_eq!(res.status, 200);
        assert_eq!(
            res.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_response_builder() {
        let res = Response::ok().header("X-Custom", "value").body("Hello");

        assert_eq!(res.status, 200);
        assert_eq!(res.headers.get("X-Custom"), Some(&"value".to_string()));
        assert_eq!(res.body_string(), Some("Hello".to_string()));
    }

    #[test]
    fn test_not_found() {
        let res = Response::not_found();
        assert_eq!(res.status, 404);
    }
}
