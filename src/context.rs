//! Per-request state: the inbound request, the outbound response sink, and
//! the merged parameter map.

use std::collections::HashMap;

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// Per-request mutable state bundle.
///
/// A fresh `Context` is built for every request and discarded once the
/// response is sent; it is never shared between in-flight requests, so it
/// needs no synchronization. Path parameters, query parameters, and form
/// fields all land in one map, merged in that order — a form field named
/// like a path parameter wins.
pub struct Context {
    request: Request,
    response: Response,
    params: HashMap<String, String>,
}

impl Context {
    /// Wraps an inbound request with a fresh response sink.
    pub fn new(request: Request) -> Self {
        Self { request, response: Response::new(), params: HashMap::new() }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Direct access to the response sink, for middleware that needs more
    /// than [`set_header`](Context::set_header).
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    // ── Parameters ───────────────────────────────────────────────────────────

    /// Merges `params` into the context's parameter map. The incoming value
    /// wins when a key is already present.
    pub fn add_params(&mut self, params: HashMap<String, String>) {
        for (name, value) in params {
            self.params.insert(name, value);
        }
    }

    /// Returns a named parameter.
    ///
    /// For a route `/users/:id`, `ctx.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Read-only view of every extracted parameter.
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    // ── Headers ──────────────────────────────────────────────────────────────

    /// Case-insensitive header lookup on the inbound request.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    /// Replace-or-insert a response header.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.response.set_header(name, value);
    }

    // ── Response writers ─────────────────────────────────────────────────────

    /// Serializes `value` as the JSON response body under `code`.
    ///
    /// Serialization runs before anything touches the sink. On failure no
    /// success bytes are written: the response becomes a 500 through the
    /// error path and the serialization error goes back to the caller.
    pub fn json<T>(&mut self, code: u16, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let body = match serde_json::to_vec(value) {
            Ok(body) => body,
            Err(err) => {
                self.http_error(500, "Internal Server Error")?;
                return Err(Error::Serialization(err));
            }
        };
        self.set_header("Content-Type", "application/json");
        self.response.write_header(code);
        self.response.write(&body);
        Ok(())
    }

    /// Writes a text body under `code`.
    pub fn string(&mut self, code: u16, body: impl AsRef<str>) -> Result<(), Error> {
        self.set_header("Content-Type", "text/html;charset=utf-8");
        self.response.write_header(code);
        self.response.write(body.as_ref().as_bytes());
        Ok(())
    }

    /// Writes an error message body under `code`.
    pub fn http_error(&mut self, code: u16, message: &str) -> Result<(), Error> {
        self.set_header("Content-Type", "text/html;charset=utf-8");
        self.response.write_header(code);
        self.response.write(message.as_bytes());
        Ok(())
    }

    /// Redirects to `location` with the given 3xx status.
    pub fn redirect(&mut self, code: u16, location: &str) -> Result<(), Error> {
        self.set_header("Location", location);
        self.response.write_header(code);
        Ok(())
    }

    /// Writes the status line with no body.
    pub fn code(&mut self, code: u16) -> Result<(), Error> {
        self.response.write_header(code);
        Ok(())
    }

    /// Consumes the context into a wire response for the transport.
    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        self.response.into_http()
    }
}
