//! Incoming HTTP request snapshot.

use std::collections::HashMap;

use url::form_urlencoded;

/// The inbound half of a request, captured once by the transport.
///
/// Everything the routing core needs from the wire: method, path, raw query
/// string, headers, and the body bytes. The transport builds one of these
/// per request; embedders with their own transport (and tests) construct it
/// directly via [`Request::new`].
pub struct Request {
    method: String,
    path: String,
    raw_query: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Request {
    pub fn new(
        method: String,
        path: String,
        raw_query: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        Self { method, path, raw_query, headers, body }
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }

    /// The query string as it appeared on the wire, without the leading `?`.
    pub fn raw_query(&self) -> &str { &self.raw_query }

    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decodes the body as an `application/x-www-form-urlencoded` form.
    ///
    /// The first value wins when a field repeats. A missing or mismatched
    /// content type yields an empty map — form problems never fail a
    /// request, they just contribute nothing.
    pub fn form_values(&self) -> HashMap<String, String> {
        let is_form = self.header("content-type").is_some_and(|ct| {
            ct.to_ascii_lowercase().contains("application/x-www-form-urlencoded")
        });
        if !is_form {
            return HashMap::new();
        }
        let mut fields = HashMap::new();
        for (name, value) in form_urlencoded::parse(&self.body) {
            fields.entry(name.into_owned()).or_insert_with(|| value.into_owned());
        }
        fields
    }
}
