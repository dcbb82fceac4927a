//! Route storage and the matching algorithm.
//!
//! Templates use `:name` segments (`/users/:id`). At registration each
//! template compiles to an anchored pattern over the method-prefixed path:
//! `GET /users/:id` matches the candidate string `"GET/users/42"`, with an
//! optional trailing slash tolerated. Method and path always match jointly —
//! there is no path-only lookup.
//!
//! Lookup walks the requested method's bucket in a fixed order: literal
//! templates first, then parameterized ones, each in registration order.
//! Overlapping templates therefore resolve the same way on every run, and
//! `/a/fixed` beats `/a/:x` no matter which was registered first.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::handler::{BoxedHandler, BoxedMiddleware};
use crate::method::Method;

/// Matches one `:identifier` template token.
static PARAM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":[A-Za-z0-9_-]+").expect("param token pattern"));

/// What each `:identifier` captures: one-or-more name characters.
const PARAM_SEGMENT: &str = "([A-Za-z0-9_-]+)";

/// A registered route. Immutable once stored in the table.
#[derive(Clone)]
pub struct Route {
    method: Method,
    template: String,
    handler: BoxedHandler,
    middleware: Vec<BoxedMiddleware>,
    pattern: Regex,
    params: Vec<String>,
}

impl Route {
    fn new(
        method: Method,
        template: &str,
        handler: BoxedHandler,
        middleware: Vec<BoxedMiddleware>,
    ) -> Self {
        let (pattern, params) = compile(method, template);
        Self { method, template: template.to_owned(), handler, middleware, pattern, params }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The template as registered, e.g. `/users/:id`.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The table key: method plus template, e.g. `GET/users/:id`.
    pub fn key(&self) -> String {
        format!("{}{}", self.method.as_str(), self.template)
    }

    pub(crate) fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    /// The route's own middleware, group layers included, in composition
    /// order (first entry outermost).
    pub fn middleware(&self) -> &[BoxedMiddleware] {
        &self.middleware
    }

    fn is_literal(&self) -> bool {
        self.params.is_empty()
    }

    fn matches(&self, candidate: &str) -> bool {
        self.pattern.is_match(candidate)
    }

    /// Zips template parameter names with the captured path segments, in
    /// declaration order.
    fn path_params(&self, candidate: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();
        if let Some(caps) = self.pattern.captures(candidate) {
            for (name, group) in self.params.iter().zip(caps.iter().skip(1)) {
                if let Some(value) = group {
                    params.insert(name.clone(), value.as_str().to_owned());
                }
            }
        }
        params
    }
}

/// Compiles a template into its anchored pattern and parameter-name list.
///
/// Each `:identifier` token becomes a capture group; literal text between
/// tokens is escaped defensively. The method is baked into the anchor since
/// candidates are always method-prefixed.
fn compile(method: Method, template: &str) -> (Regex, Vec<String>) {
    let mut pattern = String::from("^");
    pattern.push_str(method.as_str());
    let mut params = Vec::new();
    let mut last = 0;
    for token in PARAM_TOKEN.find_iter(template) {
        pattern.push_str(&regex::escape(&template[last..token.start()]));
        pattern.push_str(PARAM_SEGMENT);
        params.push(template[token.start() + 1..token.end()].to_owned());
        last = token.end();
    }
    pattern.push_str(&regex::escape(&template[last..]));
    pattern.push_str("/?$");
    let pattern = Regex::new(&pattern)
        .unwrap_or_else(|err| panic!("invalid route `{template}`: {err}"));
    (pattern, params)
}

/// Per-method route storage.
///
/// Buckets keep registration order so lookups are reproducible; an
/// unordered map here would make overlapping templates match
/// nondeterministically.
#[derive(Default)]
pub(crate) struct RouteTable {
    routes: HashMap<Method, Vec<Route>>,
}

impl RouteTable {
    /// Registers a route. Re-registering the same method+template replaces
    /// the old entry in place: last write wins.
    pub(crate) fn add(
        &mut self,
        method: Method,
        template: &str,
        handler: BoxedHandler,
        middleware: Vec<BoxedMiddleware>,
    ) {
        let route = Route::new(method, template, handler, middleware);
        let bucket = self.routes.entry(method).or_default();
        match bucket.iter_mut().find(|r| r.template == template) {
            Some(existing) => *existing = route,
            None => bucket.push(route),
        }
    }

    /// Looks up `method + path` and extracts the request's parameters.
    ///
    /// The merged parameter map layers path captures, then query pairs,
    /// then form fields; later layers overwrite earlier ones on key
    /// collision. Returns `None` when no bucket exists for the method or
    /// no template matches.
    pub(crate) fn find_route(
        &self,
        method: Method,
        path: &str,
        raw_query: &str,
        form: &HashMap<String, String>,
    ) -> Option<(&Route, HashMap<String, String>)> {
        let bucket = self.routes.get(&method)?;
        let candidate = format!("{}{}", method.as_str(), path);
        let route = bucket
            .iter()
            .filter(|route| route.is_literal())
            .find(|route| route.matches(&candidate))
            .or_else(|| {
                bucket
                    .iter()
                    .filter(|route| !route.is_literal())
                    .find(|route| route.matches(&candidate))
            })?;

        // The root template answers with no extraction at all.
        if route.template == "/" {
            return Some((route, HashMap::new()));
        }

        let mut params = route.path_params(&candidate);
        merge_query_params(raw_query, &mut params);
        for (name, value) in form {
            params.insert(name.clone(), value.clone());
        }
        Some((route, params))
    }

    /// Route-key→route snapshot for `method`; empty when nothing is
    /// registered under it.
    pub(crate) fn routes(&self, method: Method) -> HashMap<String, Route> {
        self.routes
            .get(&method)
            .map(|bucket| bucket.iter().map(|route| (route.key(), route.clone())).collect())
            .unwrap_or_default()
    }
}

/// Splits a raw query string into name→value pairs.
///
/// Boundaries are `&` and `?`; each pair splits on the first `=`. A bare
/// token contributes an empty value. Later pairs overwrite earlier ones.
fn merge_query_params(raw_query: &str, params: &mut HashMap<String, String>) {
    for pair in raw_query.split(['&', '?']) {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((name, value)) => params.insert(name.to_owned(), value.to_owned()),
            None => params.insert(pair.to_owned(), String::new()),
        };
    }
}
