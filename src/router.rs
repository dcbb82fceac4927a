//! Route registration and the dispatch pipeline.
//!
//! [`Router`] owns the route table and three middleware registries.
//! *Before* and *after* middleware run unconditionally around every
//! request, whatever the routing outcome. *Global* middleware wraps every
//! matched handler, first-registered outermost; group and per-route
//! middleware join the same onion as inner layers at registration time.
//!
//! Dispatch is a fixed sequence over a caller-owned [`Context`]: before
//! middleware, route resolution, the wrapped handler (or the not-found
//! fallback), after middleware. The context passes explicitly through the
//! whole chain — the router holds no per-request state, so concurrent
//! requests cannot observe each other.

use std::collections::HashMap;

use tracing::warn;

use crate::context::Context;
use crate::error::Error;
use crate::handler::{handler_fn, BoxedHandler, BoxedMiddleware, Handler};
use crate::method::Method;
use crate::route::{Route, RouteTable};

/// The application router: registration surface plus dispatch pipeline.
///
/// Register everything up front, then share the router for serving
/// (`Server` wraps it in an `Arc`). Registration borrows exclusively, so
/// the table is frozen by the time concurrent requests read it — no
/// locking on the hot path.
#[derive(Default)]
pub struct Router {
    table: RouteTable,
    before: Vec<BoxedMiddleware>,
    after: Vec<BoxedMiddleware>,
    middleware: Vec<BoxedMiddleware>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registration ─────────────────────────────────────────────────────────

    /// Registers `handler` for `GET endpoint`, with optional per-route
    /// middleware.
    ///
    /// Path parameters use `:name` syntax — `ctx.param("name")` retrieves
    /// them. Any `?query` suffix on the endpoint is dropped: queries are
    /// extracted per request, never matched at registration.
    pub fn get(
        &mut self,
        endpoint: &str,
        handler: impl Handler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        self.add(Method::Get, endpoint, handler.into_handler(), middleware.to_vec())
    }

    /// Registers `handler` for `POST endpoint`.
    pub fn post(
        &mut self,
        endpoint: &str,
        handler: impl Handler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        self.add(Method::Post, endpoint, handler.into_handler(), middleware.to_vec())
    }

    /// Registers `handler` for `PUT endpoint`.
    pub fn put(
        &mut self,
        endpoint: &str,
        handler: impl Handler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        self.add(Method::Put, endpoint, handler.into_handler(), middleware.to_vec())
    }

    /// Registers `handler` for `PATCH endpoint`.
    pub fn patch(
        &mut self,
        endpoint: &str,
        handler: impl Handler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        self.add(Method::Patch, endpoint, handler.into_handler(), middleware.to_vec())
    }

    /// Registers `handler` for `DELETE endpoint`.
    pub fn delete(
        &mut self,
        endpoint: &str,
        handler: impl Handler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        self.add(Method::Delete, endpoint, handler.into_handler(), middleware.to_vec())
    }

    /// Registers `handler` for `OPTIONS endpoint`.
    pub fn options(
        &mut self,
        endpoint: &str,
        handler: impl Handler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        self.add(Method::Options, endpoint, handler.into_handler(), middleware.to_vec())
    }

    /// Adds middleware that runs before routing for every request,
    /// regardless of whether a route will match. Before middleware cannot
    /// veto routing; its reach is side effects on the context.
    pub fn before(&mut self, middleware: BoxedMiddleware) -> &mut Self {
        self.before.push(middleware);
        self
    }

    /// Adds middleware that runs after the routing outcome, match or not.
    pub fn after(&mut self, middleware: BoxedMiddleware) -> &mut Self {
        self.after.push(middleware);
        self
    }

    /// Adds middleware wrapped around every matched handler. The first
    /// registration becomes the outermost layer: it runs first on the way
    /// in and last on the way out.
    pub fn middleware(&mut self, middleware: BoxedMiddleware) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Opens a scoped registrar that prefixes endpoints with `prefix`.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group { router: self, prefix: prefix.to_owned(), middleware: Vec::new() }
    }

    /// Route-key→route snapshot for `method` (keys like `"GET/users/:id"`);
    /// empty when nothing is registered under it.
    pub fn routes(&self, method: Method) -> HashMap<String, Route> {
        self.table.routes(method)
    }

    fn add(
        &mut self,
        method: Method,
        endpoint: &str,
        handler: BoxedHandler,
        middleware: Vec<BoxedMiddleware>,
    ) -> &mut Self {
        let template = endpoint.split_once('?').map_or(endpoint, |(path, _)| path);
        self.table.add(method, template, handler, middleware);
        self
    }

    // ── Dispatch pipeline ────────────────────────────────────────────────────

    /// Runs one request through the pipeline.
    ///
    /// A handler error aborts the request, never the process: the response
    /// is forced to a 500 if nothing was committed yet, after middleware is
    /// skipped, and the error returns to the caller — observable, not
    /// swallowed.
    pub fn dispatch(&self, ctx: &mut Context) -> Result<(), Error> {
        run_edge(&self.before, ctx);

        let outcome = match self.resolve(ctx) {
            Some((handler, params)) => {
                ctx.add_params(params);
                handler.call(ctx)
            }
            None => not_found(ctx),
        };

        if let Err(err) = outcome {
            if !ctx.response().committed() {
                ctx.http_error(500, "Internal Server Error")?;
            }
            return Err(err);
        }

        run_edge(&self.after, ctx);
        Ok(())
    }

    /// Looks up the route for `ctx` and builds its wrapped handler.
    fn resolve(&self, ctx: &Context) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let method = ctx.request().method().parse::<Method>().ok()?;
        let form = ctx.request().form_values();
        let (route, params) = self.table.find_route(
            method,
            ctx.request().path(),
            ctx.request().raw_query(),
            &form,
        )?;
        Some((self.wrap(route), params))
    }

    /// Onion composition: per-route middleware innermost, global middleware
    /// outermost, first-registered outermost within each list.
    fn wrap(&self, route: &Route) -> BoxedHandler {
        let mut handler = route.handler().clone();
        for middleware in route.middleware().iter().rev() {
            handler = middleware.wrap(handler);
        }
        for middleware in self.middleware.iter().rev() {
            handler = middleware.wrap(handler);
        }
        handler
    }
}

/// Applies each edge middleware to a no-op handler and invokes the result.
///
/// Edge middleware observes the handler slot without driving the real
/// handler, so its reach is exactly the context side effects. A failure
/// here is logged and absorbed — it cannot veto routing or abort the
/// request.
fn run_edge(stage: &[BoxedMiddleware], ctx: &mut Context) {
    for middleware in stage {
        let invoked = middleware.wrap(handler_fn(|_| Ok(())));
        if let Err(err) = invoked.call(ctx) {
            warn!(error = %err, "edge middleware failed");
        }
    }
}

/// Default fallback for unmatched requests: a JSON-encoded `"Not Found"`.
fn not_found(ctx: &mut Context) -> Result<(), Error> {
    ctx.json(404, "Not Found")
}

/// A scoped registrar sharing a path prefix and a middleware set.
///
/// Group middleware is folded into each route's own middleware list at
/// registration time, ahead of the per-route entries, so it participates
/// in the same onion as everything else. Adding group middleware after a
/// route is registered does not reach back to that route.
pub struct Group<'r> {
    router: &'r mut Router,
    prefix: String,
    middleware: Vec<BoxedMiddleware>,
}

impl Group<'_> {
    /// Adds middleware applied to every route subsequently registered
    /// through this group.
    pub fn middleware(&mut self, middleware: BoxedMiddleware) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Registers `handler` for `GET prefix+endpoint`.
    pub fn get(
        &mut self,
        endpoint: &str,
        handler: impl Handler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        self.add(Method::Get, endpoint, handler.into_handler(), middleware)
    }

    /// Registers `handler` for `POST prefix+endpoint`.
    pub fn post(
        &mut self,
        endpoint: &str,
        handler: impl Handler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        self.add(Method::Post, endpoint, handler.into_handler(), middleware)
    }

    /// Registers `handler` for `PUT prefix+endpoint`.
    pub fn put(
        &mut self,
        endpoint: &str,
        handler: impl Handler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        self.add(Method::Put, endpoint, handler.into_handler(), middleware)
    }

    /// Registers `handler` for `PATCH prefix+endpoint`.
    pub fn patch(
        &mut self,
        endpoint: &str,
        handler: impl Handler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        self.add(Method::Patch, endpoint, handler.into_handler(), middleware)
    }

    /// Registers `handler` for `DELETE prefix+endpoint`.
    pub fn delete(
        &mut self,
        endpoint: &str,
        handler: impl Handler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        self.add(Method::Delete, endpoint, handler.into_handler(), middleware)
    }

    /// Registers `handler` for `OPTIONS prefix+endpoint`.
    pub fn options(
        &mut self,
        endpoint: &str,
        handler: impl Handler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        self.add(Method::Options, endpoint, handler.into_handler(), middleware)
    }

    fn add(
        &mut self,
        method: Method,
        endpoint: &str,
        handler: BoxedHandler,
        middleware: &[BoxedMiddleware],
    ) -> &mut Self {
        let mut combined = self.middleware.clone();
        combined.extend_from_slice(middleware);
        let endpoint = format!("{}{}", self.prefix, endpoint);
        self.router.add(method, &endpoint, handler, combined);
        self
    }
}
