//! Built-in middleware.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: structured tracing, request-id injection,
//! authentication-header inspection. Everything here is an ordinary
//! decorator built with [`middleware_fn`] — use these as-is or as
//! templates for your own.

use std::time::Instant;

use uuid::Uuid;

use crate::handler::{handler_fn, middleware_fn, BoxedMiddleware};

/// Per-request log line: method, path, response status, latency.
///
/// Wraps the handler so the status it logs is the one the response sink
/// actually holds after every inner layer ran.
pub fn trace() -> BoxedMiddleware {
    middleware_fn(|next| {
        handler_fn(move |ctx| {
            let start = Instant::now();
            let method = ctx.request().method().to_owned();
            let path = ctx.request().path().to_owned();
            let result = next.call(ctx);
            tracing::info!(
                %method,
                %path,
                status = ctx.response().status(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "request"
            );
            result
        })
    })
}

/// Tags the response with an `x-request-id` header (UUID v4) before the
/// inner handler runs, so inner layers can read it back off the sink.
pub fn request_id() -> BoxedMiddleware {
    middleware_fn(|next| {
        handler_fn(move |ctx| {
            ctx.set_header("x-request-id", &Uuid::new_v4().to_string());
            next.call(ctx)
        })
    })
}
