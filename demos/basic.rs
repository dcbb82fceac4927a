//! Minimal laika example — JSON endpoints, a grouped admin section, and
//! health checks.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl 'http://localhost:3000/users/42?verbose=true'
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/x-www-form-urlencoded' \
//!        -d 'name=alice'
//!   curl http://localhost:3000/admin/stats -H 'authorization: secret'
//!   curl http://localhost:3000/healthz

use laika::{handler_fn, health, middleware, middleware_fn, BoxedMiddleware, Context, Error, Router, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut app = Router::new();

    // One log line per request, status and latency included.
    app.middleware(middleware::trace());

    app.get("/users/:id", get_user, &[]);
    app.post("/users", create_user, &[]);
    app.get("/healthz", health::liveness, &[]);
    app.get("/readyz", health::readiness, &[]);

    // Everything under /admin goes through the token check.
    let mut admin = app.group("/admin");
    admin.middleware(require_token());
    admin.get("/stats", stats, &[]);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/:id — path and query parameters land in the same map.
fn get_user(ctx: &mut Context) -> Result<(), Error> {
    let id = ctx.param("id").unwrap_or("unknown").to_owned();
    let verbose = ctx.has_param("verbose");
    ctx.json(200, &serde_json::json!({ "id": id, "verbose": verbose }))
}

// POST /users — form fields are parameters too, first value per field.
fn create_user(ctx: &mut Context) -> Result<(), Error> {
    let name = ctx.param("name").map(str::to_owned);
    match name {
        Some(name) => ctx.json(201, &serde_json::json!({ "name": name })),
        None => ctx.http_error(422, "missing name"),
    }
}

// GET /admin/stats — only reachable through require_token.
fn stats(ctx: &mut Context) -> Result<(), Error> {
    ctx.json(200, &serde_json::json!({ "uptime": "forever" }))
}

// Group middleware: reject requests without the right header before the
// handler ever runs.
fn require_token() -> BoxedMiddleware {
    middleware_fn(|next| {
        handler_fn(move |ctx| {
            if ctx.get_header("authorization") != Some("secret") {
                return ctx.http_error(401, "unauthorized");
            }
            next.call(ctx)
        })
    })
}
