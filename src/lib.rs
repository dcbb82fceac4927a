//! # laika
//!
//! An embeddable HTTP router and middleware dispatcher.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! laika does one job: it maps `(method, path, query, form)` to a handler
//! you registered, collects every parameter those sources carry into one
//! per-request [`Context`], and runs the handler through whatever
//! middleware you stacked around it. A handler is a plain function;
//! middleware is a plain decorator from handler to handler. There is no
//! extractor zoo — if you can write `fn(&mut Context) -> Result<(), Error>`,
//! you can route to it.
//!
//! Matching is deliberately boring and reproducible: one bucket per HTTP
//! method, literal templates checked before parameterized ones, first
//! structural match wins, in registration order. `/users/new` never loses
//! to `/users/:id`, on any run.
//!
//! The bundled [`Server`] is thin transport glue — hyper and tokio at the
//! edge, one `Context` per request, graceful shutdown on SIGTERM/Ctrl-C.
//! Embed the [`Router`] behind your own transport instead if you have one:
//! the pipeline only needs a `Context`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use laika::{middleware, Context, Error, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut app = Router::new();
//!     app.middleware(middleware::trace());
//!     app.get("/users/:id", get_user, &[]);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! fn get_user(ctx: &mut Context) -> Result<(), Error> {
//!     let id = ctx.param("id").unwrap_or("unknown").to_owned();
//!     ctx.json(200, &serde_json::json!({ "id": id }))
//! }
//! ```
//!
//! ## Middleware in one paragraph
//!
//! A middleware takes the next handler and returns a new one — the classic
//! onion. [`Router::middleware`] wraps every matched handler,
//! first-registered outermost; groups and routes contribute inner layers of
//! the same onion. [`Router::before`] and [`Router::after`] run
//! unconditionally around the whole dispatch, even for requests that end in
//! a 404 — they observe and annotate, they do not veto.

mod context;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod route;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use context::Context;
pub use error::Error;
pub use handler::{handler_fn, middleware_fn, BoxedHandler, BoxedMiddleware, Handler};
pub use method::Method;
pub use request::Request;
pub use response::Response;
pub use route::Route;
pub use router::{Group, Router};
pub use server::Server;
