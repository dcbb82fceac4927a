//! Handler and middleware type erasure.
//!
//! # How handlers are stored
//!
//! The route table holds handlers of *different* concrete types in a single
//! structure. Rust collections can only hold one concrete type, so handlers
//! and middleware hide behind **trait objects** wrapped in [`BoxedHandler`]
//! and [`BoxedMiddleware`].
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! fn hello(ctx: &mut Context) -> Result<(), Error> { … }   ← user writes this
//!        ↓ router.get("/", hello, &[])
//! hello.into_handler()                                     ← Handler blanket impl
//!        ↓
//! BoxedHandler(Arc::new(FnHandler(hello)))                 ← heap-allocated wrapper
//!        ↓
//! handler.call(&mut ctx)  at request time                  ← one vtable dispatch
//! ```
//!
//! Middleware is a **decorator**: it takes the next handler and returns a
//! new one. Cross-cutting behavior is layered by composing decorators —
//! there are no separate before/after hooks on a route's chain, just
//! functions wrapping functions. The only runtime cost per request is one
//! `Arc` clone per layer plus one virtual call — negligible next to network
//! I/O.

use std::sync::Arc;

use crate::context::Context;
use crate::error::Error;

// ── Internal erasure traits ───────────────────────────────────────────────────

pub(crate) trait ErasedHandler: Send + Sync {
    fn call(&self, ctx: &mut Context) -> Result<(), Error>;
}

pub(crate) trait ErasedMiddleware: Send + Sync {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

// ── Erased public types ───────────────────────────────────────────────────────

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// Cloning bumps an atomic reference count; the concrete handler state is
/// shared, never copied.
#[derive(Clone)]
pub struct BoxedHandler(Arc<dyn ErasedHandler + 'static>);

impl BoxedHandler {
    /// Invokes the handler against `ctx`.
    pub fn call(&self, ctx: &mut Context) -> Result<(), Error> {
        self.0.call(ctx)
    }
}

/// A heap-allocated, type-erased middleware decorator.
#[derive(Clone)]
pub struct BoxedMiddleware(Arc<dyn ErasedMiddleware + 'static>);

impl BoxedMiddleware {
    /// Applies the decorator to `next`, producing the wrapped handler.
    pub fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        self.0.wrap(next)
    }
}

// ── Public conversion trait ───────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// function or closure with the signature:
///
/// ```text
/// fn name(ctx: &mut Context) -> Result<(), Error>
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it,
/// which keeps the API surface stable across versions.
pub trait Handler: private::SealedHandler + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_handler(self) -> BoxedHandler;
}

/// The sealing module. Because the trait is private, external crates
/// cannot name it and therefore cannot implement `Handler` on their own
/// types.
mod private {
    pub trait SealedHandler {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F> private::SealedHandler for F where
    F: Fn(&mut Context) -> Result<(), Error> + Send + Sync + 'static
{
}

impl<F> Handler for F
where
    F: Fn(&mut Context) -> Result<(), Error> + Send + Sync + 'static,
{
    fn into_handler(self) -> BoxedHandler {
        handler_fn(self)
    }
}

// ── Free-function constructors ────────────────────────────────────────────────

/// Boxes a closure as a [`BoxedHandler`].
///
/// Middleware bodies use this to build the wrapping handler:
///
/// ```rust
/// use laika::{handler_fn, BoxedHandler};
///
/// fn restrict(next: BoxedHandler) -> BoxedHandler {
///     handler_fn(move |ctx| {
///         if ctx.get_header("authorization").is_none() {
///             return ctx.http_error(401, "unauthorized");
///         }
///         next.call(ctx)
///     })
/// }
/// ```
pub fn handler_fn<F>(f: F) -> BoxedHandler
where
    F: Fn(&mut Context) -> Result<(), Error> + Send + Sync + 'static,
{
    BoxedHandler(Arc::new(FnHandler(f)))
}

/// Boxes a closure as a [`BoxedMiddleware`].
///
/// This is the one way to build middleware — registries and per-route
/// lists all traffic in [`BoxedMiddleware`] values, so decorators compose
/// and pass around like the plain values they are.
pub fn middleware_fn<F>(f: F) -> BoxedMiddleware
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    BoxedMiddleware(Arc::new(FnMiddleware(f)))
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

/// Newtype bridging a concrete `Fn` handler to the trait-object world.
struct FnHandler<F>(F);

impl<F> ErasedHandler for FnHandler<F>
where
    F: Fn(&mut Context) -> Result<(), Error> + Send + Sync,
{
    fn call(&self, ctx: &mut Context) -> Result<(), Error> {
        (self.0)(ctx)
    }
}

struct FnMiddleware<F>(F);

impl<F> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        (self.0)(next)
    }
}
