//! Built-in health-check handlers.
//!
//! Orchestrators ask two questions. laika answers them.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can it serve traffic? Failure → pulled from the load-balancer. |
//!
//! Register them on your router:
//!
//! ```rust
//! use laika::{health, Router};
//!
//! let mut app = Router::new();
//! app.get("/healthz", health::liveness, &[])
//!    .get("/readyz", health::readiness, &[]);
//! ```
//!
//! Override `readiness` with your own handler if you need to gate on
//! dependency availability (database connections, downstream services).

use crate::context::Context;
use crate::error::Error;

/// Liveness probe handler.
///
/// Always `200 OK` with body `"ok"`. If the process can respond to HTTP at
/// all, it is alive — this handler intentionally has no dependencies.
pub fn liveness(ctx: &mut Context) -> Result<(), Error> {
    ctx.string(200, "ok")
}

/// Readiness probe handler (default implementation).
///
/// Returns `200 OK` with body `"ready"`. Replace it with your own handler
/// if your application needs a warm-up period or must verify dependency
/// health before accepting traffic.
pub fn readiness(ctx: &mut Context) -> Result<(), Error> {
    ctx.string(200, "ready")
}
