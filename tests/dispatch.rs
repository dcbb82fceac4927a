//! End-to-end pipeline tests: registration through dispatch to the
//! buffered response.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use laika::{handler_fn, middleware_fn, BoxedMiddleware, Context, Error, Method, Request, Router};

fn request(method: &str, path: &str, query: &str) -> Request {
    Request::new(method.to_owned(), path.to_owned(), query.to_owned(), Vec::new(), Vec::new())
}

fn form_request(method: &str, path: &str, query: &str, body: &str) -> Request {
    Request::new(
        method.to_owned(),
        path.to_owned(),
        query.to_owned(),
        vec![("content-type".to_owned(), "application/x-www-form-urlencoded".to_owned())],
        body.as_bytes().to_vec(),
    )
}

type Log = Arc<Mutex<Vec<String>>>;

/// Middleware that records entry and exit markers into a shared log.
fn recording(log: Log, tag: &'static str) -> BoxedMiddleware {
    middleware_fn(move |next| {
        let log = Arc::clone(&log);
        handler_fn(move |ctx| {
            log.lock().unwrap().push(format!("{tag}-before"));
            let result = next.call(ctx);
            log.lock().unwrap().push(format!("{tag}-after"));
            result
        })
    })
}

/// Handler that pushes a marker into a shared log and answers 200.
fn marking(log: Log, tag: &'static str) -> impl Fn(&mut Context) -> Result<(), Error> {
    move |ctx| {
        log.lock().unwrap().push(tag.to_owned());
        ctx.json(200, tag)
    }
}

#[test]
fn matched_route_extracts_path_and_query_params() {
    let seen: Arc<Mutex<HashMap<String, String>>> = Arc::default();
    let captured = Arc::clone(&seen);

    let mut app = Router::new();
    app.get(
        "/users/:id",
        move |ctx: &mut Context| {
            *captured.lock().unwrap() = ctx.params().clone();
            ctx.json(200, "ok")
        },
        &[],
    );

    let mut ctx = Context::new(request("GET", "/users/42", "active=true"));
    app.dispatch(&mut ctx).unwrap();

    let params = seen.lock().unwrap();
    assert_eq!(params.get("id").map(String::as_str), Some("42"));
    assert_eq!(params.get("active").map(String::as_str), Some("true"));
    assert_eq!(params.len(), 2);
    assert_eq!(ctx.response().status(), 200);
}

#[test]
fn unmatched_request_gets_json_not_found() {
    let mut app = Router::new();
    app.get("/", |ctx: &mut Context| ctx.json(200, "home"), &[]);

    let mut ctx = Context::new(request("GET", "/blah", ""));
    app.dispatch(&mut ctx).unwrap();

    assert_eq!(ctx.response().status(), 404);
    assert_eq!(ctx.response().body(), b"\"Not Found\"");
    assert_eq!(ctx.response().header("content-type"), Some("application/json"));
}

#[test]
fn unknown_wire_method_falls_through_to_not_found() {
    let mut app = Router::new();
    app.get("/users/:id", |ctx: &mut Context| ctx.json(200, "ok"), &[]);

    let mut ctx = Context::new(request("BREW", "/users/42", ""));
    app.dispatch(&mut ctx).unwrap();

    assert_eq!(ctx.response().status(), 404);
}

#[test]
fn form_fields_overwrite_query_and_path_params() {
    let seen: Arc<Mutex<HashMap<String, String>>> = Arc::default();
    let captured = Arc::clone(&seen);

    let mut app = Router::new();
    app.post(
        "/things/:id",
        move |ctx: &mut Context| {
            *captured.lock().unwrap() = ctx.params().clone();
            ctx.code(204)
        },
        &[],
    );

    let mut ctx = Context::new(form_request("POST", "/things/path1", "id=query1", "id=form1"));
    app.dispatch(&mut ctx).unwrap();

    assert_eq!(seen.lock().unwrap().get("id").map(String::as_str), Some("form1"));
}

#[test]
fn global_middleware_composes_first_registered_outermost() {
    let log: Log = Arc::default();

    let mut app = Router::new();
    app.middleware(recording(Arc::clone(&log), "A"));
    app.middleware(recording(Arc::clone(&log), "B"));
    app.get("/", marking(Arc::clone(&log), "handler"), &[]);

    let mut ctx = Context::new(request("GET", "/", ""));
    app.dispatch(&mut ctx).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["A-before", "B-before", "handler", "B-after", "A-after"]
    );
}

#[test]
fn group_and_route_middleware_nest_inside_global() {
    let log: Log = Arc::default();

    let mut app = Router::new();
    app.middleware(recording(Arc::clone(&log), "global"));

    let mut group = app.group("/api");
    group.middleware(recording(Arc::clone(&log), "group"));
    group.get("/items", marking(Arc::clone(&log), "handler"), &[recording(Arc::clone(&log), "route")]);

    let mut ctx = Context::new(request("GET", "/api/items", ""));
    app.dispatch(&mut ctx).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "global-before",
            "group-before",
            "route-before",
            "handler",
            "route-after",
            "group-after",
            "global-after",
        ]
    );
}

#[test]
fn before_and_after_run_even_without_a_match() {
    let log: Log = Arc::default();

    let mut app = Router::new();
    app.before(recording(Arc::clone(&log), "b"));
    app.after(recording(Arc::clone(&log), "a"));

    let mut ctx = Context::new(request("GET", "/missing", ""));
    app.dispatch(&mut ctx).unwrap();

    assert_eq!(ctx.response().status(), 404);
    assert_eq!(*log.lock().unwrap(), vec!["b-before", "b-after", "a-before", "a-after"]);
}

#[test]
fn before_middleware_cannot_veto_routing() {
    let log: Log = Arc::default();
    let refusing = {
        let log = Arc::clone(&log);
        middleware_fn(move |_next| {
            let log = Arc::clone(&log);
            // Never calls the handler it was given.
            handler_fn(move |ctx| {
                log.lock().unwrap().push("before".to_owned());
                ctx.set_header("x-seen", "yes");
                Ok(())
            })
        })
    };

    let mut app = Router::new();
    app.before(refusing);
    app.get("/", marking(Arc::clone(&log), "handler"), &[]);

    let mut ctx = Context::new(request("GET", "/", ""));
    app.dispatch(&mut ctx).unwrap();

    // Routing happened regardless; the before layer only left side effects.
    assert_eq!(*log.lock().unwrap(), vec!["before", "handler"]);
    assert_eq!(ctx.response().header("x-seen"), Some("yes"));
    assert_eq!(ctx.response().status(), 200);
}

#[test]
fn handler_error_is_observable_and_fails_closed() {
    let log: Log = Arc::default();

    let mut app = Router::new();
    app.after(recording(Arc::clone(&log), "after"));
    app.get("/boom", |_: &mut Context| Err(Error::handler("boom")), &[]);

    let mut ctx = Context::new(request("GET", "/boom", ""));
    let err = app.dispatch(&mut ctx).unwrap_err();

    assert!(matches!(err, Error::Handler(message) if message == "boom"));
    assert_eq!(ctx.response().status(), 500);
    // Processing for the request aborted: after middleware never ran.
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn serialization_failure_surfaces_as_500_with_no_partial_body() {
    let mut app = Router::new();
    app.get(
        "/bad",
        |ctx: &mut Context| {
            // serde_json rejects maps whose keys are not strings.
            let bad: std::collections::BTreeMap<(u8, u8), &str> =
                std::collections::BTreeMap::from([((1, 2), "x")]);
            ctx.json(200, &bad)
        },
        &[],
    );

    let mut ctx = Context::new(request("GET", "/bad", ""));
    let err = app.dispatch(&mut ctx).unwrap_err();

    assert!(matches!(err, Error::Serialization(_)));
    assert_eq!(ctx.response().status(), 500);
    assert_eq!(ctx.response().body(), b"Internal Server Error");
}

#[test]
fn literal_route_wins_over_param_route_for_exact_paths() {
    let log: Log = Arc::default();

    let mut app = Router::new();
    app.get("/a/:x", marking(Arc::clone(&log), "param"), &[]);
    app.get("/a/fixed", marking(Arc::clone(&log), "literal"), &[]);

    let mut ctx = Context::new(request("GET", "/a/fixed", ""));
    app.dispatch(&mut ctx).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["literal"]);

    let mut ctx = Context::new(request("GET", "/a/other", ""));
    app.dispatch(&mut ctx).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["literal", "param"]);
}

#[test]
fn duplicate_registration_last_write_wins() {
    let log: Log = Arc::default();

    let mut app = Router::new();
    app.get("/dup", marking(Arc::clone(&log), "first"), &[]);
    app.get("/dup", marking(Arc::clone(&log), "second"), &[]);

    assert_eq!(app.routes(Method::Get).len(), 1);

    let mut ctx = Context::new(request("GET", "/dup", ""));
    app.dispatch(&mut ctx).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["second"]);
}

#[test]
fn trailing_slash_reaches_the_same_route() {
    let mut app = Router::new();
    app.get("/users/:id", |ctx: &mut Context| ctx.json(200, "ok"), &[]);

    let mut ctx = Context::new(request("GET", "/users/42/", ""));
    app.dispatch(&mut ctx).unwrap();
    assert_eq!(ctx.response().status(), 200);
}

#[test]
fn grouped_route_dispatches_with_group_middleware() {
    let mut app = Router::new();
    let mut admin = app.group("/admin");
    admin.middleware(middleware_fn(|next| {
        handler_fn(move |ctx| {
            if ctx.get_header("authorization") != Some("secret") {
                return ctx.http_error(401, "unauthorized");
            }
            next.call(ctx)
        })
    }));
    admin.get("/stats", |ctx: &mut Context| ctx.json(200, "stats"), &[]);

    let mut ctx = Context::new(request("GET", "/admin/stats", ""));
    app.dispatch(&mut ctx).unwrap();
    assert_eq!(ctx.response().status(), 401);

    let mut ctx = Context::new(Request::new(
        "GET".to_owned(),
        "/admin/stats".to_owned(),
        String::new(),
        vec![("authorization".to_owned(), "secret".to_owned())],
        Vec::new(),
    ));
    app.dispatch(&mut ctx).unwrap();
    assert_eq!(ctx.response().status(), 200);
    assert_eq!(ctx.response().body(), b"\"stats\"");
}

#[test]
fn malformed_form_body_contributes_nothing() {
    let seen: Arc<Mutex<HashMap<String, String>>> = Arc::default();
    let captured = Arc::clone(&seen);

    let mut app = Router::new();
    app.post(
        "/submit",
        move |ctx: &mut Context| {
            *captured.lock().unwrap() = ctx.params().clone();
            ctx.code(204)
        },
        &[],
    );

    // A JSON body under a form route: wrong content type, no fields.
    let mut ctx = Context::new(Request::new(
        "POST".to_owned(),
        "/submit".to_owned(),
        String::new(),
        vec![("content-type".to_owned(), "application/json".to_owned())],
        br#"{"name":"alice"}"#.to_vec(),
    ));
    app.dispatch(&mut ctx).unwrap();

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(ctx.response().status(), 204);
}
