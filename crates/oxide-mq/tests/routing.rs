//! Tests for route tables.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{noop, Flags, Log, Units};
use oxide_mq::{
    invoke, sync, DispatchError, Handler, Message, Method, MethodFilter, PatternOptions, Routing,
};

async fn dispatch(routing: &Handler, value: &str) -> Message {
    let mut msg = Message::new(value);
    invoke(routing, &mut msg).await.unwrap();
    msg
}

fn regex_table(log: &Log) -> Handler {
    Routing::from_map([
        ("^a$", log.writer("a")),
        ("^c$", log.writer("c")),
        ("^b$", log.writer("b")),
        (r"^params/(([0-9]+)\.(([a-z])?[0-9]+)\.html)$", log.capture("params")),
        (r"^params0/[0-9]+\.html$", log.capture("params0")),
        (r"^params1/([0-9]+)\.html$", log.capture("params1")),
        (r"^params2/([0-9]+)\.(([a-z])?[0-9]+)\.html$", log.capture("params2")),
        (
            r"^params3/(([0-9]+)\.(([a-z])?[0-9]+([a-z]([0-9]+)))\.html)$",
            log.capture("params3"),
        ),
    ])
    .unwrap()
    .into()
}

#[tokio::test]
async fn simple_paths() {
    let log = Log::new();
    let table = regex_table(&log);

    dispatch(&table, "a").await;
    dispatch(&table, "b").await;
    dispatch(&table, "c").await;
    assert_eq!(log.entries(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn regex_groups_rewrite_value_and_params() {
    let log = Log::new();
    let table = regex_table(&log);

    dispatch(&table, "params/123.a456.html").await;
    dispatch(&table, "params0/999.html").await;
    dispatch(&table, "params1/789.html").await;
    dispatch(&table, "params2/123.b456.html").await;
    dispatch(&table, "params3/123.b456c789.html").await;

    assert_eq!(
        log.entries(),
        vec![
            r#"params value=123.a456.html params=["123", "a456"]"#,
            r#"params0 value=params0/999.html params=[]"#,
            r#"params1 value=789 params=["789"]"#,
            r#"params2 value= params=["123", "b456"]"#,
            r#"params3 value=123.b456c789.html params=["123", "b456c789"]"#,
        ]
    );
}

#[tokio::test]
async fn unmatched_value_is_an_error() {
    let table = regex_table(&Log::new());

    let mut msg = Message::new("d");
    let err = invoke(&table, &mut msg).await.unwrap_err();
    match err {
        DispatchError::NoRouteMatched { method, value } => {
            assert_eq!(method, "-");
            assert_eq!(value, "d");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn regex_group_becomes_value() {
    let table: Handler = Routing::from_map([("^/api/a$", noop()), ("^/api/a(/.*)$", noop())])
        .unwrap()
        .into();

    assert_eq!(dispatch(&table, "/api/a").await.value, "/api/a");
    assert_eq!(dispatch(&table, "/api/a/test").await.value, "/test");
}

#[tokio::test]
async fn method_filters() {
    let flags = Flags::new();
    let table: Handler = Routing::new()
        .map(Method::Get, [("^/a$", flags.setter(1))])
        .unwrap()
        .post("^/a$", flags.setter(2))
        .unwrap()
        .all("^/b$", flags.setter(4))
        .unwrap()
        .into();

    invoke(&table, &mut Message::request(Method::Get, "/a")).await.unwrap();
    assert_eq!(flags.get(), 1);

    flags.reset();
    invoke(&table, &mut Message::request(Method::Post, "/a")).await.unwrap();
    assert_eq!(flags.get(), 2);

    flags.reset();
    let mut any = Message::request(Method::parse("ANY_METHOD"), "/b");
    invoke(&table, &mut any).await.unwrap();
    assert_eq!(flags.get(), 4);

    let mut put = Message::request(Method::Put, "/a");
    let err = invoke(&table, &mut put).await.unwrap_err();
    assert_eq!(err.to_string(), "no route matched: PUT /a");
}

#[tokio::test]
async fn remaining_methods() {
    let log = Log::new();
    let table: Handler = Routing::new()
        .put("/item", log.writer("put"))
        .unwrap()
        .patch("/item", log.writer("patch"))
        .unwrap()
        .delete("/item", log.writer("delete"))
        .unwrap()
        .route(MethodFilter::Only(Method::parse("purge")), "/item", log.writer("purge"))
        .unwrap()
        .into();

    for method in ["PUT", "PATCH", "DELETE", "PURGE"] {
        let mut msg = Message::request(Method::parse(method), "/item");
        invoke(&table, &mut msg).await.unwrap();
    }
    assert_eq!(log.entries(), vec!["put", "patch", "delete", "purge"]);
}

#[tokio::test]
async fn from_map_keeps_order() {
    let table: Handler = Routing::from_map([("^/api/a(/.*)$", noop()), ("^/api/(.*)$", noop())])
        .unwrap()
        .into();

    assert_eq!(dispatch(&table, "/api/a/").await.value, "/");
}

#[tokio::test]
async fn append_keeps_order() {
    let table: Handler = Routing::new()
        .append("^/api/a(/.*)$", noop())
        .unwrap()
        .append("^/api/(.*)$", noop())
        .unwrap()
        .into();

    assert_eq!(dispatch(&table, "/api/a/").await.value, "/");
}

#[tokio::test]
async fn append_table_keeps_order() {
    let inner = Routing::from_map([("^/api/a(/.*)$", noop()), ("^/api/(.*)$", noop())]).unwrap();
    let table: Handler = Routing::new().append_table(&inner).into();

    assert_eq!(dispatch(&table, "/api/a/").await.value, "/");
}

#[tokio::test]
async fn append_table_evaluates_after_existing_routes() {
    let log = Log::new();
    let a = Routing::new()
        .append("/:x", log.writer("a1"))
        .unwrap()
        .append("/a2", log.writer("a2"))
        .unwrap();
    let b = Routing::new()
        .append("/b1", log.writer("b1"))
        .unwrap()
        .append("/:x/:y", log.writer("b2"))
        .unwrap();

    let table: Handler = a.append_table(&b).into();
    dispatch(&table, "/a2").await;
    dispatch(&table, "/b1").await;
    dispatch(&table, "/b/2").await;
    assert_eq!(log.entries(), vec!["a1", "a1", "b2"]);
}

#[tokio::test]
async fn nested_table_sees_the_remainder() {
    let log = Log::new();
    let users = Routing::new()
        .get("/", log.capture("list"))
        .unwrap()
        .get("/:id", log.capture("show"))
        .unwrap();
    let api = Routing::new().append("/users", users).unwrap();
    let app: Handler = Routing::new().append("/api/:version", api).unwrap().into();

    let mut msg = Message::get("/api/v1/users/42");
    invoke(&app, &mut msg).await.unwrap();
    let mut msg = Message::get("/api/v2/users/");
    invoke(&app, &mut msg).await.unwrap();

    assert_eq!(
        log.entries(),
        vec![
            r#"show value=/42 params=["v1", "42"]"#,
            r#"list value=/ params=["v2"]"#,
        ]
    );
}

#[tokio::test]
async fn nested_table_without_match_fails_the_dispatch() {
    let api = Routing::new().append("/known", noop()).unwrap();
    let app: Handler = Routing::new().append("/api", api).unwrap().into();

    let mut msg = Message::new("/api/unknown");
    let err = invoke(&app, &mut msg).await.unwrap_err();
    assert!(matches!(
        err,
        DispatchError::NoRouteMatched { ref value, .. } if value == "/unknown"
    ));
}

#[tokio::test]
async fn strict_trailing_slash() {
    let flags = Flags::new();
    let strict: Handler = Routing::new().append("/test", flags.setter(1)).unwrap().into();
    let lenient: Handler = Routing::new()
        .with_options(PatternOptions::lenient())
        .append("/test", flags.setter(2))
        .unwrap()
        .into();

    assert!(invoke(&strict, &mut Message::new("/test/")).await.is_err());
    invoke(&lenient, &mut Message::new("/test/")).await.unwrap();
    assert_eq!(flags.get(), 2);
}

#[tokio::test]
async fn encoded_separator_is_decoded_in_params() {
    let table: Handler = Routing::new().append("/:test", noop()).unwrap().into();

    let msg = dispatch(&table, "/something%2Felse").await;
    assert_eq!(msg.params, vec!["something/else"]);
}

#[tokio::test]
async fn host_routes_match_the_host_header() {
    let log = Log::new();
    let table: Handler = Routing::new()
        .host("*.test.com", log.capture("sub"))
        .unwrap()
        .host("test.com", log.capture("root"))
        .unwrap()
        .into();

    let mut msg = Message::new("/").header("Host", "www.test.com:8080");
    invoke(&table, &mut msg).await.unwrap();
    let mut msg = Message::new("/").header("host", "test.com");
    invoke(&table, &mut msg).await.unwrap();
    assert_eq!(
        log.entries(),
        vec![r#"sub value=/ params=["www"]"#, r#"root value=/ params=[]"#]
    );

    let mut msg = Message::new("/").header("Host", "other.com");
    assert!(invoke(&table, &mut msg).await.is_err());
}

#[tokio::test]
async fn host_route_to_nested_table() {
    let log = Log::new();
    let site = Routing::new().append("/:page", log.capture("page")).unwrap();
    let table: Handler = Routing::new().host("w*.test.com", site).unwrap().into();

    let mut msg = Message::new("/about").header("Host", "web.test.com");
    invoke(&table, &mut msg).await.unwrap();
    assert_eq!(log.entries(), vec![r#"page value=/about params=["eb", "about"]"#]);
}

#[tokio::test]
async fn routed_chain_runs_in_another_unit() {
    let units = Units::new();
    let chain: Handler = vec![units.recorder(), units.recorder()].into();
    let table: Handler = Routing::new()
        .append("/chain", chain)
        .unwrap()
        .append("/func", units.recorder())
        .unwrap()
        .into();
    let outer: Handler = vec![units.recorder(), table].into();

    invoke(&outer, &mut Message::new("/chain")).await.unwrap();
    let seen = units.seen();
    assert_ne!(seen[0], seen[1]);
    assert_eq!(seen[1], seen[2]);

    invoke(&outer, &mut Message::new("/func")).await.unwrap();
    let seen = units.seen();
    assert_ne!(seen[3], seen[4]);
}

#[tokio::test]
async fn routed_function_continuation_is_applied() {
    let log = Log::new();
    let next = log.capture("next");
    let table: Handler = Routing::new()
        .append(
            "/start/:id",
            Handler::func(move |msg: &mut Message| {
                msg.value = "continued".to_string();
                next.clone()
            }),
        )
        .unwrap()
        .into();

    dispatch(&table, "/start/9").await;
    assert_eq!(log.entries(), vec![r#"next value=continued params=["9"]"#]);
}

#[tokio::test]
async fn dropping_the_last_handler_releases_the_table() {
    let table = Arc::new(
        Routing::from_map([("^/api/a$", noop()), ("^/api/a(/.*)$", noop())]).unwrap(),
    );
    let weak = Arc::downgrade(&table);

    let server = Handler::from(table);
    dispatch(&server, "/api/a").await;
    assert!(weak.upgrade().is_some());

    drop(server);
    assert!(weak.upgrade().is_none());
}

#[tokio::test]
async fn nested_tables_are_released_with_their_parent() {
    let inner = Arc::new(Routing::new().append("/a", noop()).unwrap());
    let weak_inner = Arc::downgrade(&inner);

    let outer = Routing::new().append("/x", Handler::from(inner)).unwrap();
    let chain = Arc::new(oxide_mq::Chain::new([noop(), Handler::from(outer)]));
    let weak_chain = Arc::downgrade(&chain);

    let handler = Handler::from(chain);
    dispatch(&handler, "/x/a").await;

    drop(handler);
    assert!(weak_chain.upgrade().is_none());
    assert!(weak_inner.upgrade().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_dispatches_share_one_table() {
    let finished = Log::new();
    let writer = finished.clone();
    let inner = Routing::new()
        .append(
            "/:n",
            sync(move |msg, done| {
                let n = msg.params.last().cloned().unwrap_or_default();
                let delay = if n == "1" { 50 } else { 5 };
                let writer = writer.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    writer.push(format!("done:{n}"));
                    done.complete_with(move |msg| msg.value = format!("done:{n}"))
                        .unwrap();
                });
            }),
        )
        .unwrap();
    let table: Handler = Routing::new().append("/:name", inner).unwrap().into();

    let first = table.clone();
    let a = tokio::spawn(async move {
        let mut msg = Message::new("/x/1");
        invoke(&first, &mut msg).await.unwrap();
        msg
    });
    let second = table.clone();
    let b = tokio::spawn(async move {
        let mut msg = Message::new("/y/2");
        invoke(&second, &mut msg).await.unwrap();
        msg
    });

    let a = a.await.unwrap();
    let b = b.await.unwrap();
    assert_eq!(finished.entries(), vec!["done:2", "done:1"]);
    assert_eq!((a.value.as_str(), a.params), ("done:1", vec!["x".to_string(), "1".to_string()]));
    assert_eq!((b.value.as_str(), b.params), ("done:2", vec!["y".to_string(), "2".to_string()]));
}
