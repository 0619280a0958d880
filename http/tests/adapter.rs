use basics_core::prelude::*;
use basics_core::BodyError;
use basics_http::{Catalog, I18nMiddleware, Router};
use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Basics<Router> {
    Basics::new(Router::new())
}

fn request(method: Method, uri: &str, body: &str) -> http::Request<Full<Bytes>> {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

async fn call(app: &Basics<Router>, req: http::Request<Full<Bytes>>) -> (StatusCode, String) {
    let response = app.service().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn echo_body(basics: HttpBasics) -> HandlerResult {
    match basics.body().await {
        Ok(value) => basics.response.json(&value)?,
        Err(BodyError::Json(err)) => {
            basics
                .response
                .status(StatusCode::BAD_REQUEST)
                .send(format!("invalid body: {err}"));
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

async fn path_of(basics: HttpBasics) -> HandlerResult {
    basics.response.send(basics.request.path().to_string());
    Ok(())
}

#[tokio::test]
async fn test_every_verb_method_reaches_handler_with_context() {
    let mut app = app();
    app.get("/items", path_of)
        .post("/items", path_of)
        .put("/items", path_of)
        .patch("/items", path_of)
        .delete("/items", path_of);

    for method in [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
    ] {
        let (status, body) = call(&app, request(method.clone(), "/items", "")).await;
        assert_eq!(status, StatusCode::OK, "{method}");
        assert_eq!(body, "/items");
    }

    let (status, body) = call(&app, request(Method::OPTIONS, "/items", "")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Cannot OPTIONS /items");
}

#[tokio::test]
async fn test_get_body_comes_from_query_parameter() {
    let mut app = app();
    app.get("/echo", echo_body);

    let (status, body) = call(&app, request(Method::GET, "/echo?body=%7B%22a%22%3A1%7D", "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"a": 1}));
}

#[tokio::test]
async fn test_get_body_with_invalid_json_rejects() {
    let mut app = app();
    app.get("/echo", echo_body);

    let (status, body) = call(&app, request(Method::GET, "/echo?body=not-json", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("invalid body:"));
}

#[tokio::test]
async fn test_post_body_comes_from_stream() {
    let mut app = app();
    app.post("/echo", echo_body);

    let (status, body) = call(&app, request(Method::POST, "/echo?body=%7B%7D", r#"{"x":5}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"x": 5}));
}

#[tokio::test]
async fn test_use_without_path_matches_everything() {
    let mut app = app();
    app.use_(None::<&str>, |basics: HttpBasics| async move {
        basics.response.set_header(
            http::HeaderName::from_static("x-seen"),
            http::HeaderValue::from_static("yes"),
        );
        basics.next.run().await
    })
    .get("/deep/path", path_of);

    let response = app
        .service()
        .oneshot(request(Method::GET, "/deep/path", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-seen"], "yes");
}

#[tokio::test]
async fn test_inline_use_runs_raw_middleware() {
    let mut app = app();
    app.get("/inline", |basics: HttpBasics| async move {
        basics
            .use_(|_req: Request, res: Response, _next: Next| async move {
                res.send("from raw middleware");
                Ok::<(), HandlerError>(())
            })
            .await
    });

    let (_, body) = call(&app, request(Method::GET, "/inline", "")).await;
    assert_eq!(body, "from raw middleware");
}

#[tokio::test]
async fn test_i18n_translates_single_and_multiple_keys() {
    let catalog = Catalog::new("en")
        .with_locale("en", [("A", "Apple"), ("B", "Banana")])
        .with_locale("es", [("A", "Manzana"), ("B", "Plátano")]);

    let mut app = app();
    app.layer(None::<&str>, I18nMiddleware::new(catalog));
    app.get("/one", |basics: HttpBasics| async move {
        let i18n = basics.i18n().ok_or_else(|| HandlerError::internal("no i18n"))?;
        basics.response.json(&tr!(i18n, "A").into_vec())?;
        Ok::<(), HandlerError>(())
    })
    .get("/two", |basics: HttpBasics| async move {
        let i18n = basics.i18n().ok_or_else(|| HandlerError::internal("no i18n"))?;
        basics.response.json(&i18n.tr(["A", "B"]).into_vec())?;
        Ok::<(), HandlerError>(())
    });

    let (_, body) = call(&app, request(Method::GET, "/one?lang=es", "")).await;
    assert_eq!(body, r#"["Manzana"]"#);

    let (_, body) = call(&app, request(Method::GET, "/two", "")).await;
    assert_eq!(body, r#"["Apple","Banana"]"#);
}

#[tokio::test]
async fn test_i18n_absent_without_middleware() {
    let mut app = app();
    app.get("/", |basics: HttpBasics| async move {
        basics.response.send(basics.i18n().is_some().to_string());
        Ok::<(), HandlerError>(())
    });

    let (_, body) = call(&app, request(Method::GET, "/", "")).await;
    assert_eq!(body, "false");
}

#[tokio::test]
async fn test_unknown_members_forward_to_router() {
    let mut app = app();
    app.set("title", "shop").enable("strict routing");
    app.get("/", path_of);

    assert_eq!(app.setting("title"), Some(&json!("shop")));
    assert!(app.enabled("strict routing"));
    assert_eq!(app.layer_count(), 1);
}

#[tokio::test]
async fn test_listen_serves_over_tcp_and_closes() {
    let mut app = app();
    app.get("/users/:id", |basics: HttpBasics| async move {
        let id = basics.request.param("id").unwrap_or_default();
        basics.response.json(&json!({ "id": id }))?;
        Ok::<(), HandlerError>(())
    });

    let server = app.listen(([127, 0, 0, 1], 0)).await.unwrap();
    let url = format!("http://{}/users/7", server.local_addr());

    let body: Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
    assert_eq!(body, json!({ "id": "7" }));

    server.close().await;
}
