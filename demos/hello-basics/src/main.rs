//! hello-basics
//!
//! Small JSON API showing the request context: body parsing from the stream
//! and from `?body=` on GET, per-request translation, and inline middleware.
//!
//! ```text
//! curl localhost:3000/hello/Ana -H 'Accept-Language: es'
//! curl 'localhost:3000/items?body=%7B%22limit%22%3A2%7D'
//! curl -X POST localhost:3000/items -d '{"name":"lamp"}'
//! ```

use anyhow::Result;
use basics::prelude::*;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct NewItem {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(default)]
    limit: Option<usize>,
}

const ITEMS: [&str; 3] = ["chair", "desk", "lamp"];

#[tokio::main]
async fn main() -> Result<()> {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let config_path = manifest_dir.join("basics.toml");
    let config = if config_path.exists() {
        BasicsConfig::from_file_with_env(&config_path)?
    } else {
        BasicsConfig::from_env()?
    };
    config.validate()?;

    basics::init_tracing(&config.log).map_err(|err| anyhow::anyhow!(err))?;

    let catalog = Catalog::from_dir(manifest_dir.join("locales"), config.default_locale.clone())?;

    let mut app = app_with_config(&config);
    app.layer(None::<&str>, I18nMiddleware::new(catalog));
    app.use_(None::<&str>, request_log)
        .get("/hello/:name", hello)
        .get("/items", list_items)
        .post("/items", create_item)
        .use_(None::<&str>, not_found);

    let server = app.listen(config.socket_addr()?).await?;
    tracing::info!(addr = %server.local_addr(), "hello-basics ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.close().await;
    Ok(())
}

async fn request_log(basics: HttpBasics) -> HandlerResult {
    tracing::info!(method = %basics.request.method(), path = basics.request.path(), "request");
    basics.next.run().await
}

async fn hello(basics: HttpBasics) -> HandlerResult {
    let name = basics.request.param("name").unwrap_or_default();
    let greeting = match basics.i18n() {
        Some(i18n) => i18n.t(["GREETING", name.as_str()]),
        None => format!("Hello, {name}!"),
    };
    basics.response.json(&json!({ "message": greeting }))?;
    Ok(())
}

async fn list_items(basics: HttpBasics) -> HandlerResult {
    let query: ListQuery = match basics.body_as().await {
        Ok(query) => query,
        Err(BodyError::Json(_)) => ListQuery::default(),
        Err(err) => return Err(err.into()),
    };
    let limit = query.limit.unwrap_or(ITEMS.len()).min(ITEMS.len());
    let label = basics
        .i18n()
        .map(|i18n| i18n.t("ITEMS"))
        .unwrap_or_else(|| "items".to_string());

    basics
        .response
        .json(&json!({ "label": label, "items": &ITEMS[..limit] }))?;
    Ok(())
}

async fn create_item(basics: HttpBasics) -> HandlerResult {
    let item: NewItem = match basics.body_as().await {
        Ok(item) => item,
        Err(err) => {
            basics
                .response
                .status(StatusCode::BAD_REQUEST)
                .json(&json!({ "error": err.to_string() }))?;
            return Ok(());
        }
    };

    let message = match basics.i18n() {
        Some(i18n) => tr!(i18n, "ITEM_CREATED").into_vec().concat(),
        None => "Item created".to_string(),
    };
    basics
        .response
        .status(StatusCode::CREATED)
        .json(&json!({ "message": message, "name": item.name }))?;
    Ok(())
}

async fn not_found(basics: HttpBasics) -> HandlerResult {
    basics.response.status(StatusCode::NOT_FOUND).json(&json!({
        "error": format!("no route for {} {}", basics.request.method(), basics.request.path())
    }))?;
    Ok(())
}
