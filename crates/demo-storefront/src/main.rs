use axum::extract::Path;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use rand::Rng;
use serde_json::{json, Value};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Simulate upstream latency (5-20ms).
async fn think() {
    let delay = rand::thread_rng().gen_range(5..=20);
    tokio::time::sleep(Duration::from_millis(delay)).await;
}

/// Storefront-shaped HTML document: title, breadcrumbs, main container.
fn page(title: &str, crumb: &str, main: &str) -> Html<String> {
    Html(format!(
        r##"<!doctype html>
<html>
  <head>
    <title>{title} — Glide Demo Store</title>
    <link rel="stylesheet" href="/assets/theme.css">
  </head>
  <body>
    <nav class="breadcrumbs"><a href="/">Home</a> / {crumb}</nav>
    <div id="MainContent">
      {main}
    </div>
  </body>
</html>"##
    ))
}

async fn home() -> Html<String> {
    think().await;
    page(
        "Home",
        "Home",
        r#"<h1>Glide Demo Store</h1>
      <ul>
        <li><a href="/collections/sale">Sale</a></li>
        <li><a href="/collections/new">New arrivals</a></li>
        <li><a href="/pages/about">About</a></li>
      </ul>"#,
    )
}

async fn collection(Path(handle): Path<String>) -> Html<String> {
    think().await;
    let items: String = (1..=8)
        .map(|i| format!(r#"<li><a href="/products/item-{i}">Item {i}</a></li>"#))
        .collect();
    page(
        &format!("Collection: {handle}"),
        &handle,
        &format!("<h1>{handle}</h1><ul>{items}</ul>"),
    )
}

async fn product(Path(handle): Path<String>) -> Html<String> {
    think().await;
    page(
        &format!("Product: {handle}"),
        &format!("Products / {handle}"),
        &format!(
            r#"<h1>{handle}</h1>
      <p>A fine product.</p>
      <button name="add">Add to cart</button>"#
        ),
    )
}

async fn about() -> Html<String> {
    think().await;
    page("About", "About", "<h1>About us</h1><p>We ship fast.</p>")
}

async fn products_json() -> Json<Value> {
    think().await;
    let products: Vec<Value> = (1..=8)
        .map(|i| {
            json!({
                "handle": format!("item-{i}"),
                "title": format!("Item {i}"),
                "price": 1000 + i * 250,
            })
        })
        .collect();
    Json(json!({ "products": products }))
}

async fn search() -> Json<Value> {
    think().await;
    Json(json!({ "results": [], "query": "" }))
}

async fn cart_js() -> Json<Value> {
    think().await;
    Json(json!({ "token": "demo", "item_count": 0, "items": [] }))
}

async fn asset(Path(name): Path<String>) -> impl IntoResponse {
    think().await;
    let body = format!("/* asset: {name} */\n");
    ([(header::CONTENT_TYPE, "text/css")], body)
}

async fn health() -> &'static str {
    "ok"
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = Router::new()
        .route("/", get(home))
        .route("/collections/{handle}", get(collection))
        .route("/products/{handle}", get(product))
        .route("/pages/about", get(about))
        .route("/products.json", get(products_json))
        .route("/search", get(search))
        .route("/cart.js", get(cart_js))
        .route("/assets/{name}", get(asset))
        .route("/health", get(health));

    let addr = "0.0.0.0:3000";
    tracing::info!(addr, "demo storefront starting");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
