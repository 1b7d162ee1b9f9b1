//! Minimal pathwise example: a config-driven route table and a few lookups.
//!
//! Run with:
//!   RUST_LOG=trace cargo run --example basic
//!
//! Handlers are plain function pointers here. pathwise never calls them; it
//! only hands back whatever value you registered.

use pathwise::{HttpMethod, PathParams, RouterBuilder, RoutesConfig, TracingObserver};

type Handler = fn(&PathParams) -> String;

const ROUTES: &str = r#"
[[aliases]]
prefix = "/v1"
target = "/api/v1"

[[routes]]
methods = ["GET"]
path = "/api/v1/users/me"
handler = "current_user"

[[routes]]
methods = ["GET", "DELETE"]
path = "/api/v1/users/{id}"
handler = "user"

[[routes]]
methods = ["GET"]
path = '/static/([a-z]+)/(.+)'
handler = "asset"

[[routes]]
methods = ["GET"]
path = "/healthz"
handler = "liveness"
"#;

fn main() -> Result<(), pathwise::RouteError> {
    tracing_subscriber::fmt::init();

    let config = RoutesConfig::from_toml_str(ROUTES)?;
    let mut builder = RouterBuilder::from_config(&config, handler_named)?;
    builder.observer(TracingObserver);
    let router = builder.build()?;

    let requests = [
        (HttpMethod::Get, "/v1/users/me"),
        (HttpMethod::Get, "/api/v1/users/42"),
        (HttpMethod::Delete, "/v1/users/42/"),
        (HttpMethod::Get, "/static/css/site.css"),
        (HttpMethod::Get, "/healthz"),
        (HttpMethod::Post, "/healthz"),
    ];
    for (method, path) in requests {
        match router.resolve(method, path)? {
            Some(found) => {
                let handler = found.handler();
                let response = handler(found.params());
                tracing::info!(%method, path, %response, "matched");
            }
            None => tracing::info!(%method, path, "404 not found"),
        }
    }
    Ok(())
}

fn handler_named(name: &str) -> Option<Handler> {
    match name {
        "current_user" => Some(current_user),
        "user" => Some(user),
        "asset" => Some(asset),
        "liveness" => Some(liveness),
        _ => None,
    }
}

fn current_user(_: &PathParams) -> String {
    r#"{"id":"1","name":"alice"}"#.to_owned()
}

fn user(params: &PathParams) -> String {
    let id = match params {
        PathParams::Named(vars) => vars.get("id").map_or("unknown", String::as_str),
        _ => "unknown",
    };
    format!(r#"{{"id":"{id}"}}"#)
}

fn asset(params: &PathParams) -> String {
    match params {
        PathParams::Positional(groups) => format!("asset {} ({})", groups[0], groups[1]),
        _ => "asset".to_owned(),
    }
}

fn liveness(_: &PathParams) -> String {
    "ok".to_owned()
}
