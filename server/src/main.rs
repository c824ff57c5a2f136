use std::path::PathBuf;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request, header},
    middleware::{self, Next},
    response::Response,
    routing,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    services::{ServeDir, ServeFile},
};

const DEFAULT_PORT: &str = "8080";
const DEFAULT_DIST_DIR: &str = "../dist";

async fn healthz() -> &'static str {
    "ok"
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let dist = PathBuf::from(std::env::var("DIST_DIR").unwrap_or_else(|_| DEFAULT_DIST_DIR.to_string()));
    if !dist.join("index.html").is_file() {
        tracing::warn!("No index.html under {}, every page will 404", dist.display());
    }

    // Unknown paths fall back to the single page
    let static_files = ServeDir::new(&dist).not_found_service(ServeFile::new(dist.join("index.html")));

    let app = Router::new()
        .route("/healthz", routing::get(healthz))
        .fallback_service(static_files)
        .layer(
            ServiceBuilder::new()
                .layer(CompressionLayer::new().br(true).gzip(true))
                .layer(middleware::from_fn(cache_control)),
        );

    let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };
    tracing::info!("Serving {} on http://{addr}", dist.display());

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server stopped: {err}");
        std::process::exit(1);
    }
}

async fn cache_control(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let mut res = next.run(req).await;

    res.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_policy(&path)),
    );
    res
}

/// Cache-Control value for a request path
fn cache_policy(path: &str) -> &'static str {
    // HTML always revalidates so a new deploy shows up on the next load
    if path == "/" || path.ends_with(".html") {
        return "no-cache, must-revalidate";
    }

    if is_fingerprinted_asset(path) {
        "public, max-age=31536000, immutable"
    } else {
        "public, max-age=0, must-revalidate"
    }
}

// Heuristic: "name.<hash>.ext" where the hash is at least 8 hex digits
fn is_fingerprinted_asset(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or(path);
    let parts: Vec<&str> = file.split('.').collect();

    // need at least name.hash.ext
    if parts.len() < 3 {
        return false;
    }

    parts[1..parts.len() - 1]
        .iter()
        .any(|hash| hash.len() >= 8 && hash.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_detection() {
        assert!(is_fingerprinted_asset("/assets/portfolio_fx.1a2b3c4d.wasm"));
        assert!(is_fingerprinted_asset("/index.0123456789abcdef.js"));
        assert!(is_fingerprinted_asset("/scenes/doodle.deadbeef.min.glb"));

        assert!(!is_fingerprinted_asset("/assets/effects.json"));
        assert!(!is_fingerprinted_asset("/app.v2.js"));
        assert!(!is_fingerprinted_asset("/style.not-a-hash.css"));
        assert!(!is_fingerprinted_asset("/"));
    }

    #[test]
    fn test_cache_policy() {
        assert_eq!(cache_policy("/"), "no-cache, must-revalidate");
        assert_eq!(cache_policy("/index.html"), "no-cache, must-revalidate");
        assert_eq!(
            cache_policy("/portfolio_fx.1a2b3c4d.wasm"),
            "public, max-age=31536000, immutable"
        );
        assert_eq!(cache_policy("/favicon.ico"), "public, max-age=0, must-revalidate");
    }
}
