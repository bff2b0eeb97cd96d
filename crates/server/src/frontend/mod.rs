//! Serving the web client next to the API.

use axum::Router;
use axum_reverse_proxy::ReverseProxy;
use std::path::PathBuf;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::FrontendMode;

/// Add the frontend as the fallback of an API router that already has its state.
///
/// Client-side routes (`/alumni`, `/library`, ...) resolve to `index.html` in
/// static mode so deep links load the app.
pub fn with_frontend_fallback(router: Router, mode: &FrontendMode) -> Router {
    match mode {
        FrontendMode::Proxy { target } => {
            tracing::info!("Frontend mode: proxy to {}", target);
            let proxy: Router = ReverseProxy::new("/", target).into();
            router.merge(proxy)
        }
        FrontendMode::Static { dir } => {
            tracing::info!("Frontend mode: static files from {}", dir);
            let path = PathBuf::from(dir);
            let index = ServeFile::new(path.join("index.html"));
            router.fallback_service(ServeDir::new(&path).fallback(index))
        }
        FrontendMode::Disabled => {
            tracing::info!("Frontend mode: disabled (API only)");
            router
        }
    }
}
