//! Served files: the `/static` and `/upload` mounts and the rewriting of
//! stored filenames into absolute URLs for responses.

use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;

pub const STATIC_ROUTE: &str = "/static";
pub const UPLOAD_ROUTE: &str = "/upload";

/// Images shipped in the static directory. Any other filename is assumed to
/// have been uploaded.
pub const DEFAULT_STATIC_IMAGES: &[&str] = &[
    "default-avatar.jpg",
    "apartment-01.jpg",
    "apartment-02.jpg",
    "apartment-03.jpg",
    "room.jpg",
    "studio-01.jpg",
];

/// Maps stored image filenames to absolute URLs.
#[derive(Clone, Debug)]
pub struct AssetUrls {
    static_base: String,
    upload_base: String,
    defaults: Arc<[String]>,
}

impl AssetUrls {
    /// `public_url` is the externally visible origin, e.g. `http://localhost:8080`
    pub fn new(public_url: &str) -> Self {
        Self::with_defaults(public_url, DEFAULT_STATIC_IMAGES.iter().copied())
    }

    pub fn with_defaults<'a>(public_url: &str, defaults: impl IntoIterator<Item = &'a str>) -> Self {
        let root = public_url.trim_end_matches('/');
        Self {
            static_base: format!("{root}{STATIC_ROUTE}"),
            upload_base: format!("{root}{UPLOAD_ROUTE}"),
            defaults: defaults.into_iter().map(str::to_string).collect(),
        }
    }

    /// Absolute URL for `file`. Values that already are URLs pass through.
    pub fn resolve(&self, file: &str) -> String {
        if file.starts_with("http://") || file.starts_with("https://") {
            return file.to_string();
        }

        let base = if self.is_default(file) {
            &self.static_base
        } else {
            &self.upload_base
        };
        format!("{base}/{}", file.trim_start_matches('/'))
    }

    pub fn resolve_all(&self, files: &[String]) -> Vec<String> {
        files.iter().map(|f| self.resolve(f)).collect()
    }

    pub fn is_default(&self, file: &str) -> bool {
        self.defaults.iter().any(|d| d == file)
    }
}

/// Router serving both file directories
pub fn file_routes(static_dir: impl AsRef<Path>, upload_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .nest_service(STATIC_ROUTE, ServeDir::new(static_dir.as_ref()))
        .nest_service(UPLOAD_ROUTE, ServeDir::new(upload_dir.as_ref()))
}
