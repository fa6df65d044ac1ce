//! Routing rules for the embedded web app.
//!
//! The SPA is served under `/apps/memos`. Requests there are answered with
//! static files (falling back to `index.html`); index routes are never
//! cached so deployments take effect immediately, every other asset is
//! cacheable for a week. `/` redirects to the app.

/// Mount point of the web app.
pub const APP_ROOT: &str = "/apps/memos";

/// Cache-Control value for static assets (7 days).
pub const STATIC_CACHE_CONTROL: &str = "public, max-age=604800";

/// Path prefixes owned by the API, never served as static files.
pub const API_PREFIXES: [&str; 2] = ["/api", "/memos.api.v1"];

/// What to do with an incoming request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Leave the request to the API handlers.
    Api,
    /// Serve a static file or the SPA fallback, with an optional
    /// Cache-Control header.
    Static {
        cache_control: Option<&'static str>,
    },
    /// Redirect with the given status.
    Redirect { status: u16, location: String },
    /// Not handled by the frontend.
    NotFound,
}

/// Frontend routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendRoutes {
    app_root: String,
}

impl Default for FrontendRoutes {
    fn default() -> Self {
        Self {
            app_root: APP_ROOT.to_string(),
        }
    }
}

impl FrontendRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn app_root(&self) -> &str {
        &self.app_root
    }

    /// Classifies a request path.
    pub fn route(&self, path: &str) -> Route {
        if is_api_path(path) {
            return Route::Api;
        }
        if path == "/" {
            return Route::Redirect {
                status: 301,
                location: format!("{}/", self.app_root),
            };
        }
        if self.is_app_path(path) {
            return Route::Static {
                cache_control: self.cache_control(path),
            };
        }
        Route::NotFound
    }

    /// Index routes are not cached; other app paths are.
    pub fn cache_control(&self, path: &str) -> Option<&'static str> {
        if self.is_index_path(path) {
            None
        } else {
            Some(STATIC_CACHE_CONTROL)
        }
    }

    pub fn is_index_path(&self, path: &str) -> bool {
        match path.strip_prefix(self.app_root.as_str()) {
            Some(rest) => rest.is_empty() || rest == "/" || rest == "/index.html",
            None => false,
        }
    }

    fn is_app_path(&self, path: &str) -> bool {
        match path.strip_prefix(self.app_root.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Whether `path` belongs to the API.
pub fn is_api_path(path: &str) -> bool {
    API_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_redirects_to_app() {
        let routes = FrontendRoutes::new();

        assert_eq!(
            routes.route("/"),
            Route::Redirect {
                status: 301,
                location: "/apps/memos/".to_string()
            }
        );
    }

    #[test]
    fn test_api_paths_are_skipped() {
        let routes = FrontendRoutes::new();

        assert_eq!(routes.route("/api/v1/users"), Route::Api);
        assert_eq!(
            routes.route("/memos.api.v1.UserService/GetUser"),
            Route::Api
        );
    }

    #[test]
    fn test_index_routes_are_not_cached() {
        let routes = FrontendRoutes::new();

        for path in ["/apps/memos", "/apps/memos/", "/apps/memos/index.html"] {
            assert_eq!(
                routes.route(path),
                Route::Static {
                    cache_control: None
                },
                "{path} should not be cached"
            );
        }
    }

    #[test]
    fn test_assets_are_cached_for_a_week() {
        let routes = FrontendRoutes::new();

        for path in [
            "/apps/memos/assets/index-abc123.js",
            "/apps/memos/explore",
            "/apps/memos/m/42",
        ] {
            assert_eq!(
                routes.route(path),
                Route::Static {
                    cache_control: Some("public, max-age=604800")
                },
                "{path} should be cached"
            );
        }
    }

    #[test]
    fn test_paths_outside_app_are_not_found() {
        let routes = FrontendRoutes::new();

        assert_eq!(routes.route("/apps/memosx"), Route::NotFound);
        assert_eq!(routes.route("/apps/other/index.html"), Route::NotFound);
        assert_eq!(routes.route("/favicon.ico"), Route::NotFound);
    }
}
