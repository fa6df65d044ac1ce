//! Base path resolution for an app served under a URL prefix.
//!
//! The app may be mounted under a sub-path such as `/apps/memos`. Every
//! link the app builds goes through [`BasePath`] so it stays inside the
//! mount point.

/// Placeholder a server may put in front of a path to mean "the current
/// origin, without the base path".
pub const ORIGIN_PLACEHOLDER: &str = "{origin}";

/// Normalized base path of the app.
///
/// Empty when the app is served from the root; otherwise starts with `/`
/// and has no trailing slash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePath {
    path: String,
}

impl BasePath {
    /// Normalizes a configured base URL. `""` and `"/"` mean the root.
    pub fn new(base_url: &str) -> Self {
        if base_url.is_empty() || base_url == "/" {
            return Self::default();
        }
        Self {
            path: base_url.strip_suffix('/').unwrap_or(base_url).to_string(),
        }
    }

    /// The base path, empty at the root.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Prefixes `path` with the base path, adding a leading `/` if missing.
    pub fn with_base_path(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.path, path)
        } else {
            format!("{}/{}", self.path, path)
        }
    }

    /// The app root URL for the given origin.
    pub fn origin_with_base_path(&self, origin: &str) -> String {
        format!("{}{}", origin, self.path)
    }

    /// Resolves a URL handed out by the server for use in the app.
    ///
    /// - blank → `fallback_path` under the base path
    /// - `{origin}/x` → `origin` + `/x`, bypassing the base path
    /// - `http(s)://`, `//`, `data:` and `blob:` URLs → unchanged
    /// - paths already under the base path → unchanged
    /// - anything else → prefixed with the base path
    pub fn resolve_app_url(&self, url: Option<&str>, fallback_path: &str, origin: &str) -> String {
        let trimmed = match url.map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => return self.with_base_path(fallback_path),
        };

        if let Some(rest) = trimmed.strip_prefix(ORIGIN_PLACEHOLDER) {
            return format!("{}{}", origin, rest);
        }
        if is_absolute_url(trimmed) || trimmed.starts_with("data:") || trimmed.starts_with("blob:") {
            return trimmed.to_string();
        }
        if !self.is_root() && self.contains(trimmed) {
            return trimmed.to_string();
        }
        self.with_base_path(trimmed)
    }

    /// Removes the base path from a pathname. Pathnames outside the base
    /// path are returned unchanged.
    pub fn strip_base_path(&self, pathname: &str) -> String {
        if self.is_root() {
            return pathname.to_string();
        }
        if pathname == self.path {
            return "/".to_string();
        }
        match pathname.strip_prefix(self.path.as_str()) {
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            _ => pathname.to_string(),
        }
    }

    /// Whether `pathname` is the base path itself or lies beneath it.
    fn contains(&self, pathname: &str) -> bool {
        pathname == self.path
            || pathname
                .strip_prefix(self.path.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// `http://`, `https://` or protocol-relative `//`, case-insensitive.
fn is_absolute_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("//") || lower.starts_with("http://") || lower.starts_with("https://")
}
