//! Avatar URL normalization.
//!
//! DooTask avatars point at the DooTask host. memos is served from the same
//! origin under a base path, so avatars are stored as `{origin}/path`; the
//! web client later replaces the placeholder with the page origin instead of
//! prefixing the memos base path.

use url::Url;

use memos_domain::web::base_path::ORIGIN_PLACEHOLDER;

/// Normalizes a DooTask avatar URL for storage.
///
/// - blank → empty
/// - root-relative path → `{origin}/path` (query and fragment dropped)
/// - absolute or protocol-relative URL → `{origin}` + its path, or empty
///   when it has no path; the path stays percent-encoded
/// - relative path → kept as-is
pub fn normalize_avatar_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if raw.starts_with("//") {
        return match Url::parse(&format!("http:{raw}")) {
            Ok(url) => placeholder_for_url(&url, raw),
            Err(_) => raw.to_string(),
        };
    }

    if raw.starts_with('/') {
        let path = raw.split(['?', '#']).next().unwrap_or_default();
        return with_origin_placeholder(path);
    }

    match Url::parse(raw) {
        Ok(url) => placeholder_for_url(&url, raw),
        // Not absolute, so a relative path
        Err(_) => raw.to_string(),
    }
}

fn placeholder_for_url(url: &Url, raw: &str) -> String {
    if url.cannot_be_a_base() {
        return String::new();
    }
    match url.path() {
        "" => String::new(),
        // The parser turns `http://host` into `/` too
        "/" if !has_explicit_path(raw) => String::new(),
        path => with_origin_placeholder(path),
    }
}

/// Whether the text after the authority starts with `/`.
fn has_explicit_path(raw: &str) -> bool {
    let after_scheme = match raw.find("//") {
        Some(idx) => &raw[idx + 2..],
        None => return false,
    };
    after_scheme
        .find(['/', '?', '#'])
        .is_some_and(|idx| after_scheme[idx..].starts_with('/'))
}

fn with_origin_placeholder(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    if path.starts_with('/') {
        format!("{ORIGIN_PLACEHOLDER}{path}")
    } else {
        format!("{ORIGIN_PLACEHOLDER}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_avatar_is_empty() {
        assert_eq!(normalize_avatar_url(""), "");
        assert_eq!(normalize_avatar_url("   "), "");
    }

    #[test]
    fn test_root_relative_path_gets_placeholder() {
        assert_eq!(
            normalize_avatar_url("/uploads/user/avatar.png"),
            "{origin}/uploads/user/avatar.png"
        );
        assert_eq!(
            normalize_avatar_url(" /avatar.png?v=3#x "),
            "{origin}/avatar.png"
        );
    }

    #[test]
    fn test_absolute_url_keeps_only_path() {
        assert_eq!(
            normalize_avatar_url("http://nginx/uploads/avatar.png?size=64"),
            "{origin}/uploads/avatar.png"
        );
        assert_eq!(
            normalize_avatar_url("https://cdn.example.com/a/b.jpg"),
            "{origin}/a/b.jpg"
        );
        assert_eq!(
            normalize_avatar_url("//cdn.example.com/a.jpg"),
            "{origin}/a.jpg"
        );
    }

    #[test]
    fn test_absolute_url_without_path_is_empty() {
        assert_eq!(normalize_avatar_url("http://nginx"), "");
        assert_eq!(normalize_avatar_url("mailto:someone@example.com"), "");
    }

    #[test]
    fn test_absolute_url_with_root_path_keeps_slash() {
        assert_eq!(normalize_avatar_url("http://nginx/"), "{origin}/");
        assert_eq!(normalize_avatar_url("http://nginx/?v=1"), "{origin}/");
        assert_eq!(normalize_avatar_url("//cdn.example.com/"), "{origin}/");
        assert_eq!(normalize_avatar_url("http://nginx?v=1"), "");
        assert_eq!(normalize_avatar_url("//cdn.example.com"), "");
    }

    #[test]
    fn test_absolute_url_path_stays_percent_encoded() {
        assert_eq!(
            normalize_avatar_url("http://nginx/a%20b.png"),
            "{origin}/a%20b.png"
        );
    }

    #[test]
    fn test_has_explicit_path() {
        assert!(has_explicit_path("http://nginx/"));
        assert!(has_explicit_path("//nginx/a"));
        assert!(!has_explicit_path("http://nginx"));
        assert!(!has_explicit_path("http://nginx#/x"));
    }

    #[test]
    fn test_relative_path_is_kept() {
        assert_eq!(
            normalize_avatar_url("images/avatar/default.png"),
            "images/avatar/default.png"
        );
    }
}
