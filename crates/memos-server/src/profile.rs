//! Resolved instance profile.
//!
//! [`ProfileSettings`] is what the operator wrote; [`Profile`] is what the
//! server runs with: the mode is one of the known modes, the data directory
//! is absolute and exists, the sqlite DSN is filled in and the base path is
//! normalized.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::config::{ConfigLoadError, ProfileSettings};

/// Run mode of the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Prod,
    Dev,
    Demo,
}

impl Mode {
    /// Parses a mode name. Unknown names run as [`Mode::Demo`].
    pub fn parse(mode: &str) -> Self {
        match mode {
            "prod" => Mode::Prod,
            "dev" => Mode::Dev,
            _ => Mode::Demo,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Prod => "prod",
            Mode::Dev => "dev",
            Mode::Demo => "demo",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The configuration the server starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub mode: Mode,
    pub addr: String,
    pub port: u16,
    /// Unix socket path; overrides `addr` and `port`.
    pub unix_sock: Option<String>,
    /// Absolute, existing data directory.
    pub data: PathBuf,
    pub dsn: String,
    pub driver: String,
    pub version: String,
    pub instance_url: String,
    /// Normalized URL path prefix, empty when serving at the root.
    pub base_path: String,
}

impl Profile {
    /// Resolves settings against the directory of the running executable.
    pub fn resolve(settings: &ProfileSettings) -> Result<Self, ConfigLoadError> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::resolve_from(settings, &exe_dir)
    }

    /// Resolves settings, treating a relative data directory as relative to
    /// `base_dir`.
    pub fn resolve_from(
        settings: &ProfileSettings,
        base_dir: &Path,
    ) -> Result<Self, ConfigLoadError> {
        let mode = Mode::parse(&settings.mode);

        let mut data = PathBuf::from(&settings.data);
        if mode == Mode::Prod && settings.data.is_empty() {
            data = default_prod_data_dir()?;
        }
        let data = check_data_dir(&data, base_dir).inspect_err(|err| {
            error!(data = %settings.data, error = %err, "failed to check data dir");
        })?;

        let mut dsn = settings.dsn.clone();
        if settings.driver == "sqlite" && dsn.is_empty() {
            dsn = data
                .join(format!("memos_{}.db", mode))
                .display()
                .to_string();
        }

        let profile = Self {
            mode,
            addr: settings.addr.clone(),
            port: settings.port,
            unix_sock: Some(settings.unix_sock.trim().to_string()).filter(|s| !s.is_empty()),
            data,
            dsn,
            driver: settings.driver.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instance_url: settings.instance_url.clone(),
            base_path: normalize_base_path(&settings.base_path),
        };
        debug!(mode = %profile.mode, data = %profile.data.display(), "resolved profile");
        Ok(profile)
    }

    /// Everything except production counts as development.
    pub fn is_dev(&self) -> bool {
        self.mode != Mode::Prod
    }
}

/// Normalizes a URL path prefix: trimmed, `""` for the root, a leading `/`
/// and no trailing `/`.
pub fn normalize_base_path(base_path: &str) -> String {
    let base_path = base_path.trim();
    if base_path.is_empty() || base_path == "/" {
        return String::new();
    }
    let prefixed = if base_path.starts_with('/') {
        base_path.to_string()
    } else {
        format!("/{}", base_path)
    };
    prefixed.trim_end_matches('/').to_string()
}

#[cfg(windows)]
fn default_prod_data_dir() -> Result<PathBuf, ConfigLoadError> {
    let program_data = std::env::var("ProgramData").unwrap_or_default();
    let dir = PathBuf::from(program_data).join("memos");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|source| ConfigLoadError::DataDir {
            path: dir.display().to_string(),
            source,
        })?;
    }
    Ok(dir)
}

#[cfg(not(windows))]
fn default_prod_data_dir() -> Result<PathBuf, ConfigLoadError> {
    Ok(PathBuf::from("/var/opt/memos"))
}

/// Makes `data` absolute (relative to `base_dir`), trims trailing
/// separators and checks that it exists.
fn check_data_dir(data: &Path, base_dir: &Path) -> Result<PathBuf, ConfigLoadError> {
    let absolute = if data.is_absolute() {
        data.to_path_buf()
    } else {
        let joined = base_dir.join(data);
        std::path::absolute(&joined).map_err(|source| ConfigLoadError::DataDir {
            path: joined.display().to_string(),
            source,
        })?
    };

    let display = absolute.display().to_string();
    let trimmed = display.trim_end_matches(['/', '\\']);
    let dir = if trimmed.is_empty() {
        absolute
    } else {
        PathBuf::from(trimmed)
    };

    std::fs::metadata(&dir).map_err(|source| ConfigLoadError::DataDir {
        path: dir.display().to_string(),
        source,
    })?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(mode: &str, data: &str) -> ProfileSettings {
        ProfileSettings {
            mode: mode.to_string(),
            data: data.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_mode_runs_as_demo() {
        assert_eq!(Mode::parse("prod"), Mode::Prod);
        assert_eq!(Mode::parse("dev"), Mode::Dev);
        assert_eq!(Mode::parse("demo"), Mode::Demo);
        assert_eq!(Mode::parse("staging"), Mode::Demo);
        assert_eq!(Mode::parse(""), Mode::Demo);
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path(""), "");
        assert_eq!(normalize_base_path("   "), "");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path("memos"), "/memos");
        assert_eq!(normalize_base_path(" /memos/ "), "/memos");
        assert_eq!(normalize_base_path("/a/b//"), "/a/b");
    }

    #[test]
    fn test_resolve_fills_sqlite_dsn_and_base_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings("dev", dir.path().to_str().unwrap());
        settings.base_path = "memos/".to_string();

        let profile = Profile::resolve_from(&settings, Path::new("/unused")).unwrap();

        assert_eq!(profile.mode, Mode::Dev);
        assert!(profile.is_dev());
        assert_eq!(profile.data, dir.path());
        assert_eq!(
            profile.dsn,
            dir.path().join("memos_dev.db").display().to_string()
        );
        assert_eq!(profile.base_path, "/memos");
        assert!(profile.unix_sock.is_none());
    }

    #[test]
    fn test_resolve_keeps_explicit_dsn() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings("prod", dir.path().to_str().unwrap());
        settings.driver = "mysql".to_string();
        settings.dsn = "root@tcp(localhost)/memos".to_string();

        let profile = Profile::resolve_from(&settings, Path::new("/unused")).unwrap();

        assert!(!profile.is_dev());
        assert_eq!(profile.dsn, "root@tcp(localhost)/memos");
    }

    #[test]
    fn test_relative_data_dir_resolves_against_base_dir() {
        let base = tempfile::tempdir().unwrap();
        std::fs::create_dir(base.path().join("data")).unwrap();

        let profile =
            Profile::resolve_from(&settings("demo", "data/"), base.path()).unwrap();

        assert!(profile.data.is_absolute());
        assert_eq!(profile.data, base.path().join("data"));
    }

    #[test]
    fn test_trailing_separators_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let with_slashes = format!("{}//", dir.path().display());

        let profile =
            Profile::resolve_from(&settings("dev", &with_slashes), Path::new("/unused")).unwrap();

        assert_eq!(profile.data, dir.path());
    }

    #[test]
    fn test_missing_data_dir_is_an_error() {
        let base = tempfile::tempdir().unwrap();

        let err = Profile::resolve_from(&settings("dev", "missing"), base.path()).unwrap_err();

        assert!(matches!(err, ConfigLoadError::DataDir { .. }));
        assert!(err.to_string().contains("unable to access data folder"));
    }

    #[test]
    fn test_unknown_mode_names_demo_database() {
        let dir = tempfile::tempdir().unwrap();

        let profile = Profile::resolve_from(
            &settings("staging", dir.path().to_str().unwrap()),
            Path::new("/unused"),
        )
        .unwrap();

        assert_eq!(profile.mode, Mode::Demo);
        assert!(profile.dsn.ends_with("memos_demo.db"));
    }
}
