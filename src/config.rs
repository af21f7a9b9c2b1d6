//! Configuration: TOML files, environment and command-line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MenuboardError;
use crate::paging::TriggerConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_BASE_URL: &str = "MENUBOARD_BASE_URL";
pub const ENV_TOKEN: &str = "MENUBOARD_TOKEN";
pub const ENV_SESSION_ID: &str = "MENUBOARD_SESSION_ID";

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api: Option<ApiConfig>,
    pub paging: Option<PagingConfig>,
    pub session: Option<SessionConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub token_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagingConfig {
    pub page_size: Option<u32>,
    pub margin_rows: Option<usize>,
    pub cooldown_ms: Option<u64>,
    pub ux_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub dir: Option<PathBuf>,
}

/// Platform config directory path: `<config_dir>/menuboard/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("menuboard").join("config.toml"))
}

/// Default log file: `<cache_dir>/menuboard/menuboard.log`.
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("menuboard")
        .join("menuboard.log")
}

fn default_session_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("menuboard")
        .join("sessions")
}

/// Load config by cascading CWD `.menuboard.toml` over platform config.
///
/// An explicit path replaces the cascade and must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<ConfigFile, MenuboardError> {
    if let Some(path) = explicit {
        return load_from_path(path)?.ok_or_else(|| {
            MenuboardError::Config(format!("config file not found: {}", path.display()))
        });
    }

    let platform = match config_path() {
        Some(path) => load_from_path(&path)?,
        None => None,
    };
    let cwd = load_from_path(Path::new(".menuboard.toml"))?;

    Ok(match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    })
}

/// Parse a config file. A missing file is `None`, a malformed one an error.
fn load_from_path(path: &Path) -> Result<Option<ConfigFile>, MenuboardError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let config = toml::from_str(&content)
        .map_err(|e| MenuboardError::Config(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(Some(config))
}

/// Merge two configs: `overlay` values take precedence over `base`.
fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_api = base.api.unwrap_or_default();
    let over_api = overlay.api.unwrap_or_default();
    let base_paging = base.paging.unwrap_or_default();
    let over_paging = overlay.paging.unwrap_or_default();
    let base_session = base.session.unwrap_or_default();
    let over_session = overlay.session.unwrap_or_default();

    ConfigFile {
        api: Some(ApiConfig {
            base_url: over_api.base_url.or(base_api.base_url),
            token_file: over_api.token_file.or(base_api.token_file),
            timeout_secs: over_api.timeout_secs.or(base_api.timeout_secs),
        }),
        paging: Some(PagingConfig {
            page_size: over_paging.page_size.or(base_paging.page_size),
            margin_rows: over_paging.margin_rows.or(base_paging.margin_rows),
            cooldown_ms: over_paging.cooldown_ms.or(base_paging.cooldown_ms),
            ux_delay_ms: over_paging.ux_delay_ms.or(base_paging.ux_delay_ms),
        }),
        session: Some(SessionConfig {
            dir: over_session.dir.or(base_session.dir),
        }),
    }
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub token_file: Option<PathBuf>,
    pub page_size: Option<u32>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub timeout: Duration,
    pub page_size: u32,
    pub trigger: TriggerConfig,
    pub session_dir: PathBuf,
}

impl Settings {
    /// Resolve with precedence CLI > environment > config file > defaults.
    pub fn resolve<F>(
        cli: Overrides,
        env: F,
        file: ConfigFile,
    ) -> Result<Self, MenuboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_var = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let api = file.api.unwrap_or_default();
        let paging = file.paging.unwrap_or_default();
        let session = file.session.unwrap_or_default();

        let base_url = cli
            .base_url
            .or_else(|| env_var(ENV_BASE_URL))
            .or(api.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let page_size = cli
            .page_size
            .or(paging.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(MenuboardError::Config(
                "page size must be at least 1".to_string(),
            ));
        }

        let defaults = TriggerConfig::default();
        let trigger = TriggerConfig {
            margin_rows: paging.margin_rows.unwrap_or(defaults.margin_rows),
            cooldown: paging
                .cooldown_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.cooldown),
            ux_delay: paging
                .ux_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.ux_delay),
        };

        Ok(Self {
            base_url,
            token: env_var(ENV_TOKEN),
            token_file: cli.token_file.or(api.token_file),
            timeout: api
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            page_size,
            trigger,
            session_dir: session.dir.unwrap_or_else(default_session_dir),
        })
    }
}
