//! Configuration file support.
//!
//! The file is plain `key value` lines:
//!
//! ```text
//! # comment
//! api_base_url   https://api.example.com
//! api_version    v1
//! stg_base_url   https://api-stg.example.com
//! ```
//!
//! `parse_config_str` / `config_to_map` produce the raw key map and never
//! fail; `Config::from_map` turns that map into typed settings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error};

use super::catalog::{ApiVersion, Environment, UnknownVariant};
use super::platform;

pub const CONFIG_FILE_NAME: &str = "podcast_player.conf";
/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "PODCAST_PLAYER_CONF";

const DEFAULT_PREFETCH_WORKERS: usize = 4;
const MAX_PREFETCH_WORKERS: usize = 16;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config has no base url (set api_base_url or one of prod_base_url/stg_base_url/dev_base_url)")]
    MissingBaseUrl,
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariant),
}

/// Parse config text into a key → value map.
///
/// Blank lines, `#` comments and lines with no whitespace delimiter are
/// skipped. The value is everything after the first whitespace run, trimmed.
pub fn parse_config_str(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (lineno, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(char::is_whitespace) else {
            debug!("config: skipping malformed line {}: {:?}", lineno + 1, line);
            continue;
        };
        map.insert(key.trim().to_string(), value.trim().to_string());
    }
    map
}

/// Read and parse a config file. Any failure yields an empty map.
pub fn config_to_map(path: &Path) -> HashMap<String, String> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config_str(&content),
        Err(e) => {
            error!("Unable to read from configurations file {}: {}", path.display(), e);
            HashMap::new()
        }
    }
}

/// 24-bit colour from a `RRGGBB` config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self(byte(0)?, byte(2)?, byte(4)?))
    }
}

/// Base URL per environment. Empty means "use `api_base_url`".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseUrls {
    pub development: String,
    pub staging: String,
    pub production: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub api_version: ApiVersion,
    pub environment: Environment,
    pub base_urls: BaseUrls,
    pub v2_auth_token: Option<String>,
    pub logo: Option<String>,
    pub bg_color: Option<Rgb>,
    pub fg_color: Option<Rgb>,
    pub prefetch_workers: usize,
    pub request_timeout: Duration,
    pub mpv_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            api_version: ApiVersion::default(),
            environment: Environment::default(),
            base_urls: BaseUrls::default(),
            v2_auth_token: None,
            logo: None,
            bg_color: None,
            fg_color: None,
            prefetch_workers: DEFAULT_PREFETCH_WORKERS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            mpv_path: None,
        }
    }
}

fn non_empty(map: &HashMap<String, String>, key: &str) -> Option<String> {
    map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

fn parse_color(map: &HashMap<String, String>, key: &'static str) -> Result<Option<Rgb>, ConfigError> {
    match non_empty(map, key) {
        None => Ok(None),
        Some(v) => Rgb::parse_hex(&v).map(Some).ok_or(ConfigError::InvalidValue {
            key,
            value: v,
            reason: "expected six hex digits".to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(
    map: &HashMap<String, String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match non_empty(map, key) {
        None => Ok(None),
        Some(v) => v.parse::<T>().map(Some).map_err(|e| ConfigError::InvalidValue {
            key,
            value: v.clone(),
            reason: e.to_string(),
        }),
    }
}

fn strip_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

impl Config {
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_version = match non_empty(map, "api_version") {
            Some(v) => v.parse()?,
            None => defaults.api_version,
        };
        let environment = match non_empty(map, "environment") {
            Some(v) => v.parse()?,
            None => defaults.environment,
        };

        let base_urls = BaseUrls {
            development: non_empty(map, "dev_base_url").map(strip_trailing_slash).unwrap_or_default(),
            staging: non_empty(map, "stg_base_url").map(strip_trailing_slash).unwrap_or_default(),
            production: non_empty(map, "prod_base_url").map(strip_trailing_slash).unwrap_or_default(),
        };
        let api_base_url = non_empty(map, "api_base_url")
            .map(strip_trailing_slash)
            .unwrap_or_default();

        if api_base_url.is_empty()
            && base_urls.development.is_empty()
            && base_urls.staging.is_empty()
            && base_urls.production.is_empty()
        {
            return Err(ConfigError::MissingBaseUrl);
        }

        let prefetch_workers = parse_number::<usize>(map, "prefetch_workers")?
            .unwrap_or(defaults.prefetch_workers)
            .clamp(1, MAX_PREFETCH_WORKERS);
        let request_timeout = parse_number::<u64>(map, "request_timeout_secs")?
            .map(|s| Duration::from_secs(s.max(1)))
            .unwrap_or(defaults.request_timeout);

        Ok(Self {
            api_base_url,
            api_version,
            environment,
            base_urls,
            v2_auth_token: non_empty(map, "v2_api_auth_token"),
            logo: non_empty(map, "logo"),
            bg_color: parse_color(map, "bg_color")?,
            fg_color: parse_color(map, "fg_color")?,
            prefetch_workers,
            request_timeout,
            mpv_path: non_empty(map, "mpv_path").map(PathBuf::from),
        })
    }

    /// Read, parse and validate the config at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_map(&parse_config_str(&content))
    }

    /// Base URL for `env`, falling back to `api_base_url` when unset.
    pub fn base_url_for(&self, env: Environment) -> &str {
        let specific = match env {
            Environment::Development => &self.base_urls.development,
            Environment::Staging => &self.base_urls.staging,
            Environment::Production => &self.base_urls.production,
        };
        if specific.is_empty() {
            &self.api_base_url
        } else {
            specific
        }
    }

    /// Config file location: `$PODCAST_PLAYER_CONF`, then
    /// `config/podcast_player.conf` beside the executable, then the user
    /// config dir.
    pub fn config_path() -> PathBuf {
        if let Ok(p) = std::env::var(CONFIG_ENV_VAR) {
            if !p.trim().is_empty() {
                return PathBuf::from(p);
            }
        }
        if let Some(dir) = platform::exe_dir() {
            let bundled = dir.join("config").join(CONFIG_FILE_NAME);
            if bundled.exists() {
                return bundled;
            }
        }
        platform::config_dir().join(CONFIG_FILE_NAME)
    }

    /// Human-readable `(key, value)` rows for the help overlay. The auth
    /// token is never shown.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let or_fallback = |s: &str| {
            if s.is_empty() {
                format!("(api_base_url) {}", self.api_base_url)
            } else {
                s.to_string()
            }
        };
        vec![
            ("api_base_url", self.api_base_url.clone()),
            ("api_version", self.api_version.to_string()),
            ("environment", self.environment.to_string()),
            ("dev_base_url", or_fallback(&self.base_urls.development)),
            ("stg_base_url", or_fallback(&self.base_urls.staging)),
            ("prod_base_url", or_fallback(&self.base_urls.production)),
            (
                "v2_api_auth_token",
                if self.v2_auth_token.is_some() { "set" } else { "unset" }.to_string(),
            ),
            ("logo", self.logo.clone().unwrap_or_default()),
            ("prefetch_workers", self.prefetch_workers.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Podcast player configuration
api_base_url       http://example/api
api_version        v1

prod_base_url      https://api.example.com/
stg_base_url       https://api-stg.example.com
dev_base_url       https://api-dev.example.com
v2_api_auth_token  Bearer abc def
logo               radio_logo.png
bg_color           1F055E
fg_color           #FFFFFF
this_line_is_malformed
";

    #[test]
    fn test_parse_recognises_all_keys() {
        let map = parse_config_str(SAMPLE);
        for key in [
            "api_base_url",
            "api_version",
            "prod_base_url",
            "stg_base_url",
            "dev_base_url",
            "v2_api_auth_token",
            "logo",
            "bg_color",
            "fg_color",
        ] {
            assert!(map.contains_key(key), "missing {}", key);
        }
        assert_eq!(map["bg_color"], "1F055E");
        // Value keeps internal whitespace.
        assert_eq!(map["v2_api_auth_token"], "Bearer abc def");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let map = parse_config_str(SAMPLE);
        assert!(!map.contains_key("this_line_is_malformed"));
        assert_eq!(map.len(), 9);
    }

    #[test]
    fn test_missing_file_is_empty_map() {
        let map = config_to_map(Path::new("/definitely/not/here/podcast_player.conf"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_tab_delimited_and_last_wins() {
        let map = parse_config_str("logo\ta.png\nlogo b.png\n   # indented comment\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["logo"], "b.png");
    }

    #[test]
    fn test_typed_config() {
        let config = Config::from_map(&parse_config_str(SAMPLE)).unwrap();
        assert_eq!(config.api_version, ApiVersion::V1);
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.base_url_for(Environment::Production), "https://api.example.com");
        assert_eq!(config.bg_color, Some(Rgb(0x1F, 0x05, 0x5E)));
        assert_eq!(config.fg_color, Some(Rgb(255, 255, 255)));
        assert_eq!(config.v2_auth_token.as_deref(), Some("Bearer abc def"));
        assert_eq!(config.prefetch_workers, DEFAULT_PREFETCH_WORKERS);
    }

    #[test]
    fn test_base_url_falls_back_to_api_base_url() {
        let config = Config::from_map(&parse_config_str("api_base_url http://example/api/\n")).unwrap();
        assert_eq!(config.base_url_for(Environment::Development), "http://example/api");
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_map(&parse_config_str("api_base_url x\napi_version v9\n")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownVariant(_)));

        let err = Config::from_map(&parse_config_str("api_base_url x\nbg_color purple\n")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "bg_color", .. }));

        let err = Config::from_map(&HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBaseUrl));
    }

    #[test]
    fn test_prefetch_workers_clamped() {
        let config =
            Config::from_map(&parse_config_str("api_base_url x\nprefetch_workers 500\n")).unwrap();
        assert_eq!(config.prefetch_workers, MAX_PREFETCH_WORKERS);
        let config =
            Config::from_map(&parse_config_str("api_base_url x\nprefetch_workers 0\n")).unwrap();
        assert_eq!(config.prefetch_workers, 1);
    }

    #[test]
    fn test_load_unreadable() {
        let err = Config::load(Path::new("/nope/podcast_player.conf")).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn test_summary_hides_token() {
        let config = Config::from_map(&parse_config_str(SAMPLE)).unwrap();
        let summary = config.summary();
        let token_row = summary.iter().find(|(k, _)| *k == "v2_api_auth_token").unwrap();
        assert_eq!(token_row.1, "set");
        assert!(summary.iter().all(|(_, v)| !v.contains("abc")));
    }
}
