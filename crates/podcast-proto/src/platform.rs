use std::path::PathBuf;

/// Directory name used under the per-user config/data/cache roots.
const APP_DIR: &str = "podcast-player";

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/podcast-player/ (XDG standard)
    // instead of macOS Application Support for consistency
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn temp_dir() -> PathBuf {
    std::env::temp_dir()
}

pub fn cache_dir() -> PathBuf {
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| temp_dir())
            .join(".cache")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        dirs::cache_dir()
            .unwrap_or_else(|| temp_dir())
            .join(APP_DIR)
    }
}

/// Directory holding the executable, if it can be resolved.
pub fn exe_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(|p| p.to_path_buf())
}

#[cfg(unix)]
pub fn mpv_binary_name() -> &'static str {
    "mpv"
}

#[cfg(windows)]
pub fn mpv_binary_name() -> &'static str {
    "mpv.exe"
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var("PATH").ok()?;
    #[cfg(unix)]
    let sep = ":";
    #[cfg(windows)]
    let sep = ";";
    path.split(sep)
        .map(|dir| PathBuf::from(dir).join(name))
        .find(|p| p.exists())
}

/// Find mpv binary for playback.
///
/// Searches in order:
/// 1. `configured` (the `mpv_path` config key), if it exists
/// 2. Beside the current executable
/// 3. PATH
pub fn find_mpv_binary(configured: Option<&std::path::Path>) -> Option<PathBuf> {
    if let Some(p) = configured {
        if p.exists() {
            return Some(p.to_path_buf());
        }
    }

    let exe_name = mpv_binary_name();
    if let Some(dir) = exe_dir() {
        let local_mpv = dir.join(exe_name);
        if local_mpv.exists() {
            return Some(local_mpv);
        }
    }

    find_on_path(exe_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_are_app_scoped() {
        assert!(config_dir().ends_with(APP_DIR));
        assert!(data_dir().ends_with(APP_DIR));
        assert!(cache_dir().ends_with(APP_DIR));
    }

    #[test]
    fn test_configured_mpv_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("my-mpv");
        std::fs::write(&fake, b"").unwrap();
        assert_eq!(find_mpv_binary(Some(&fake)), Some(fake));
    }
}
