//! XDG Base Directory paths for yantra.
//!
//! Config and user plugin locations follow XDG on every platform, the same
//! way tools like gh and kubectl lay out their files.

use std::path::PathBuf;

/// Name of the config file inside a config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Get the yantra config directory.
///
/// Returns `$XDG_CONFIG_HOME/yantra` if set, otherwise `~/.config/yantra`.
///
/// # Examples
///
/// ```
/// use yantra_paths::config_dir;
///
/// let config = config_dir();
/// let user_config = config.join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("yantra")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/yantra")
    } else {
        PathBuf::from(".config/yantra")
    }
}

/// Path of the user-level config file
pub fn user_config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Root under which user-installed plugin directories live.
///
/// Plugin types declared without a path default to `plugins_dir()/<type name>`.
pub fn plugins_dir() -> PathBuf {
    config_dir().join("plugins")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_dir_ends_with_yantra() {
        let path = config_dir();
        assert!(
            path.ends_with("yantra"),
            "config_dir should end with 'yantra'"
        );
    }

    #[test]
    #[serial]
    fn test_config_dir_respects_xdg_env() {
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", "/tmp/test-config");
        }
        assert_eq!(config_dir(), PathBuf::from("/tmp/test-config/yantra"));
        assert_eq!(
            user_config_file(),
            PathBuf::from("/tmp/test-config/yantra/config.toml")
        );
        assert_eq!(
            plugins_dir(),
            PathBuf::from("/tmp/test-config/yantra/plugins")
        );
        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
    }
}
