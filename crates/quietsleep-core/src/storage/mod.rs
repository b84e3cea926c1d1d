mod config;

pub use config::{AudioConfig, Config, Preferences};

use std::path::PathBuf;

/// Returns `~/.config/quietsleep[-dev]/` based on QUIETSLEEP_ENV.
///
/// Set QUIETSLEEP_ENV=dev to use the development directory, or
/// QUIETSLEEP_CONFIG_DIR to use an explicit one.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("QUIETSLEEP_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("QUIETSLEEP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("quietsleep-dev")
            } else {
                base_dir.join("quietsleep")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
