//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Default listen port for the agency API service
pub const DEFAULT_PORT: u16 = 5870;

/// Environment variable overriding the root folder
pub const ROOT_ENV_VAR: &str = "AGENCY_ROOT";

/// Database file name under the root folder
pub const DATABASE_FILE: &str = "agency.db";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Resolve the listen port: environment variable `AGENCY_PORT` or the default
pub fn resolve_port() -> u16 {
    std::env::var("AGENCY_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Database file path under the given root folder
pub fn database_path(root_folder: &std::path::Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Locate the platform configuration file
fn locate_config_file() -> Result<PathBuf> {
    // ~/.config/agency/config.toml first, then /etc/agency/config.toml on linux
    let user_config = dirs::config_dir().map(|d| d.join("agency").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/agency/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("agency"))
        .unwrap_or_else(|| PathBuf::from("./agency_data"))
}
