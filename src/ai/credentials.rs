//! API key resolution.
//!
//! The key comes from the `ANTHROPIC_API_KEY` environment variable when
//! set, otherwise from a well-known key file (`~/.anthropic/key`,
//! overridable via `GIT_SCRIBE_KEY_FILE`).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::ScribeError;

/// Environment variable holding the key directly.
const KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Environment variable overriding the key file location.
const KEY_FILE_ENV: &str = "GIT_SCRIBE_KEY_FILE";

/// Resolves the API key, failing with [`ScribeError::AuthFailure`] when no
/// usable key can be found.
pub fn load_api_key() -> Result<String> {
    if let Ok(key) = env::var(KEY_ENV) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            return Ok(key);
        }
    }

    let path = key_file_path()?;
    load_from_path(&path)
}

/// Reads and validates a key file.
pub fn load_from_path(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| {
        ScribeError::AuthFailure(format!(
            "cannot read API key file {}: {e}. Set {KEY_ENV} or create the file",
            path.display()
        ))
    })?;

    let key = content.trim().to_string();
    if key.is_empty() {
        return Err(
            ScribeError::AuthFailure(format!("API key file {} is empty", path.display())).into(),
        );
    }

    Ok(key)
}

/// Location of the key file.
fn key_file_path() -> Result<PathBuf> {
    if let Ok(override_path) = env::var(KEY_FILE_ENV) {
        return Ok(PathBuf::from(override_path));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| ScribeError::AuthFailure("could not find home directory".to_string()))?;
    Ok(home.join(".anthropic").join("key"))
}
