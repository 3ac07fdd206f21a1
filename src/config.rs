use std::path::PathBuf;

use crate::error::ConfigError;

/// Environment variable holding the database location
pub const DATABASE_ENV: &str = "DB_URL";

/// Resolve the database location from the `--database` / `DB_URL` value.
///
/// Accepts a plain path or a `sqlite://` / `sqlite:` URL.
pub fn resolve_database(value: Option<&str>) -> Result<PathBuf, ConfigError> {
    let raw = value.map(str::trim).unwrap_or_default();
    let path = raw
        .strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(raw);

    if path.is_empty() {
        return Err(ConfigError::MissingDatabase);
    }

    let path = PathBuf::from(path);
    if path.is_dir() {
        return Err(ConfigError::InvalidDatabase(raw.to_string()));
    }

    Ok(path)
}
