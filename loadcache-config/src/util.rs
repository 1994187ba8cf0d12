//! Env value parsing helpers.

use crate::error::ConfigError;

/// Parse an env-style unsigned integer, allowing `_` separators.
pub fn parse_usize(raw: &str) -> Option<usize> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Read `name` through `lookup` and parse it as a `usize`.
///
/// Unset or blank values yield `Ok(None)`; anything else that does not parse
/// is an error rather than being silently ignored.
pub fn parse_usize_var<F>(
    lookup: &F,
    name: &str,
) -> Result<Option<usize>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_usize(&raw).map(Some).ok_or_else(|| {
            ConfigError::InvalidEnv {
                name: name.to_string(),
                value: raw,
            }
        }),
        None => Ok(None),
    }
}
