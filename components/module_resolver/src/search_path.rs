//! Search-path patterns and candidate lookup

use crate::error::{candidate_escape, module_not_found, path_escape};
use core_types::LuaError;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Patterns used when nothing else is configured
pub const DEFAULT_LUA_PATH: &str = "?;?.lua";

/// Environment variable overriding [`DEFAULT_LUA_PATH`]
pub const LUA_PATH_ENV: &str = "PICO8_LUA_PATH";

/// Split a `;`-delimited pattern list, dropping empty entries
pub fn parse_search_path(patterns: &str) -> Vec<String> {
    patterns
        .split(';')
        .filter(|pattern| !pattern.is_empty())
        .map(str::to_string)
        .collect()
}

/// The pattern list from [`LUA_PATH_ENV`], or the default
pub fn search_path_from_env() -> Vec<String> {
    match std::env::var(LUA_PATH_ENV) {
        Ok(value) if !value.is_empty() => parse_search_path(&value),
        _ => parse_search_path(DEFAULT_LUA_PATH),
    }
}

/// Reject require strings that are absolute or step through `.` or `..`
pub fn check_require_path(require_path: &str) -> Result<(), LuaError> {
    let absolute = require_path.starts_with('/')
        || require_path.starts_with('\\')
        || Path::new(require_path).is_absolute();
    let relative_step = require_path
        .split(['/', '\\'])
        .any(|part| part == "." || part == "..");
    if absolute || relative_step {
        return Err(path_escape(require_path));
    }
    Ok(())
}

/// Lexically normalize a path, resolving `.` and `..` without touching the
/// filesystem. Leading `..` of a relative path are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Directory containing `file`
pub fn parent_dir(file: &Path) -> PathBuf {
    file.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Whether a normalized candidate lies outside the normalized `base`.
/// An empty base stands for the working directory, so a leading `..`
/// escapes it.
pub fn escapes(candidate: &Path, base: &Path) -> bool {
    match candidate.strip_prefix(base) {
        Ok(rest) => matches!(rest.components().next(), Some(Component::ParentDir)),
        Err(_) => true,
    }
}

/// Candidate paths for `require_path` in pattern order
pub fn candidates(require_path: &str, search_path: &[String], calling_dir: &Path) -> Vec<PathBuf> {
    search_path
        .iter()
        .map(|pattern| {
            let candidate = PathBuf::from(pattern.replace('?', require_path));
            if candidate.is_absolute() {
                candidate
            } else {
                normalize(&calling_dir.join(candidate))
            }
        })
        .collect()
}

/// Find the first existing candidate for a require call made from
/// `calling_file`.
///
/// Relative candidates must stay inside `base`; an existing candidate that
/// does not is a `PathEscape` error. Missing escaping candidates are skipped.
pub fn locate(
    require_path: &str,
    search_path: &[String],
    calling_file: &Path,
    base: &Path,
) -> Result<PathBuf, LuaError> {
    check_require_path(require_path)?;
    let base = normalize(base);
    for (pattern, candidate) in search_path
        .iter()
        .zip(candidates(require_path, search_path, &parent_dir(calling_file)))
    {
        if !candidate.is_file() {
            continue;
        }
        let absolute_pattern = Path::new(pattern).is_absolute();
        if !absolute_pattern && escapes(&candidate, &base) {
            return Err(candidate_escape(&candidate));
        }
        debug!(module = %require_path, path = %candidate.display(), "located module");
        return Ok(candidate);
    }
    Err(module_not_found(require_path, search_path))
}
