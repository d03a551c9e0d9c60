//! Archive entry directory resolution
//!
//! Every entry in a module zip is prefixed with `{module}@{version}/`. These
//! helpers strip that prefix and place an entry relative to the requested
//! subpackage.

use std::path::Path;

/// Directory of an archive entry relative to the module root (`"."` for root files)
pub fn archive_dir(entry: &str) -> String {
    let after_version = match entry.find('@') {
        Some(idx) => &entry[idx..],
        None => entry,
    };
    let relative = match after_version.find('/') {
        Some(idx) => &after_version[idx + 1..],
        None => after_version,
    };
    parent_dir(relative)
}

/// Parent directory of a slash separated path, `"."` when there is none
pub fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
        None => ".".to_string(),
    }
}

/// Base name of a slash separated path
pub fn base_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// Directory of `entry` relative to `subpackage`, and whether the entry is
/// inside the subpackage at all.
///
/// An empty subpackage accepts every entry so all subdirectories of the
/// module root can be discovered. Otherwise the entry must live at or below
/// `subpackage`; `"."` means the subpackage directory itself.
pub fn relative_dir(entry: &str, subpackage: &str) -> (String, bool) {
    let dir = archive_dir(entry);
    if subpackage.is_empty() {
        return (dir, true);
    }
    if !format!("{}/", dir).starts_with(&format!("{}/", subpackage)) {
        return (dir, false);
    }
    if dir == subpackage {
        return (".".to_string(), true);
    }
    let nested = dir[subpackage.len() + 1..].to_string();
    (nested, true)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
