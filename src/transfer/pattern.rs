// ABOUTME: Glob expansion over any FileSystem, one path component at a time.
// ABOUTME: Used for remote sources, where no native glob is available.

use super::error::TransferError;
use super::fs::FileSystem;
use glob::Pattern;
use std::path::{Path, PathBuf};

/// True if `component` contains glob metacharacters.
pub fn has_magic(component: &str) -> bool {
    component.contains(['*', '?', '['])
}

/// Expand `pattern` against `fs`.
///
/// Literal components, and wildcard components that fail to parse as a
/// pattern, are appended as-is; the rest are matched against directory
/// listings. Directories that cannot be listed contribute
/// no matches. Every surviving candidate must exist.
pub async fn expand_glob<F>(fs: &F, pattern: &str) -> Result<Vec<PathBuf>, TransferError>
where
    F: FileSystem + ?Sized,
{
    let mut candidates = vec![if pattern.starts_with('/') {
        PathBuf::from("/")
    } else {
        PathBuf::new()
    }];

    for component in pattern.split('/').filter(|c| !c.is_empty()) {
        // An unparseable component such as `[old` names a literal entry
        let matcher = has_magic(component)
            .then(|| Pattern::new(component).ok())
            .flatten();
        let Some(matcher) = matcher else {
            for candidate in &mut candidates {
                candidate.push(component);
            }
            continue;
        };

        let mut next = Vec::new();
        for dir in &candidates {
            let listing = if dir.as_os_str().is_empty() {
                Path::new(".")
            } else {
                dir.as_path()
            };
            let Ok(entries) = fs.read_dir(listing).await else {
                continue;
            };
            let mut names: Vec<String> = entries
                .into_iter()
                .map(|entry| entry.name)
                .filter(|name| matcher.matches(name))
                .collect();
            names.sort();
            next.extend(names.into_iter().map(|name| dir.join(name)));
        }

        candidates = next;
        if candidates.is_empty() {
            break;
        }
    }

    let mut matches = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.as_os_str().is_empty() {
            continue;
        }
        if fs.stat(&candidate).await.is_ok() {
            matches.push(candidate);
        }
    }
    Ok(matches)
}
