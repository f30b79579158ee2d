use std::collections::BTreeSet;

use serde::Deserialize;

use crate::config::Config;
use crate::owner::Owner;

/// Change status reported by the compare API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Other,
}

/// One file changed between the base and head commits of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
}

/// Collect every owner claiming any of the changed files.
///
/// Matching is inclusive-OR across rules and files: a file may be claimed by
/// several rules, and an owner reached through several rules still appears
/// once. Resolution never fails; inputs that match nothing yield an empty
/// set.
pub fn resolve_owners(config: &Config, changed_files: &[ChangedFile]) -> BTreeSet<Owner> {
    let mut owners = BTreeSet::new();

    for file in changed_files {
        for (pattern, raw_owners) in &config.components {
            if matches_component(&file.path, pattern) {
                owners.extend(raw_owners.0.iter().filter_map(|raw| Owner::parse(raw)));
            }
        }
    }

    owners
}

/// Whether a component pattern claims a file path.
///
/// `/` claims every file. `*.ext` claims paths ending in `.ext`. Anything
/// else is a segment-boundary prefix match: `src` claims `src/app.py` but
/// not `srcutils/app.py`.
pub fn matches_component(path: &str, pattern: &str) -> bool {
    if pattern == "/" {
        return true;
    }

    let pattern = pattern.strip_prefix('/').unwrap_or(pattern);
    let pattern = pattern.strip_suffix('/').unwrap_or(pattern);

    if pattern.starts_with("*.") {
        // Everything from the dot onward must close out the path.
        return path.ends_with(&pattern[1..]);
    }

    let mut path_segments = path.split('/');
    pattern
        .split('/')
        .all(|segment| path_segments.next() == Some(segment))
}
