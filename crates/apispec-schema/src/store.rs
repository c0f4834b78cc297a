//! # Fragment Store
//!
//! Fragments live next to the views of the action they describe:
//!
//! ```text
//! {root}/{namespace}/_{action}.schema.json
//! {root}/{namespace}/_{action}.schema.yaml
//! {root}/{namespace}/_{action}.schema.yml
//! ```
//!
//! Roots are searched in order and the first match wins, so an
//! application root can shadow an engine's fragment for the same action.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use apispec_core::ActionId;
use tracing::debug;

/// Recognized fragment suffixes, in lookup preference order.
pub const SCHEMA_SUFFIXES: [&str; 3] = [".schema.json", ".schema.yaml", ".schema.yml"];

/// A fragment found by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentEntry {
    /// File location.
    pub path: PathBuf,
    /// Action the fragment describes.
    pub id: ActionId,
}

/// Ordered set of fragment root directories.
#[derive(Debug, Clone)]
pub struct FragmentStore {
    roots: Vec<PathBuf>,
}

impl FragmentStore {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Locate the fragment for `id`: first root, then first suffix.
    pub fn find(&self, id: &ActionId) -> Option<PathBuf> {
        self.roots.iter().find_map(|root| {
            SCHEMA_SUFFIXES
                .iter()
                .map(|suffix| candidate(root, id, suffix))
                .find(|path| path.is_file())
        })
    }

    /// Where a JSON fragment for `id` is expected under the first root.
    pub fn expected_path(&self, id: &ActionId) -> PathBuf {
        let root = self
            .roots
            .first()
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new("."));
        candidate(root, id, SCHEMA_SUFFIXES[0])
    }

    /// Every fragment reachable from the roots, one per action.
    ///
    /// Each root's findings are sorted by identity and suffix preference;
    /// an identity already found under an earlier root is skipped. Files
    /// placed directly in a root carry no namespace and are ignored.
    pub fn find_all(&self) -> Vec<FragmentEntry> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for root in &self.roots {
            if !root.is_dir() {
                debug!(root = %root.display(), "fragment root missing, skipped");
                continue;
            }

            let mut files = Vec::new();
            walk_for_fragments(root, &mut files);

            let mut found: Vec<(FragmentEntry, usize)> = files
                .into_iter()
                .filter_map(|path| classify(root, path))
                .collect();
            found.sort_by(|(a, rank_a), (b, rank_b)| a.id.cmp(&b.id).then(rank_a.cmp(rank_b)));

            for (entry, _) in found {
                if seen.insert(entry.id.clone()) {
                    entries.push(entry);
                }
            }
        }

        entries
    }
}

fn candidate(root: &Path, id: &ActionId, suffix: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in id.namespace().split('/') {
        path.push(segment);
    }
    path.push(format!("_{}{suffix}", id.action()));
    path
}

fn walk_for_fragments(dir: &Path, acc: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        debug!(dir = %dir.display(), "unreadable directory skipped");
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            walk_for_fragments(&path, acc);
        } else if path
            .file_name()
            .and_then(|f| f.to_str())
            .is_some_and(|name| name.starts_with('_') && suffix_rank(name).is_some())
        {
            acc.push(path);
        }
    }
}

fn suffix_rank(file_name: &str) -> Option<usize> {
    SCHEMA_SUFFIXES
        .iter()
        .position(|suffix| file_name.ends_with(suffix))
}

/// Derive the identity of a fragment file relative to its root.
fn classify(root: &Path, path: PathBuf) -> Option<(FragmentEntry, usize)> {
    let name = path.file_name()?.to_str()?;
    let rank = suffix_rank(name)?;
    let action = name
        .strip_prefix('_')?
        .strip_suffix(SCHEMA_SUFFIXES[rank])?;

    let relative = path.parent()?.strip_prefix(root).ok()?;
    let segments: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    if segments.is_empty() {
        debug!(path = %path.display(), "fragment without namespace skipped");
        return None;
    }

    match ActionId::new(segments.join("/"), action) {
        Ok(id) => Some((FragmentEntry { path, id }, rank)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "fragment name not addressable, skipped");
            None
        }
    }
}
