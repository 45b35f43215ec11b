//! Object traversal and filtering
//!
//! Listings go through three filters in a fixed order: directory markers are
//! dropped, then entries below the requested level unless recursing, then
//! entries not matching the user pattern. Recursion filtering needs the raw
//! keys, and the pattern is the user-controlled predicate so it runs last.

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::{ObjectEntry, ObjectStore};

/// Pattern matching every key
pub const MATCH_ALL: &str = ".*";

/// Compile a user-supplied key filter
///
/// Must be called before any provider call so an invalid pattern never
/// triggers partial work.
pub fn compile_filter(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidFilter {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Strip a leading path separator from a user-supplied prefix
pub fn normalize_prefix(prefix: &str) -> &str {
    prefix.strip_prefix('/').unwrap_or(prefix)
}

/// Turn the positional path arguments into prefixes, defaulting to the bucket root
pub fn resolve_paths(paths: &[String]) -> Vec<String> {
    if paths.is_empty() {
        return vec![String::new()];
    }
    paths
        .iter()
        .map(|p| normalize_prefix(p).to_string())
        .collect()
}

/// List every real object under a prefix, following continuation tokens
pub async fn list_objects(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
) -> Result<Vec<ObjectEntry>> {
    let mut entries = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = store.list_objects_page(bucket, prefix, token.take()).await?;
        entries.extend(page.entries.into_iter().filter(|e| !e.is_dir_marker()));

        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    debug!(bucket, prefix, count = entries.len(), "listed objects");
    Ok(entries)
}

/// Drop entries living below the prefix level unless recursing
pub fn filter_for_recursion(
    entries: Vec<ObjectEntry>,
    prefix: &str,
    recursive: bool,
) -> Vec<ObjectEntry> {
    if recursive {
        return entries;
    }
    entries
        .into_iter()
        .filter(|e| {
            let remainder = e.key.strip_prefix(prefix).unwrap_or(&e.key);
            !remainder.contains('/')
        })
        .collect()
}

/// Keep entries whose full key matches the pattern
pub fn apply_pattern(entries: Vec<ObjectEntry>, pattern: &Regex) -> Vec<ObjectEntry> {
    entries
        .into_iter()
        .filter(|e| pattern.is_match(&e.key))
        .collect()
}

/// A compiled traversal: recursion flag plus key pattern
#[derive(Debug, Clone)]
pub struct Traversal {
    /// Descend into sub-levels below each prefix
    pub recursive: bool,
    /// Key filter
    pub pattern: Regex,
}

impl Traversal {
    /// Build a traversal, validating the pattern
    pub fn new(recursive: bool, pattern: &str) -> Result<Self> {
        Ok(Self {
            recursive,
            pattern: compile_filter(pattern)?,
        })
    }

    /// List a prefix and run every filter stage over it
    pub async fn collect(
        &self,
        store: &dyn ObjectStore,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectEntry>> {
        let entries = list_objects(store, bucket, prefix).await?;
        let entries = filter_for_recursion(entries, prefix, self.recursive);
        Ok(apply_pattern(entries, &self.pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn entries(keys: &[&str]) -> Vec<ObjectEntry> {
        keys.iter().map(|k| ObjectEntry::new(*k, 1)).collect()
    }

    fn keys(entries: &[ObjectEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_compile_filter_invalid() {
        let err = compile_filter("(unclosed").unwrap_err();
        assert!(matches!(err, Error::InvalidFilter { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/app/config"), "app/config");
        assert_eq!(normalize_prefix("app/"), "app/");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn test_resolve_paths_defaults_to_root() {
        assert_eq!(resolve_paths(&[]), vec![String::new()]);
        assert_eq!(
            resolve_paths(&["/a/".to_string(), "b".to_string()]),
            vec!["a/".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_filter_for_recursion_non_recursive() {
        let filtered = filter_for_recursion(entries(&["a/1.txt", "a/b/2.txt"]), "a/", false);
        assert_eq!(keys(&filtered), vec!["a/1.txt"]);
    }

    #[test]
    fn test_filter_for_recursion_recursive_keeps_all() {
        let filtered = filter_for_recursion(entries(&["a/1.txt", "a/b/2.txt"]), "a/", true);
        assert_eq!(keys(&filtered), vec!["a/1.txt", "a/b/2.txt"]);
    }

    #[test]
    fn test_filter_for_recursion_bucket_root() {
        let filtered = filter_for_recursion(entries(&["top.txt", "dir/nested.txt"]), "", false);
        assert_eq!(keys(&filtered), vec!["top.txt"]);
    }

    #[test]
    fn test_apply_pattern() {
        let pattern = compile_filter(r"\.txt$").unwrap();
        let filtered = apply_pattern(entries(&["a.txt", "a.bin"]), &pattern);
        assert_eq!(keys(&filtered), vec!["a.txt"]);
    }

    #[tokio::test]
    async fn test_list_objects_drops_dir_markers() {
        let store = MemoryStore::new();
        store.add_object("secrets", "app/", b"");
        store.add_object("secrets", "app/db.yml", b"password");
        store.add_object("secrets", "app/nested/", b"");

        let listed = list_objects(&store, "secrets", "app/").await.unwrap();
        assert_eq!(keys(&listed), vec!["app/db.yml"]);
    }

    #[tokio::test]
    async fn test_list_objects_follows_pages() {
        let store = MemoryStore::with_page_size(2);
        for i in 0..5 {
            store.add_object("secrets", &format!("k{i}"), b"x");
        }

        let listed = list_objects(&store, "secrets", "").await.unwrap();
        assert_eq!(listed.len(), 5);
    }

    #[tokio::test]
    async fn test_traversal_composes_filters() {
        let store = MemoryStore::new();
        store.add_object("secrets", "a/", b"");
        store.add_object("secrets", "a/1.txt", b"1");
        store.add_object("secrets", "a/1.bin", b"1");
        store.add_object("secrets", "a/b/2.txt", b"2");

        let traversal = Traversal::new(false, r"\.txt$").unwrap();
        let found = traversal.collect(&store, "secrets", "a/").await.unwrap();
        assert_eq!(keys(&found), vec!["a/1.txt"]);

        let traversal = Traversal::new(true, r"\.txt$").unwrap();
        let found = traversal.collect(&store, "secrets", "a/").await.unwrap();
        assert_eq!(keys(&found), vec!["a/1.txt", "a/b/2.txt"]);
    }
}
