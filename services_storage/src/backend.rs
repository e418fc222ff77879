//! Storage backend capability
//!
//! A backend is a flat key space with four primitives. It has no notion of
//! folders, renames, or transactions; everything above that is built by
//! composing these calls.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Page size used when the caller does not ask for one (B2's `maxFileCount`)
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Metadata for one object in a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Full key
    pub key: String,
    /// Body length
    pub size: u64,
    /// Upload or modification time
    pub last_modified: Option<DateTime<Utc>>,
    /// Content type recorded at upload, if the backend keeps one
    pub content_type: Option<String>,
}

/// Body and content type returned by `get`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectData {
    /// Object body
    pub body: Bytes,
    /// Content type recorded at upload, if the backend keeps one
    pub content_type: Option<String>,
}

/// Confirmation returned by `put`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
    /// Key that was written
    pub key: String,
    /// Bytes stored
    pub size: u64,
}

/// Parameters for one `list` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Only keys starting with this prefix are returned
    pub prefix: String,
    /// Keys with this character after the prefix are rolled up into common prefixes
    pub delimiter: Option<char>,
    /// Resume after this key or common prefix
    pub start_after: Option<String>,
    /// Maximum number of objects plus common prefixes in the page
    pub max_keys: usize,
}

impl ListRequest {
    /// Creates a request for a prefix with no delimiter
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: None,
            start_after: None,
            max_keys: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the delimiter
    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the resume token
    pub fn with_start_after(mut self, start_after: impl Into<String>) -> Self {
        self.start_after = Some(start_after.into());
        self
    }

    /// Sets the page size
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }
}

/// One page of listing results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Rolled-up prefixes, each ending with the delimiter
    pub common_prefixes: Vec<String>,
    /// Objects directly matched
    pub objects: Vec<ObjectSummary>,
    /// Token for the next page, if the listing was truncated
    pub next_start_after: Option<String>,
}

impl ListPage {
    /// Returns true if the page holds nothing
    pub fn is_empty(&self) -> bool {
        self.common_prefixes.is_empty() && self.objects.is_empty()
    }

    /// Returns the object keys in the page
    pub fn keys(&self) -> Vec<String> {
        self.objects.iter().map(|o| o.key.clone()).collect()
    }

    /// Appends another page's results
    pub fn extend(&mut self, other: ListPage) {
        for prefix in other.common_prefixes {
            if !self.common_prefixes.contains(&prefix) {
                self.common_prefixes.push(prefix);
            }
        }
        self.objects.extend(other.objects);
        self.next_start_after = other.next_start_after;
    }
}

/// Flat object store consumed by the namespace layer
///
/// Implementations: the in-process demo store, a local directory, and test
/// wrappers. A cloud bucket or server proxy satisfies the same contract.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short name for diagnostics
    fn name(&self) -> &str;

    /// Lists one page of keys under a prefix
    async fn list(&self, request: &ListRequest) -> StorageResult<ListPage>;

    /// Reads an object
    async fn get(&self, key: &str) -> StorageResult<ObjectData>;

    /// Writes an object, silently replacing any existing one
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<PutReceipt>;

    /// Removes an object
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Pages through `list` until the listing is exhausted
    async fn list_all(&self, prefix: &str, delimiter: Option<char>) -> StorageResult<ListPage> {
        let mut request = ListRequest::new(prefix).with_delimiter(delimiter);
        let mut merged = ListPage::default();

        loop {
            let page = self.list(&request).await?;
            let next = page.next_start_after.clone();
            merged.extend(page);

            match next {
                // A backend that hands back the same token would loop forever
                Some(token) if request.start_after.as_deref() != Some(token.as_str()) => {
                    request.start_after = Some(token);
                }
                _ => break,
            }
        }

        merged.next_start_after = None;
        Ok(merged)
    }
}

/// Builds one page from objects sorted by key
///
/// Shared by every in-crate backend so that prefix, delimiter and
/// `start_after` behave identically: all keys under one common prefix are
/// contiguous in sort order, and each common prefix counts as one entry
/// toward `max_keys`.
pub fn paginate<I>(objects: I, request: &ListRequest) -> ListPage
where
    I: IntoIterator<Item = ObjectSummary>,
{
    let limit = request.max_keys.max(1);
    let mut page = ListPage::default();
    let mut emitted = 0usize;
    let mut last_token: Option<String> = None;

    for object in objects {
        if !object.key.starts_with(&request.prefix) {
            continue;
        }

        if let Some(after) = &request.start_after {
            if object.key.as_str() <= after.as_str() {
                continue;
            }
            let after_is_prefix = request.delimiter.map_or(false, |d| after.ends_with(d));
            if after_is_prefix && object.key.starts_with(after.as_str()) {
                continue;
            }
        }

        let rest = &object.key[request.prefix.len()..];
        let common = request.delimiter.and_then(|d| {
            rest.find(d)
                .map(|idx| format!("{}{}", request.prefix, &rest[..idx + d.len_utf8()]))
        });

        if let Some(common) = &common {
            if page.common_prefixes.last() == Some(common) {
                continue;
            }
        }

        if emitted == limit {
            page.next_start_after = last_token;
            return page;
        }

        match common {
            Some(common) => {
                last_token = Some(common.clone());
                page.common_prefixes.push(common);
            }
            None => {
                last_token = Some(object.key.clone());
                page.objects.push(object);
            }
        }
        emitted += 1;
    }

    page
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(key: &str) -> ObjectSummary {
        ObjectSummary {
            key: key.to_string(),
            size: 1,
            last_modified: None,
            content_type: None,
        }
    }

    fn sorted(keys: &[&str]) -> Vec<ObjectSummary> {
        let mut keys: Vec<&str> = keys.to_vec();
        keys.sort();
        keys.into_iter().map(summary).collect()
    }

    #[test]
    fn test_paginate_with_delimiter() {
        let objects = sorted(&["a.txt", "Docs/.folder", "Docs/x.txt", "Docs/sub/y.txt", "b.txt"]);
        let page = paginate(objects, &ListRequest::new("").with_delimiter(Some('/')));

        assert_eq!(page.common_prefixes, vec!["Docs/".to_string()]);
        assert_eq!(page.keys(), vec!["a.txt".to_string(), "b.txt".to_string()]);
        assert!(page.next_start_after.is_none());
    }

    #[test]
    fn test_paginate_prefix_does_not_match_partial_names() {
        let objects = sorted(&["Doc/a.txt", "Documents/b.txt"]);
        let page = paginate(objects, &ListRequest::new("Doc/").with_delimiter(Some('/')));

        assert_eq!(page.keys(), vec!["Doc/a.txt".to_string()]);
    }

    #[test]
    fn test_paginate_without_delimiter_returns_descendants() {
        let objects = sorted(&["Docs/.folder", "Docs/a/b/c.txt", "Docs/z.txt", "Other/q"]);
        let page = paginate(objects, &ListRequest::new("Docs/"));

        assert!(page.common_prefixes.is_empty());
        assert_eq!(page.objects.len(), 3);
    }

    #[test]
    fn test_paginate_truncates_and_resumes() {
        let objects = sorted(&["a", "b", "c/1", "c/2", "d"]);
        let request = ListRequest::new("").with_delimiter(Some('/')).with_max_keys(2);

        let first = paginate(objects.clone(), &request);
        assert_eq!(first.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(first.next_start_after.as_deref(), Some("b"));

        let second = paginate(objects.clone(), &request.clone().with_start_after("b"));
        assert_eq!(second.common_prefixes, vec!["c/".to_string()]);
        assert_eq!(second.keys(), vec!["d".to_string()]);
        assert!(second.next_start_after.is_none());
    }

    #[test]
    fn test_paginate_resumes_after_common_prefix() {
        let objects = sorted(&["c/1", "c/2", "d"]);
        let request = ListRequest::new("")
            .with_delimiter(Some('/'))
            .with_max_keys(1)
            .with_start_after("c/");

        let page = paginate(objects, &request);
        assert!(page.common_prefixes.is_empty());
        assert_eq!(page.keys(), vec!["d".to_string()]);
    }

    #[test]
    fn test_list_page_extend_dedupes_prefixes() {
        let mut page = ListPage {
            common_prefixes: vec!["a/".to_string()],
            objects: vec![summary("x")],
            next_start_after: Some("x".to_string()),
        };
        page.extend(ListPage {
            common_prefixes: vec!["a/".to_string(), "b/".to_string()],
            objects: vec![summary("y")],
            next_start_after: None,
        });

        assert_eq!(page.common_prefixes.len(), 2);
        assert_eq!(page.objects.len(), 2);
        assert!(page.next_start_after.is_none());
    }
}
