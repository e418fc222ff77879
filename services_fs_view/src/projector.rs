//! Directory projection
//!
//! Turns a flat prefix listing into one level of the folder hierarchy.

use fs_view::{mime_for_name, DirectoryListing, FileEntry, FolderEntry, PathNormalizer, OCTET_STREAM};
use services_storage::{ListPage, ListRequest, StorageBackend, StorageResult, DEFAULT_PAGE_SIZE};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Builds directory listings from backend listings
///
/// Stateless apart from its backend handle; every call lists afresh.
#[derive(Clone)]
pub struct NamespaceProjector {
    backend: Arc<dyn StorageBackend>,
    page_size: usize,
}

impl NamespaceProjector {
    /// Creates a projector over a backend
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the page size used when listing
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Lists the immediate children of a directory
    ///
    /// An empty or unknown prefix yields an empty listing. Backend errors are
    /// returned unchanged.
    pub async fn project(&self, path: &str) -> StorageResult<DirectoryListing> {
        let prefix = PathNormalizer::folder_prefix(path);
        let mut request = ListRequest::new(prefix.clone())
            .with_delimiter(Some('/'))
            .with_max_keys(self.page_size);
        let mut merged = ListPage::default();

        loop {
            let page = self.backend.list(&request).await?;
            let next = page.next_start_after.clone();
            merged.extend(page);

            match next {
                Some(token) if request.start_after.as_deref() != Some(token.as_str()) => {
                    request.start_after = Some(token);
                }
                _ => break,
            }
        }

        let listing = Self::build(path, &merged);
        debug!(
            path = %listing.path,
            folders = listing.folders.len(),
            files = listing.files.len(),
            "projected directory"
        );
        Ok(listing)
    }

    /// Builds a listing from an already-fetched page
    ///
    /// Tolerates backends that ignore the delimiter: keys nested deeper than
    /// one level still only contribute their first segment as a folder.
    pub fn build(path: &str, page: &ListPage) -> DirectoryListing {
        let prefix = PathNormalizer::folder_prefix(path);
        let mut folders: BTreeMap<String, FolderEntry> = BTreeMap::new();
        let mut files: BTreeMap<String, FileEntry> = BTreeMap::new();

        for common in &page.common_prefixes {
            let Some(rest) = common.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let name = PathNormalizer::basename(rest);
            if name.is_empty() {
                continue;
            }
            let folder_path = format!("{}{}", prefix, name);
            folders
                .entry(name.to_string())
                .or_insert_with(|| FolderEntry::from_path(&folder_path));
        }

        for object in &page.objects {
            let Some(rest) = object.key.strip_prefix(prefix.as_str()) else {
                continue;
            };

            // Deeper key: implies a folder at this level, named by its first segment
            if let Some((first, _)) = rest.split_once('/') {
                if !first.is_empty() {
                    let folder_path = format!("{}{}", prefix, first);
                    folders
                        .entry(first.to_string())
                        .or_insert_with(|| FolderEntry::from_path(&folder_path));
                }
                continue;
            }

            // Markers only confirm the listed folder itself; hidden files never show
            if rest.is_empty() || PathNormalizer::is_marker_key(rest) || PathNormalizer::is_hidden(rest) {
                continue;
            }

            let mime_type = match object.content_type.as_deref() {
                Some(content_type) if !content_type.is_empty() && content_type != OCTET_STREAM => {
                    content_type.to_string()
                }
                _ => mime_for_name(rest).to_string(),
            };

            let entry = FileEntry::from_key(&object.key)
                .with_mime_type(mime_type)
                .with_size(object.size)
                .with_last_modified(object.last_modified);
            files.insert(rest.to_string(), entry);
        }

        // Folder wins when a name is both
        files.retain(|name, _| !folders.contains_key(name));

        DirectoryListing {
            path: PathNormalizer::folder_display_path(path),
            folders: folders.into_values().collect(),
            files: files.into_values().collect(),
        }
    }
}
