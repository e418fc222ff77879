//! In-memory link table

use chrono::Utc;
use fs_view::{DirectoryListing, PathNormalizer, YoutubeLink};
use std::collections::BTreeMap;
use thiserror::Error;

/// Title used when the caller leaves it blank
pub const DEFAULT_TITLE: &str = "YouTube video";

const ACCEPTED_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

/// Link table errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("Not a YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("Not a file path: {0}")]
    InvalidPath(String),
}

/// YouTube links keyed by file display path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkTable {
    links: BTreeMap<String, YoutubeLink>,
}

impl LinkTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from stored links; later duplicates win
    pub fn from_links(links: impl IntoIterator<Item = YoutubeLink>) -> Self {
        let mut table = Self::new();
        for link in links {
            table
                .links
                .insert(PathNormalizer::display_path(&link.file_path), link);
        }
        table
    }

    /// Checks that a URL points at YouTube
    pub fn validate_url(url: &str) -> Result<(), LinkError> {
        let trimmed = url.trim();
        if ACCEPTED_HOSTS.iter().any(|host| trimmed.contains(host)) {
            Ok(())
        } else {
            Err(LinkError::InvalidUrl(url.to_string()))
        }
    }

    /// Attaches a link to a file, replacing any existing one
    pub fn attach(&mut self, file_path: &str, url: &str, title: &str) -> Result<YoutubeLink, LinkError> {
        Self::validate_url(url)?;
        if PathNormalizer::is_root(file_path) {
            return Err(LinkError::InvalidPath(file_path.to_string()));
        }

        let key = PathNormalizer::display_path(file_path);
        let title = title.trim();
        let link = YoutubeLink {
            file_path: key.clone(),
            url: url.trim().to_string(),
            title: if title.is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                title.to_string()
            },
            created_at: Utc::now(),
        };

        self.links.insert(key, link.clone());
        Ok(link)
    }

    /// Gets the link for a file
    pub fn get(&self, file_path: &str) -> Option<&YoutubeLink> {
        self.links.get(&PathNormalizer::display_path(file_path))
    }

    /// Removes the link for a file
    pub fn remove(&mut self, file_path: &str) -> Option<YoutubeLink> {
        self.links.remove(&PathNormalizer::display_path(file_path))
    }

    /// Removes the links of every listed key; returns how many were removed
    pub fn remove_keys<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) -> usize {
        keys.into_iter()
            .filter(|key| self.remove(key).is_some())
            .count()
    }

    /// Moves a link from one file path to another
    pub fn rekey(&mut self, from: &str, to: &str) -> bool {
        match self.links.remove(&PathNormalizer::display_path(from)) {
            Some(mut link) => {
                let key = PathNormalizer::display_path(to);
                link.file_path = key.clone();
                self.links.insert(key, link);
                true
            }
            None => false,
        }
    }

    /// All links, ordered by file path
    pub fn all(&self) -> Vec<&YoutubeLink> {
        self.links.values().collect()
    }

    /// Number of links
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Checks if the table is empty
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Fills in the link of every file in a listing
    pub fn annotate(&self, listing: &mut DirectoryListing) {
        for file in &mut listing.files {
            file.youtube_link = self.links.get(&file.path).cloned();
        }
    }
}
