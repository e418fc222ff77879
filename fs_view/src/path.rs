//! Path normalization logic
//!
//! This module converts between user-facing paths and backend keys.
//! Every function here is total: malformed input (empty strings, runs of
//! slashes) collapses toward the root instead of failing.

/// File name of the marker object that keeps an empty folder visible
pub const MARKER_NAME: &str = ".folder";

/// Path normalizer
///
/// Handles splitting paths into segments and rebuilding them as either
/// backend keys or display paths.
pub struct PathNormalizer;

impl PathNormalizer {
    /// Splits a path into its non-empty segments
    ///
    /// # Examples
    ///
    /// ```
    /// use fs_view::PathNormalizer;
    ///
    /// let segments = PathNormalizer::segments("/docs//notes/todo.txt");
    /// assert_eq!(segments, vec!["docs", "notes", "todo.txt"]);
    ///
    /// assert!(PathNormalizer::segments("///").is_empty());
    /// ```
    pub fn segments(path: &str) -> Vec<&str> {
        path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Returns true if no segment is `.` or `..`
    ///
    /// Such segments would be stored literally as key segments and could
    /// never be addressed again through a resolved path.
    pub fn is_addressable(path: &str) -> bool {
        Self::segments(path).iter().all(|s| *s != "." && *s != "..")
    }

    /// Converts a path to a backend key (no leading or trailing `/`)
    ///
    /// The root normalizes to the empty key.
    pub fn normalize(path: &str) -> String {
        Self::segments(path).join("/")
    }

    /// Returns true if the path addresses the root
    pub fn is_root(path: &str) -> bool {
        Self::segments(path).is_empty()
    }

    /// Returns the list prefix for a folder: `Docs/` for `/Docs`, empty for root
    ///
    /// The trailing `/` keeps `/Doc` from matching keys under `/Documents`.
    pub fn folder_prefix(path: &str) -> String {
        let key = Self::normalize(path);
        if key.is_empty() {
            key
        } else {
            format!("{}/", key)
        }
    }

    /// Returns the key of the marker object for a folder
    pub fn marker_key(path: &str) -> String {
        format!("{}{}", Self::folder_prefix(path), MARKER_NAME)
    }

    /// Converts a key or path to a display path for a file (`/Docs/a.txt`)
    pub fn display_path(path: &str) -> String {
        format!("/{}", Self::normalize(path))
    }

    /// Converts a key or path to a display path for a folder (`/Docs/`)
    ///
    /// The root is displayed as `/`.
    pub fn folder_display_path(path: &str) -> String {
        let key = Self::normalize(path);
        if key.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", key)
        }
    }

    /// Returns the last non-empty segment, or an empty string for the root
    pub fn basename(path: &str) -> &str {
        Self::segments(path).last().copied().unwrap_or("")
    }

    /// Drops the last segment; the parent of the root is the root
    pub fn parent(path: &str) -> String {
        let segments = Self::segments(path);
        match segments.split_last() {
            Some((_, rest)) if !rest.is_empty() => format!("/{}", rest.join("/")),
            _ => "/".to_string(),
        }
    }

    /// Joins a parent path and a child name with exactly one separator
    ///
    /// # Examples
    ///
    /// ```
    /// use fs_view::PathNormalizer;
    ///
    /// assert_eq!(PathNormalizer::join("/docs/", "/notes.txt"), "/docs/notes.txt");
    /// assert_eq!(PathNormalizer::join("", "docs"), "/docs");
    /// ```
    pub fn join(parent: &str, child: &str) -> String {
        let mut segments = Self::segments(parent);
        segments.extend(Self::segments(child));
        format!("/{}", segments.join("/"))
    }

    /// Returns true if the key names a folder marker
    pub fn is_marker_key(key: &str) -> bool {
        Self::basename(key).ends_with(MARKER_NAME)
    }

    /// Returns true if the name is hidden from listings
    pub fn is_hidden(name: &str) -> bool {
        name.starts_with('.')
    }

    /// Returns true if `path` is `ancestor` itself or lies somewhere below it
    pub fn is_within(ancestor: &str, path: &str) -> bool {
        let ancestor = Self::normalize(ancestor);
        let path = Self::normalize(path);
        if ancestor.is_empty() {
            return true;
        }
        path == ancestor || path.starts_with(&format!("{}/", ancestor))
    }

    /// Moves a key from one folder prefix to another
    ///
    /// Returns `None` if the key does not live under `from_prefix`.
    pub fn rebase(key: &str, from_prefix: &str, to_prefix: &str) -> Option<String> {
        key.strip_prefix(from_prefix)
            .map(|rest| format!("{}{}", to_prefix, rest))
    }

    /// Validates a single entry name
    ///
    /// Returns true if the name can be used for a new folder or a rename.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && name != MARKER_NAME
            && !name.contains('/')
            && !name.contains('\0')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_slashes() {
        assert_eq!(PathNormalizer::normalize("/Docs/file.txt"), "Docs/file.txt");
        assert_eq!(PathNormalizer::normalize("Docs/"), "Docs");
        assert_eq!(PathNormalizer::normalize("//Docs///sub//"), "Docs/sub");
    }

    #[test]
    fn test_malformed_input_is_root() {
        assert_eq!(PathNormalizer::normalize(""), "");
        assert_eq!(PathNormalizer::normalize("////"), "");
        assert!(PathNormalizer::is_root("/"));
        assert!(PathNormalizer::is_root(""));
        assert!(!PathNormalizer::is_root("/a"));
    }

    #[test]
    fn test_dot_segments_are_not_addressable() {
        assert!(PathNormalizer::is_addressable("/Docs/a.txt"));
        assert!(PathNormalizer::is_addressable("/"));
        assert!(PathNormalizer::is_addressable("/Docs/.env"));
        assert!(!PathNormalizer::is_addressable("/../x.txt"));
        assert!(!PathNormalizer::is_addressable("/Docs/./.."));
        assert!(!PathNormalizer::is_addressable("Docs/./New"));
    }

    #[test]
    fn test_folder_prefix() {
        assert_eq!(PathNormalizer::folder_prefix("/Docs"), "Docs/");
        assert_eq!(PathNormalizer::folder_prefix("/Docs/"), "Docs/");
        assert_eq!(PathNormalizer::folder_prefix("/"), "");
        assert_eq!(PathNormalizer::folder_prefix(""), "");
    }

    #[test]
    fn test_marker_key() {
        assert_eq!(PathNormalizer::marker_key("/Docs"), "Docs/.folder");
        assert_eq!(PathNormalizer::marker_key("/a/b/"), "a/b/.folder");
    }

    #[test]
    fn test_display_paths() {
        assert_eq!(PathNormalizer::display_path("Docs/a.txt"), "/Docs/a.txt");
        assert_eq!(PathNormalizer::folder_display_path("Docs"), "/Docs/");
        assert_eq!(PathNormalizer::folder_display_path(""), "/");
    }

    #[test]
    fn test_basename() {
        assert_eq!(PathNormalizer::basename("/Docs/readme.txt"), "readme.txt");
        assert_eq!(PathNormalizer::basename("/Docs/"), "Docs");
        assert_eq!(PathNormalizer::basename("/"), "");
        assert_eq!(PathNormalizer::basename(""), "");
    }

    #[test]
    fn test_parent() {
        assert_eq!(PathNormalizer::parent("/Docs/readme.txt"), "/Docs");
        assert_eq!(PathNormalizer::parent("/Docs/"), "/");
        assert_eq!(PathNormalizer::parent("/"), "/");
        assert_eq!(PathNormalizer::parent(""), "/");
    }

    #[test]
    fn test_join_collapses_separators() {
        assert_eq!(PathNormalizer::join("/Docs/", "readme.txt"), "/Docs/readme.txt");
        assert_eq!(PathNormalizer::join("/Docs", "/readme.txt"), "/Docs/readme.txt");
        assert_eq!(PathNormalizer::join("/", "Docs"), "/Docs");
        assert_eq!(PathNormalizer::join("/", ""), "/");
    }

    #[test]
    fn test_round_trip() {
        let samples = [
            "",
            "/",
            "///",
            "a",
            "/a",
            "/a/",
            "a/b/c.txt",
            "/a//b///c.txt",
            "/Docs/readme.txt",
            "/Docs/sub/",
            "x/.folder",
        ];

        for p in samples {
            let rebuilt =
                PathNormalizer::join(&PathNormalizer::parent(p), PathNormalizer::basename(p));
            assert_eq!(
                PathNormalizer::normalize(&rebuilt),
                PathNormalizer::normalize(p),
                "round trip failed for {:?}",
                p
            );
        }
    }

    #[test]
    fn test_is_marker_key() {
        assert!(PathNormalizer::is_marker_key("Docs/.folder"));
        assert!(PathNormalizer::is_marker_key(".folder"));
        assert!(PathNormalizer::is_marker_key("legacy.folder"));
        assert!(!PathNormalizer::is_marker_key("Docs/folder.txt"));
    }

    #[test]
    fn test_is_within() {
        assert!(PathNormalizer::is_within("/Docs", "/Docs/a.txt"));
        assert!(PathNormalizer::is_within("/Docs/", "/Docs"));
        assert!(!PathNormalizer::is_within("/Doc", "/Documents/a.txt"));
        assert!(PathNormalizer::is_within("/", "/anything"));
    }

    #[test]
    fn test_rebase() {
        assert_eq!(
            PathNormalizer::rebase("old/sub/a.txt", "old/", "new/"),
            Some("new/sub/a.txt".to_string())
        );
        assert_eq!(PathNormalizer::rebase("other/a.txt", "old/", "new/"), None);
    }

    #[test]
    fn test_is_valid_name() {
        assert!(PathNormalizer::is_valid_name("todo.txt"));
        assert!(PathNormalizer::is_valid_name("my folder"));

        assert!(!PathNormalizer::is_valid_name(""));
        assert!(!PathNormalizer::is_valid_name("."));
        assert!(!PathNormalizer::is_valid_name(".."));
        assert!(!PathNormalizer::is_valid_name(".folder"));
        assert!(!PathNormalizer::is_valid_name("has/slash"));
        assert!(!PathNormalizer::is_valid_name("has\0null"));
    }
}
