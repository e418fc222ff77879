//! The explorer workspace
//!
//! Owns the current folder and its listing, the session, the link table and
//! the activity log, and routes every user action through the file
//! operation engine.

use crate::bootstrap::open_backend;
use crate::session::Session;
use crate::WorkspaceError;
use bytes::Bytes;
use fs_view::{DirectoryListing, Entry, FileEntry, FolderEntry, PathNormalizer, YoutubeLink};
use identity::{AccessGate, User, UserDirectory};
use serde::{Deserialize, Serialize};
use services_clipboard::{ClipboardAction, PasteResult};
use services_fs_view::{
    DeleteReport, EngineConfig, FileOperationEngine, NamespaceProjector, TransferOutcome,
    UploadReport, UploadRequest,
};
use services_logger::{ActivityAction, ActivityEntry, ActivityLog, ActivityOutcome};
use services_media_links::{load_links, save_links, LinkTable};
use services_settings::ExplorerSettings;
use services_storage::{ObjectData, StorageBackend};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// One step of the breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    /// Folder name
    pub name: String,
    /// Folder display path (`/Docs/sub/`)
    pub path: String,
}

/// Explorer state for one session
pub struct Workspace {
    engine: FileOperationEngine,
    projector: NamespaceProjector,
    session: Session,
    users: UserDirectory,
    links: LinkTable,
    links_file: Option<PathBuf>,
    activity: ActivityLog,
    current: String,
    listing: DirectoryListing,
}

impl Workspace {
    /// Creates a workspace at the root of a backend
    ///
    /// The listing stays empty until the first `refresh` or navigation.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            engine: FileOperationEngine::new(backend.clone()),
            projector: NamespaceProjector::new(backend),
            session: Session::new(),
            users: UserDirectory::demo(),
            links: LinkTable::new(),
            links_file: None,
            activity: ActivityLog::new(),
            current: "/".to_string(),
            listing: DirectoryListing::empty("/"),
        }
    }

    /// Sets the engine limits
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.engine = self.engine.with_config(config);
        self
    }

    /// Sets the listing page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.projector = self.projector.with_page_size(page_size);
        self
    }

    /// Sets the known users
    pub fn with_users(mut self, users: UserDirectory) -> Self {
        self.users = users;
        self
    }

    /// Starts from an existing session
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Starts from an existing link table
    pub fn with_links(mut self, links: LinkTable) -> Self {
        self.links = links;
        self
    }

    /// Saves the link table to this file after every change
    pub fn with_links_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.links_file = Some(path.into());
        self
    }

    /// Keeps at most `capacity` activity entries
    pub fn with_activity_capacity(mut self, capacity: usize) -> Self {
        self.activity = ActivityLog::with_capacity(capacity);
        self
    }

    /// Builds a workspace from settings and lists the root
    pub async fn from_settings(settings: &ExplorerSettings) -> Result<Self, WorkspaceError> {
        let backend = open_backend(&settings.backend).await?;
        let mut workspace = Self::new(backend)
            .with_config(settings.engine_config())
            .with_page_size(settings.list_page_size)
            .with_activity_capacity(settings.activity_capacity);

        if let Some(path) = &settings.links_file {
            workspace.links = load_links(path).await?;
            workspace.links_file = Some(path.clone());
        }

        workspace.refresh().await?;
        Ok(workspace)
    }

    /// The session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The known users
    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    /// The link table
    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    /// The activity log
    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// The engine
    pub fn engine(&self) -> &FileOperationEngine {
        &self.engine
    }

    /// Folder display path of the current directory
    pub fn current_path(&self) -> &str {
        &self.current
    }

    /// Listing of the current directory, as of the last refresh
    pub fn listing(&self) -> &DirectoryListing {
        &self.listing
    }

    // ---- session ----

    /// Logs in a known user by email
    pub fn login(&mut self, email: &str) -> Result<User, WorkspaceError> {
        let result = self.users.lookup(email).map_err(WorkspaceError::from);
        if let Ok(user) = &result {
            self.session.login(user.clone());
        }
        let entry = ActivityEntry::new(ActivityAction::Login, "/", email.trim());
        self.finish(entry, &result);
        result
    }

    /// Logs out, returning who was logged in
    pub fn logout(&mut self) -> Option<User> {
        let user = self.session.logout()?;
        self.activity
            .record(ActivityEntry::new(ActivityAction::Logout, "/", user.email.clone()));
        Some(user)
    }

    // ---- navigation ----

    /// Resolves a path typed by the user against the current directory
    ///
    /// Absolute paths start at the root; `.` and `..` segments are honoured
    /// and `..` never climbs above the root.
    pub fn resolve(&self, path: &str) -> String {
        let mut segments: Vec<&str> = if path.starts_with('/') {
            Vec::new()
        } else {
            PathNormalizer::segments(&self.current)
        };

        for segment in PathNormalizer::segments(path) {
            match segment {
                "." => {}
                ".." => {
                    segments.pop();
                }
                name => segments.push(name),
            }
        }

        format!("/{}", segments.join("/"))
    }

    /// Changes directory and lists it
    ///
    /// Folders are implicit, so an unknown path simply lists empty.
    pub async fn navigate_to(&mut self, path: &str) -> Result<&DirectoryListing, WorkspaceError> {
        let target = self.resolve(path);
        let listing = self.projector.project(&target).await?;
        self.current = PathNormalizer::folder_display_path(&target);
        self.install(listing);
        debug!(path = %self.current, "navigated");
        Ok(&self.listing)
    }

    /// Goes to the parent directory; the parent of the root is the root
    pub async fn navigate_up(&mut self) -> Result<&DirectoryListing, WorkspaceError> {
        let parent = PathNormalizer::parent(&self.current);
        self.navigate_to(&parent).await
    }

    /// Rebuilds the current listing from the backend
    pub async fn refresh(&mut self) -> Result<&DirectoryListing, WorkspaceError> {
        let listing = self.projector.project(&self.current).await?;
        self.install(listing);
        Ok(&self.listing)
    }

    /// Breadcrumb trail from the root to the current directory
    ///
    /// The root itself has no crumb.
    pub fn breadcrumb(&self) -> Vec<Crumb> {
        let mut path = String::from("/");
        PathNormalizer::segments(&self.current)
            .into_iter()
            .map(|name| {
                path.push_str(name);
                path.push('/');
                Crumb {
                    name: name.to_string(),
                    path: path.clone(),
                }
            })
            .collect()
    }

    /// Filters the current listing by name; a blank term returns it whole
    pub fn search(&self, term: &str) -> DirectoryListing {
        let term = term.trim();
        if term.is_empty() {
            self.listing.clone()
        } else {
            self.listing.filtered(term)
        }
    }

    /// Looks up a single entry by path
    pub async fn entry(&self, path: &str) -> Result<Entry, WorkspaceError> {
        let resolved = self.resolve(path);
        if PathNormalizer::is_root(&resolved) {
            return Ok(Entry::folder("/"));
        }

        let parent = self.projector.project(&PathNormalizer::parent(&resolved)).await?;
        let mut entry = parent
            .find(PathNormalizer::basename(&resolved))
            .ok_or(WorkspaceError::NotFound(resolved))?;
        if let Entry::File(file) = &mut entry {
            file.youtube_link = self.links.get(&file.path).cloned();
        }
        Ok(entry)
    }

    fn install(&mut self, mut listing: DirectoryListing) {
        self.links.annotate(&mut listing);
        self.listing = listing;
    }

    async fn refresh_after(&mut self) {
        if let Err(error) = self.refresh().await {
            warn!(path = %self.current, error = %error, "listing refresh failed");
        }
    }

    // ---- mutations ----

    /// Creates a folder in the current directory
    pub async fn create_folder(&mut self, name: &str) -> Result<FolderEntry, WorkspaceError> {
        let result = self
            .engine
            .create_folder(&self.session, &self.current, name)
            .await
            .map_err(WorkspaceError::from);

        let path = PathNormalizer::folder_display_path(&PathNormalizer::join(&self.current, name));
        let entry = self.activity_entry(ActivityAction::CreateFolder, &path);
        self.finish(entry, &result);
        self.refresh_after().await;
        result
    }

    /// Uploads one file into the current directory
    pub async fn upload(
        &mut self,
        name: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<FileEntry, WorkspaceError> {
        let path = PathNormalizer::join(&self.current, name);
        let size = body.len();
        let result = self
            .engine
            .upload_file(&self.session, &path, body, content_type)
            .await
            .map_err(WorkspaceError::from);

        let entry = self
            .activity_entry(ActivityAction::Upload, &path)
            .with_field("size", size);
        self.finish(entry, &result);
        self.refresh_after().await;
        result
    }

    /// Uploads several files into the current directory
    ///
    /// Each file gets its own activity entry.
    pub async fn upload_batch(
        &mut self,
        requests: Vec<UploadRequest>,
    ) -> Result<UploadReport, WorkspaceError> {
        let result = self
            .engine
            .upload_batch(&self.session, &self.current, requests)
            .await
            .map_err(WorkspaceError::from);

        match &result {
            Ok(report) => {
                for file in &report.uploaded {
                    let entry = self
                        .activity_entry(ActivityAction::Upload, &file.path)
                        .with_field("size", file.size_bytes);
                    self.activity.record(entry);
                }
                for rejected in &report.too_large {
                    let entry = self
                        .activity_entry(ActivityAction::Upload, &rejected.path)
                        .with_field("size", rejected.size)
                        .with_outcome(ActivityOutcome::Failed(format!(
                            "exceeds {} bytes",
                            rejected.limit
                        )));
                    self.activity.record(entry);
                }
                for (path, error) in &report.failed {
                    let entry = self
                        .activity_entry(ActivityAction::Upload, path)
                        .with_outcome(ActivityOutcome::Failed(error.to_string()));
                    self.activity.record(entry);
                }
            }
            Err(_) => {
                let entry = self.activity_entry(ActivityAction::Upload, &self.current.clone());
                self.finish(entry, &result);
            }
        }

        self.refresh_after().await;
        result
    }

    /// Downloads a file; open to every principal
    pub async fn download(&mut self, path: &str) -> Result<ObjectData, WorkspaceError> {
        let resolved = self.resolve(path);
        let result = self
            .engine
            .download_file(&resolved)
            .await
            .map_err(WorkspaceError::from);

        let mut entry = self.activity_entry(ActivityAction::Download, &resolved);
        if let Ok(data) = &result {
            entry = entry.with_field("size", data.body.len());
        }
        self.finish(entry, &result);
        result
    }

    /// Deletes a file or a folder with everything under it
    ///
    /// Links go away only for keys that were really deleted.
    pub async fn delete(&mut self, target: &Entry) -> Result<DeleteReport, WorkspaceError> {
        let result = self
            .engine
            .delete_item(&self.session, target)
            .await
            .map_err(WorkspaceError::from);

        let deleted: Vec<String> = match &result {
            Ok(report) => report.deleted.clone(),
            Err(error) => Self::completed_keys(error),
        };
        if self.links.remove_keys(deleted.iter().map(String::as_str)) > 0 {
            self.persist_links_quietly().await;
        }

        let entry = self
            .activity_entry(ActivityAction::Delete, target.path())
            .with_field("deleted", deleted.len());
        self.finish(entry, &result);
        self.refresh_after().await;
        result
    }

    /// Renames a file or folder in place
    pub async fn rename(
        &mut self,
        target: &Entry,
        new_name: &str,
    ) -> Result<TransferOutcome, WorkspaceError> {
        let result = self
            .engine
            .rename_item(&self.session, target, new_name)
            .await
            .map_err(WorkspaceError::from);

        let destination = PathNormalizer::join(&PathNormalizer::parent(target.path()), new_name);
        let moved = match &result {
            Ok(outcome) => Self::transferred_keys(outcome),
            Err(error) => Self::completed_keys(error),
        };
        self.rekey_links(target, &destination, &moved).await;

        let entry = self
            .activity_entry(ActivityAction::Rename, target.path())
            .with_field("to", &destination);
        self.finish(entry, &result);
        self.refresh_after().await;
        result
    }

    /// Puts an entry on the clipboard for copying
    pub fn copy(&mut self, target: Entry) {
        self.session.clipboard.copy(target);
    }

    /// Puts an entry on the clipboard for moving
    pub fn cut(&mut self, target: Entry) {
        self.session.clipboard.cut(target);
    }

    /// Pastes the clipboard into the current directory
    ///
    /// A copy stays on the clipboard; a cut is consumed once it succeeds.
    pub async fn paste(&mut self) -> Result<PasteResult, WorkspaceError> {
        let result = self
            .session
            .clipboard
            .paste(&self.engine, &self.session.principal, &self.current)
            .await
            .map_err(WorkspaceError::from);

        let pending = match &result {
            Ok(pasted) => Some(pasted.entry.clone()),
            Err(_) => self.session.clipboard.pending().cloned(),
        };

        let Some(pending) = pending else {
            let entry = self.activity_entry(ActivityAction::Paste, &self.current.clone());
            self.finish(entry, &result);
            return result;
        };

        let destination = PathNormalizer::join(&self.current, pending.item.name());
        let action = match pending.action {
            ClipboardAction::Copy => ActivityAction::Copy,
            ClipboardAction::Cut => {
                let moved = match &result {
                    Ok(pasted) => Self::transferred_keys(&pasted.outcome),
                    Err(error) => Self::completed_keys(error),
                };
                self.rekey_links(&pending.item, &destination, &moved).await;
                ActivityAction::Move
            }
        };

        let entry = self
            .activity_entry(action, pending.item.path())
            .with_field("to", &destination);
        self.finish(entry, &result);
        self.refresh_after().await;
        result
    }

    // ---- links ----

    /// The link attached to a file, if any
    pub fn link(&self, path: &str) -> Option<&YoutubeLink> {
        self.links.get(&self.resolve(path))
    }

    /// Attaches a YouTube video to a file
    pub async fn attach_link(
        &mut self,
        path: &str,
        url: &str,
        title: &str,
    ) -> Result<YoutubeLink, WorkspaceError> {
        let resolved = self.resolve(path);
        let result = self.attach_link_inner(&resolved, url, title).await;

        let entry = self
            .activity_entry(ActivityAction::AttachLink, &resolved)
            .with_field("url", url);
        self.finish(entry, &result);
        self.refresh_after().await;
        result
    }

    async fn attach_link_inner(
        &mut self,
        path: &str,
        url: &str,
        title: &str,
    ) -> Result<YoutubeLink, WorkspaceError> {
        if !self.session.is_admin() {
            return Err(WorkspaceError::PermissionDenied("attach link".to_string()));
        }
        match self.entry(path).await? {
            Entry::File(_) => {}
            Entry::Folder(folder) => return Err(WorkspaceError::NotFound(folder.path)),
        }

        let link = self.links.attach(path, url, title)?;
        self.persist_links().await?;
        Ok(link)
    }

    /// Removes the link from a file
    pub async fn remove_link(&mut self, path: &str) -> Result<YoutubeLink, WorkspaceError> {
        let resolved = self.resolve(path);
        let result = self.remove_link_inner(&resolved).await;

        let entry = self.activity_entry(ActivityAction::RemoveLink, &resolved);
        self.finish(entry, &result);
        self.refresh_after().await;
        result
    }

    async fn remove_link_inner(&mut self, path: &str) -> Result<YoutubeLink, WorkspaceError> {
        if !self.session.is_admin() {
            return Err(WorkspaceError::PermissionDenied("remove link".to_string()));
        }
        let link = self
            .links
            .remove(path)
            .ok_or_else(|| WorkspaceError::NotFound(path.to_string()))?;
        self.persist_links().await?;
        Ok(link)
    }

    async fn persist_links(&self) -> Result<(), WorkspaceError> {
        if let Some(path) = &self.links_file {
            save_links(&self.links, path).await?;
        }
        Ok(())
    }

    async fn persist_links_quietly(&self) {
        if let Err(error) = self.persist_links().await {
            warn!(error = %error, "link table not saved");
        }
    }

    /// Follows moved keys with their links
    async fn rekey_links(&mut self, source: &Entry, destination: &str, moved: &[String]) {
        let mut rekeyed = 0;
        if source.is_folder() {
            let from_prefix = PathNormalizer::folder_prefix(source.path());
            let to_prefix = PathNormalizer::folder_prefix(destination);
            for key in moved {
                if let Some(target) = PathNormalizer::rebase(key, &from_prefix, &to_prefix) {
                    if self.links.rekey(key, &target) {
                        rekeyed += 1;
                    }
                }
            }
        } else if !moved.is_empty() && self.links.rekey(source.path(), destination) {
            rekeyed += 1;
        }

        if rekeyed > 0 {
            debug!(source = %source.path(), destination, rekeyed, "links re-keyed");
            self.persist_links_quietly().await;
        }
    }

    fn transferred_keys(outcome: &TransferOutcome) -> Vec<String> {
        match outcome {
            TransferOutcome::Completed { keys, .. } => keys.clone(),
            TransferOutcome::Unchanged { .. } | TransferOutcome::ManualCompletionRequired { .. } => {
                Vec::new()
            }
        }
    }

    fn completed_keys(error: &WorkspaceError) -> Vec<String> {
        match error {
            WorkspaceError::Operation(error) => error
                .partial()
                .map(|partial| partial.completed.clone())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    // ---- activity ----

    fn activity_entry(&self, action: ActivityAction, path: &str) -> ActivityEntry {
        ActivityEntry::new(action, path, self.session.principal().label())
    }

    fn finish<T>(&mut self, entry: ActivityEntry, result: &Result<T, WorkspaceError>) {
        let outcome = match result {
            Ok(_) => ActivityOutcome::Success,
            Err(error) if error.needs_cleanup() => ActivityOutcome::Partial(error.to_string()),
            Err(error) => ActivityOutcome::Failed(error.to_string()),
        };
        self.activity.record(entry.with_outcome(outcome));
    }
}
