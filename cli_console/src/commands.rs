//! CLI Commands for the explorer
//!
//! Each command drives the workspace and renders its result as text.
//! Errors come back as `"<command> failed: <reason>"`.

use crate::interactive::{Command, HELP};
use bytes::Bytes;
use fs_view::{type_label, DirectoryListing, Entry};
use services_fs_view::TransferOutcome;
use services_settings::ExplorerSettings;
use services_workspace_manager::{Workspace, WorkspaceError};
use std::path::Path;

/// Number of activity entries `log` prints
pub const LOG_LINES: usize = 20;

/// CLI Command handler
pub struct CommandHandler {
    /// Explorer state
    pub workspace: Workspace,
    /// Settings the workspace was built from
    pub settings: ExplorerSettings,
}

fn failed(command: &str, err: WorkspaceError) -> String {
    if err.needs_cleanup() {
        format!("{} failed: {} [needs manual cleanup]", command, err)
    } else {
        format!("{} failed: {}", command, err)
    }
}

fn render_listing(listing: &DirectoryListing) -> String {
    if listing.is_empty() {
        return format!("{} (empty)", listing.path);
    }

    let mut lines = vec![listing.path.clone()];
    for folder in &listing.folders {
        lines.push(format!("  {}/", folder.name));
    }
    for file in &listing.files {
        let mut line = format!(
            "  {:<32} {:>10}  {}",
            file.name,
            file.size_bytes,
            type_label(&file.mime_type)
        );
        if let Some(link) = &file.youtube_link {
            line.push_str(&format!("  [video: {}]", link.title));
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn render_transfer(outcome: &TransferOutcome) -> String {
    match outcome {
        TransferOutcome::ManualCompletionRequired { .. } => {
            format!("{} [needs manual completion]", outcome)
        }
        _ => outcome.to_string(),
    }
}

impl CommandHandler {
    /// Creates a handler over a workspace
    pub fn new(workspace: Workspace, settings: ExplorerSettings) -> Self {
        Self {
            workspace,
            settings,
        }
    }

    /// Runs one parsed command
    ///
    /// `Quit` is the caller's business and renders as an empty string.
    pub async fn execute(&mut self, command: Command) -> Result<String, String> {
        match command {
            Command::Ls(path) => self.ls(path.as_deref()).await,
            Command::Cd(path) => self.cd(&path).await,
            Command::Up => self.up().await,
            Command::Pwd => Ok(self.workspace.current_path().to_string()),
            Command::Mkdir(name) => self.mkdir(&name).await,
            Command::Put { local, name } => self.put(&local, name.as_deref()).await,
            Command::Get { path, local } => self.get(&path, &local).await,
            Command::Cat(path) => self.cat(&path).await,
            Command::Rm(path) => self.rm(&path).await,
            Command::Mv { path, new_name } => self.mv(&path, &new_name).await,
            Command::Cp(path) => self.cp(&path).await,
            Command::Cut(path) => self.cut(&path).await,
            Command::Paste => self.paste().await,
            Command::Find(term) => Ok(render_listing(&self.workspace.search(&term))),
            Command::Link { path, url, title } => {
                self.link(&path, &url, title.as_deref().unwrap_or("")).await
            }
            Command::Unlink(path) => self.unlink(&path).await,
            Command::Log => Ok(self.log()),
            Command::Login(email) => self.login(&email),
            Command::Logout => Ok(self.logout()),
            Command::Whoami => Ok(self.whoami()),
            Command::Settings => Ok(self.show_settings()),
            Command::Help => Ok(HELP.to_string()),
            Command::Quit => Ok(String::new()),
        }
    }

    /// Lists a folder without changing directory
    ///
    /// Example: `ls /Documents`
    pub async fn ls(&mut self, path: Option<&str>) -> Result<String, String> {
        match path {
            None => {
                let listing = self
                    .workspace
                    .refresh()
                    .await
                    .map_err(|e| failed("ls", e))?;
                Ok(render_listing(listing))
            }
            Some(path) => {
                let here = self.workspace.current_path().to_string();
                let rendered = self
                    .workspace
                    .navigate_to(path)
                    .await
                    .map(render_listing)
                    .map_err(|e| failed("ls", e));
                self.workspace
                    .navigate_to(&here)
                    .await
                    .map_err(|e| failed("ls", e))?;
                rendered
            }
        }
    }

    /// Changes directory
    ///
    /// Example: `cd Documents`
    pub async fn cd(&mut self, path: &str) -> Result<String, String> {
        let listing = self
            .workspace
            .navigate_to(path)
            .await
            .map_err(|e| failed("cd", e))?;
        Ok(render_listing(listing))
    }

    /// Goes to the parent folder
    pub async fn up(&mut self) -> Result<String, String> {
        let listing = self
            .workspace
            .navigate_up()
            .await
            .map_err(|e| failed("up", e))?;
        Ok(render_listing(listing))
    }

    /// Creates a folder in the current directory
    ///
    /// Example: `mkdir Reports`
    pub async fn mkdir(&mut self, name: &str) -> Result<String, String> {
        let folder = self
            .workspace
            .create_folder(name)
            .await
            .map_err(|e| failed("mkdir", e))?;
        Ok(format!("Created folder: {}", folder.path))
    }

    /// Uploads a local file into the current directory
    ///
    /// Example: `put ./report.pdf` or `put ./report.pdf Q3.pdf`
    pub async fn put(&mut self, local: &str, name: Option<&str>) -> Result<String, String> {
        let name = match name {
            Some(name) => name.to_string(),
            None => Path::new(local)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| format!("put failed: no file name in {}", local))?,
        };
        let body = tokio::fs::read(local)
            .await
            .map_err(|e| format!("put failed: {}: {}", local, e))?;

        let file = self
            .workspace
            .upload(&name, Bytes::from(body), "")
            .await
            .map_err(|e| failed("put", e))?;
        Ok(format!(
            "Uploaded {} ({} bytes, {})",
            file.path, file.size_bytes, file.mime_type
        ))
    }

    /// Downloads a file to a local path
    ///
    /// Example: `get /Documents/example.txt ./example.txt`
    pub async fn get(&mut self, path: &str, local: &str) -> Result<String, String> {
        let data = self
            .workspace
            .download(path)
            .await
            .map_err(|e| failed("get", e))?;
        tokio::fs::write(local, &data.body)
            .await
            .map_err(|e| format!("get failed: {}: {}", local, e))?;
        Ok(format!("Saved {} bytes to {}", data.body.len(), local))
    }

    /// Prints a file
    ///
    /// Example: `cat notes.txt`
    pub async fn cat(&mut self, path: &str) -> Result<String, String> {
        let data = self
            .workspace
            .download(path)
            .await
            .map_err(|e| failed("cat", e))?;
        Ok(String::from_utf8_lossy(&data.body).into_owned())
    }

    async fn lookup(&self, command: &str, path: &str) -> Result<Entry, String> {
        self.workspace
            .entry(path)
            .await
            .map_err(|e| failed(command, e))
    }

    /// Deletes a file or a folder with everything under it
    ///
    /// Example: `rm Old`
    pub async fn rm(&mut self, path: &str) -> Result<String, String> {
        let target = self.lookup("rm", path).await?;
        let report = self
            .workspace
            .delete(&target)
            .await
            .map_err(|e| failed("rm", e))?;
        Ok(format!(
            "Deleted {} ({} objects)",
            report.path,
            report.deleted.len()
        ))
    }

    /// Renames in place
    ///
    /// Example: `mv notes.txt todo.txt`
    pub async fn mv(&mut self, path: &str, new_name: &str) -> Result<String, String> {
        let target = self.lookup("mv", path).await?;
        let outcome = self
            .workspace
            .rename(&target, new_name)
            .await
            .map_err(|e| failed("mv", e))?;
        Ok(render_transfer(&outcome))
    }

    /// Puts an entry on the clipboard for copying
    pub async fn cp(&mut self, path: &str) -> Result<String, String> {
        let target = self.lookup("cp", path).await?;
        let shown = target.path().to_string();
        self.workspace.copy(target);
        Ok(format!("Copied {} to clipboard", shown))
    }

    /// Puts an entry on the clipboard for moving
    pub async fn cut(&mut self, path: &str) -> Result<String, String> {
        let target = self.lookup("cut", path).await?;
        let shown = target.path().to_string();
        self.workspace.cut(target);
        Ok(format!("Cut {} to clipboard", shown))
    }

    /// Pastes the clipboard into the current directory
    pub async fn paste(&mut self) -> Result<String, String> {
        let pasted = self
            .workspace
            .paste()
            .await
            .map_err(|e| failed("paste", e))?;
        Ok(format!(
            "{}: {}",
            pasted.entry.action,
            render_transfer(&pasted.outcome)
        ))
    }

    /// Attaches a YouTube video to a file
    ///
    /// Example: `link talk.pdf https://youtu.be/abc Keynote`
    pub async fn link(&mut self, path: &str, url: &str, title: &str) -> Result<String, String> {
        let link = self
            .workspace
            .attach_link(path, url, title)
            .await
            .map_err(|e| failed("link", e))?;
        Ok(format!("Linked {} to \"{}\" ({})", link.file_path, link.title, link.url))
    }

    /// Removes the video from a file
    pub async fn unlink(&mut self, path: &str) -> Result<String, String> {
        let link = self
            .workspace
            .remove_link(path)
            .await
            .map_err(|e| failed("unlink", e))?;
        Ok(format!("Removed link from {}", link.file_path))
    }

    /// Recent activity, oldest first
    pub fn log(&self) -> String {
        let recent = self.workspace.activity().recent(LOG_LINES);
        if recent.is_empty() {
            return "No activity yet".to_string();
        }
        recent
            .iter()
            .map(|entry| entry.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Logs in a known user
    pub fn login(&mut self, email: &str) -> Result<String, String> {
        let user = self
            .workspace
            .login(email)
            .map_err(|e| failed("login", e))?;
        Ok(format!("Logged in as {}", user))
    }

    /// Logs out
    pub fn logout(&mut self) -> String {
        match self.workspace.logout() {
            Some(user) => format!("Logged out {}", user.email),
            None => "Not logged in".to_string(),
        }
    }

    /// Who is acting
    pub fn whoami(&self) -> String {
        match self.workspace.session().user() {
            Some(user) => user.to_string(),
            None => "anonymous (read-only)".to_string(),
        }
    }

    /// Effective settings, one per line
    pub fn show_settings(&self) -> String {
        self.settings
            .describe()
            .into_iter()
            .map(|(key, value)| format!("{} = {}", key, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
