//! # Identity
//!
//! This crate provides the user identity and access primitives for the
//! explorer.
//!
//! ## Philosophy
//!
//! - **Identity is explicit and contextual, not global**
//! - **Access is a capability the caller hands in, not ambient state**
//! - **Testability first; no hidden global state**
//!
//! ## Core Concepts
//!
//! - `UserId`: Unique identifier for a known user
//! - `Role`: Admin or Viewer
//! - `Principal`: Whoever is acting right now (anonymous or a user)
//! - `AccessGate`: The yes/no check consulted before every mutation
//! - `UserDirectory`: Known users, looked up by email
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - Authentication (passwords, tokens, login forms)
//! - Server-side enforcement; the gate is advisory to the caller

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new unique user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID value
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

/// What a user is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May browse and mutate
    Admin,
    /// May browse and download only
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

/// A known user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Login email
    pub email: String,
    /// Name shown in the interface
    pub display_name: String,
    /// Access role
    pub role: Role,
}

impl User {
    /// Creates a new user
    pub fn new(email: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            display_name: display_name.into(),
            role,
        }
    }

    /// Creates an admin user
    pub fn admin(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(email, display_name, Role::Admin)
    }

    /// Creates a viewer
    pub fn viewer(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(email, display_name, Role::Viewer)
    }

    /// Returns true if the user has the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> ({})", self.display_name, self.email, self.role)
    }
}

/// Whoever is acting in a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// Nobody is logged in
    #[default]
    Anonymous,
    /// A logged-in user
    User(User),
}

impl Principal {
    /// Returns the user, if one is logged in
    pub fn user(&self) -> Option<&User> {
        match self {
            Principal::Anonymous => None,
            Principal::User(user) => Some(user),
        }
    }

    /// Short label for audit records (`email` or `anonymous`)
    pub fn label(&self) -> String {
        match self {
            Principal::Anonymous => "anonymous".to_string(),
            Principal::User(user) => user.email.clone(),
        }
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Principal::User(user)
    }
}

/// Capability check consulted before any mutating operation
///
/// Must be cheap, synchronous and free of side effects.
pub trait AccessGate {
    /// Returns true if the caller may mutate the namespace
    fn is_admin(&self) -> bool;
}

impl AccessGate for User {
    fn is_admin(&self) -> bool {
        User::is_admin(self)
    }
}

impl AccessGate for Principal {
    fn is_admin(&self) -> bool {
        self.user().map_or(false, User::is_admin)
    }
}

/// Fixed gate, for callers that decide access elsewhere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticGate(pub bool);

impl AccessGate for StaticGate {
    fn is_admin(&self) -> bool {
        self.0
    }
}

/// Lookup failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("User already registered: {0}")]
    Duplicate(String),
}

/// Known users, looked up by email (case-insensitive)
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    /// Creates an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory with one admin and one viewer
    pub fn demo() -> Self {
        Self {
            users: vec![
                User::admin("admin@example.com", "Administrator"),
                User::viewer("user@example.com", "Regular User"),
            ],
        }
    }

    /// Adds a user
    pub fn register(&mut self, user: User) -> Result<(), IdentityError> {
        if self.find(&user.email).is_some() {
            return Err(IdentityError::Duplicate(user.email));
        }
        self.users.push(user);
        Ok(())
    }

    /// Finds a user by email
    pub fn find(&self, email: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
    }

    /// Resolves an email to a user
    pub fn lookup(&self, email: &str) -> Result<User, IdentityError> {
        self.find(email)
            .cloned()
            .ok_or_else(|| IdentityError::UnknownUser(email.to_string()))
    }

    /// Returns all users
    pub fn users(&self) -> &[User] {
        &self.users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_unique() {
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn test_role_gate() {
        assert!(User::admin("a@x.com", "A").is_admin());
        assert!(!User::viewer("v@x.com", "V").is_admin());
    }

    #[test]
    fn test_principal_gate() {
        assert!(!Principal::Anonymous.is_admin());
        assert!(Principal::from(User::admin("a@x.com", "A")).is_admin());
        assert!(!Principal::from(User::viewer("v@x.com", "V")).is_admin());
    }

    #[test]
    fn test_principal_label() {
        assert_eq!(Principal::Anonymous.label(), "anonymous");
        assert_eq!(Principal::from(User::viewer("v@x.com", "V")).label(), "v@x.com");
    }

    #[test]
    fn test_static_gate() {
        assert!(StaticGate(true).is_admin());
        assert!(!StaticGate(false).is_admin());
    }

    #[test]
    fn test_directory_lookup_is_case_insensitive() {
        let directory = UserDirectory::demo();
        let admin = directory.lookup("ADMIN@example.com").unwrap();
        assert_eq!(admin.role, Role::Admin);

        assert_eq!(
            directory.lookup("ghost@example.com"),
            Err(IdentityError::UnknownUser("ghost@example.com".to_string()))
        );
    }

    #[test]
    fn test_directory_rejects_duplicates() {
        let mut directory = UserDirectory::new();
        directory.register(User::viewer("a@x.com", "A")).unwrap();
        assert!(matches!(
            directory.register(User::admin("A@x.com", "Other")),
            Err(IdentityError::Duplicate(_))
        ));
        assert_eq!(directory.users().len(), 1);
    }

    #[test]
    fn test_user_display() {
        let user = User::viewer("v@x.com", "Val");
        assert_eq!(user.to_string(), "Val <v@x.com> (viewer)");
    }
}
