//! Session state: who is acting and what is on the clipboard

use identity::{AccessGate, Principal, User};
use services_clipboard::ClipboardCoordinator;

/// One user's session
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) principal: Principal,
    pub(crate) clipboard: ClipboardCoordinator,
}

impl Session {
    /// Creates an anonymous session with an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session already logged in
    pub fn for_user(user: User) -> Self {
        Self {
            principal: Principal::User(user),
            clipboard: ClipboardCoordinator::new(),
        }
    }

    /// Who is acting
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// The logged-in user, if any
    pub fn user(&self) -> Option<&User> {
        self.principal.user()
    }

    /// Replaces the principal; the clipboard does not carry over
    pub fn login(&mut self, user: User) {
        self.principal = Principal::User(user);
        self.clipboard.clear();
    }

    /// Drops back to anonymous and returns who was logged in
    pub fn logout(&mut self) -> Option<User> {
        self.clipboard.clear();
        match std::mem::take(&mut self.principal) {
            Principal::User(user) => Some(user),
            Principal::Anonymous => None,
        }
    }

    /// The clipboard
    pub fn clipboard(&self) -> &ClipboardCoordinator {
        &self.clipboard
    }

    /// The clipboard, mutably
    pub fn clipboard_mut(&mut self) -> &mut ClipboardCoordinator {
        &mut self.clipboard
    }
}

impl AccessGate for Session {
    fn is_admin(&self) -> bool {
        self.principal.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fs_view::Entry;

    #[test]
    fn test_session_starts_anonymous() {
        let session = Session::new();
        assert!(session.user().is_none());
        assert!(!session.is_admin());
        assert!(session.clipboard().is_empty());
    }

    #[test]
    fn test_login_and_logout() {
        let mut session = Session::new();
        session.login(User::admin("a@x.com", "A"));
        assert!(session.is_admin());

        let user = session.logout().unwrap();
        assert_eq!(user.email, "a@x.com");
        assert!(!session.is_admin());
        assert!(session.logout().is_none());
    }

    #[test]
    fn test_login_clears_clipboard() {
        let mut session = Session::for_user(User::admin("a@x.com", "A"));
        session.clipboard_mut().copy(Entry::file("/a.txt"));
        assert!(!session.clipboard().is_empty());

        session.login(User::viewer("v@x.com", "V"));
        assert!(session.clipboard().is_empty());
        assert!(!session.is_admin());
    }
}
