//! Logged-in user slot for one mock instance

use pizzamock_common::User;

use crate::directory::Directory;

/// Holds at most one logged-in user id.
///
/// The user record itself lives in the [`Directory`]; resolving on read means
/// profile updates show up in the current user without extra bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user_id: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, user_id: impl Into<String>) {
        self.user_id = Some(user_id.into());
    }

    /// Clear the slot, returning the id that was logged in
    pub fn end(&mut self) -> Option<String> {
        self.user_id.take()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn current_user<'d>(&self, directory: &'d Directory) -> Option<&'d User> {
        self.user_id().and_then(|id| directory.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pizzamock_common::{Fixture, FixtureKind, UserPatch};

    #[test]
    fn test_session_follows_directory_updates() {
        let mut directory = Directory::from_fixture(&Fixture::load(FixtureKind::Profiles));
        let mut session = Session::new();
        assert!(session.current_user(&directory).is_none());

        session.begin("2");
        let patch = UserPatch {
            name: Some("Di Nerx".to_string()),
            ..Default::default()
        };
        directory.update("2", &patch);
        assert_eq!(session.current_user(&directory).unwrap().name, "Di Nerx");

        assert_eq!(session.end().as_deref(), Some("2"));
        assert!(session.user_id().is_none());
        assert!(session.current_user(&directory).is_none());
    }
}
