//! In-memory user directory

use pizzamock_common::{Fixture, Role, User, UserPatch};

/// All known users of one mock instance, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: Vec<User>,
    next_id: u64,
}

impl Directory {
    pub fn new(users: Vec<User>, next_id: u64) -> Self {
        Self { users, next_id }
    }

    pub fn from_fixture(fixture: &Fixture) -> Self {
        Self::new(fixture.users.clone(), fixture.next_user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    /// Email is the login key. Registration does not reject duplicates, so
    /// the oldest record with a given email is the one that resolves.
    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    /// Check credentials, returning the matching user
    pub fn authenticate(&self, email: &str, password: &str) -> Option<&User> {
        self.find_by_email(email).filter(|u| u.password == password)
    }

    /// Store a new diner under the next id, returning a copy of the record
    pub fn register(&mut self, name: &str, email: &str, password: &str) -> User {
        let id = self.next_id;
        self.next_id += 1;
        let user = User::new(id.to_string(), name, email, password, Role::Diner);
        self.users.push(user.clone());
        user
    }

    /// Apply a partial update. Returns `None` for an unknown id.
    pub fn update(&mut self, id: &str, patch: &UserPatch) -> Option<&User> {
        let user = self.get_mut(id)?;
        patch.apply(user);
        Some(&*user)
    }

    /// Users whose name contains `filter`, case-insensitively.
    ///
    /// `*` markers are stripped and whitespace trimmed first; a filter that is
    /// empty afterwards (or absent) lists everyone.
    pub fn list(&self, filter: Option<&str>) -> Vec<User> {
        let needle = normalize_filter(filter.unwrap_or("*"));
        self.users
            .iter()
            .filter(|u| needle.is_empty() || u.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

fn normalize_filter(raw: &str) -> String {
    raw.replace('*', "").trim().to_lowercase()
}
