//! User directory
//!
//! A fixed list of users loaded once at startup and searched by substring.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const BUILTIN_USERS: &str = include_str!("users.json");

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read user list {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid user list: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub const fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// Directory backed by the bundled sample users
    pub fn builtin() -> Result<Self, DirectoryError> {
        Self::from_json(BUILTIN_USERS)
    }

    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let users: Vec<User> = serde_json::from_str(json)?;
        Ok(Self::new(users))
    }

    pub fn from_file(path: &Path) -> Result<Self, DirectoryError> {
        let json = std::fs::read_to_string(path).map_err(|source| DirectoryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from `users_file` when given, else the bundled list
    pub fn load(users_file: Option<&str>) -> Result<Self, DirectoryError> {
        match users_file {
            Some(path) => Self::from_file(Path::new(path)),
            None => Self::builtin(),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Users whose name or email contains `term`, ignoring case.
    ///
    /// An empty term matches nothing.
    pub fn search(&self, term: &str) -> Vec<&User> {
        let needle = term.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.users
            .iter()
            .filter(|user| {
                user.name.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
