//! In-memory profile store backing the edit/view fragments

use std::collections::HashMap;
use tokio::sync::RwLock;

const DEFAULT_NAME: &str = "Greg Lim";
const DEFAULT_BIO: &str = "Make your Changes here!!!!!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub bio: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            bio: DEFAULT_BIO.to_string(),
        }
    }
}

/// Profiles keyed by user id; ids never written read as the default profile
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: RwLock<HashMap<u64, Profile>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: u64) -> Profile {
        self.profiles
            .read()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Store `profile` under `id`, returning what was there before
    pub async fn put(&self, id: u64, profile: Profile) -> Option<Profile> {
        self.profiles.write().await.insert(id, profile)
    }
}
