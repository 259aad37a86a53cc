//! Offline copy of the signed-in user's own profile

use crate::contract::schema::ProfileRow;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct ProfileMirror {
    inner: Arc<RwLock<Option<ProfileRow>>>,
}

impl ProfileMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, profile: ProfileRow) {
        *self.inner.write() = Some(profile);
    }

    /// Cached profile, only if it belongs to `profile_id`
    pub fn get(&self, profile_id: Uuid) -> Option<ProfileRow> {
        self.inner
            .read()
            .as_ref()
            .filter(|p| p.id == profile_id)
            .cloned()
    }

    pub fn clear(&self) {
        self.inner.write().take();
    }
}
