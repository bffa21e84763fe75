use tokio::sync::RwLock;
use wayfind_core::UserLocation;

/// Last-known user position. Last write wins; no history is kept.
///
/// Shared by handle between the host (GPS callbacks) and the engine.
#[derive(Debug, Default)]
pub struct UserLocationStore {
    current: RwLock<Option<UserLocation>>,
}

impl UserLocationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, location: UserLocation) {
        *self.current.write().await = Some(location);
    }

    pub async fn get(&self) -> Option<UserLocation> {
        self.current.read().await.clone()
    }

    pub async fn clear(&self) {
        *self.current.write().await = None;
    }
}
