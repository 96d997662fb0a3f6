use parking_lot::RwLock;

use crate::contract::model::Identity;
use crate::domain::error::DomainError;
use crate::domain::ports::SessionStore;

/// Session cache kept in process memory, for embedders and tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    identity: RwLock<Option<Identity>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: RwLock::new(Some(identity)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn active_identity(&self) -> Result<Option<Identity>, DomainError> {
        Ok(self.identity.read().clone())
    }

    fn replace_identity(&self, identity: &Identity) -> Result<(), DomainError> {
        *self.identity.write() = Some(identity.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        self.identity.write().take();
        Ok(())
    }
}
