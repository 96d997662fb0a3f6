use crate::contract::model::Identity;
use crate::domain::error::DomainError;

/// Device-local cache of the signed-in user.
pub trait SessionStore: Send + Sync {
    /// The cached identity, `None` when nobody is signed in.
    fn active_identity(&self) -> Result<Option<Identity>, DomainError>;

    /// Overwrite the cached identity (e.g. with the record returned by a save).
    fn replace_identity(&self, identity: &Identity) -> Result<(), DomainError>;

    /// Forget the signed-in user.
    fn clear(&self) -> Result<(), DomainError>;
}
