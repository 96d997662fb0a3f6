use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::contract::model::{Profile, Session, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::ports::{ProfileRemote, SessionStore};

/// Profile synchronization rules: loading, stats and saving.
/// Depends only on the ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    remote: Arc<dyn ProfileRemote>,
    sessions: Arc<dyn SessionStore>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Rating shown for users nobody has rated yet. `None` shows no rating.
    pub default_rating: Option<f64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_rating: Some(4.5),
        }
    }
}

impl Service {
    pub fn new(
        remote: Arc<dyn ProfileRemote>,
        sessions: Arc<dyn SessionStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            remote,
            sessions,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The signed-in user, if any. An unreadable cache counts as signed out.
    #[instrument(name = "profile_sync.service.active_session", skip(self))]
    pub fn active_session(&self) -> Option<Session> {
        match self.sessions.active_identity() {
            Ok(identity) => identity.map(Session::new),
            Err(e) => {
                warn!(error = %e, "session cache unreadable; treating as signed out");
                None
            }
        }
    }

    #[instrument(name = "profile_sync.service.load_profile", skip(self, session), fields(email = %session.email()))]
    pub async fn load_profile(&self, session: &Session) -> Result<UserRecord, DomainError> {
        debug!("Looking up profile by email");

        let mut matches = self.remote.find_users_by_email(session.email()).await?;
        if matches.len() > 1 {
            warn!(count = matches.len(), "several profiles share this email; using the first");
        }
        if matches.is_empty() {
            info!("No profile found");
            return Err(DomainError::profile_not_found(session.email()));
        }

        debug!("Profile loaded");
        Ok(matches.swap_remove(0))
    }

    /// Post count of the session user. The other stats ride on the user record.
    #[instrument(name = "profile_sync.service.load_stats", skip(self, session))]
    pub async fn load_stats(&self, session: &Session) -> Result<u64, DomainError> {
        let author = session.user_id().ok_or_else(DomainError::unauthenticated)?;
        let posts = self.remote.list_posts_by_author(author).await?;
        debug!(posts = posts.len(), author = %author, "Counted posts");
        Ok(posts.len() as u64)
    }

    /// Submit the whole profile and adopt the server's answer as the new
    /// session identity and profile.
    #[instrument(name = "profile_sync.service.save", skip(self, session, profile))]
    pub async fn save(
        &self,
        session: &Session,
        profile: &Profile,
    ) -> Result<(Session, Profile), DomainError> {
        let id = session.user_id().ok_or_else(DomainError::unauthenticated)?;
        info!(user_id = %id, "Saving profile");

        let record = self.remote.put_user(id, profile).await?;
        let identity = record
            .identity()
            .map_err(|e| DomainError::transport("PUT /users", format!("invalid user record: {e}")))?;

        // The server already accepted the update; a stale cache is only refreshed on next save.
        if let Err(e) = self.sessions.replace_identity(&identity) {
            warn!(error = %e, "failed to refresh cached session after save");
        }

        info!("Profile saved");
        Ok((Session::new(identity), record.profile))
    }

    /// Drop the cached session.
    #[instrument(name = "profile_sync.service.sign_out", skip(self))]
    pub fn sign_out(&self) -> Result<(), DomainError> {
        self.sessions.clear()?;
        info!("Session cleared");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeRemote, FakeSessions};
    use super::*;
    use crate::contract::model::{Identity, UserId};
    use serde_json::json;

    fn service(remote: Arc<FakeRemote>, sessions: Arc<FakeSessions>) -> Service {
        Service::new(remote, sessions, ServiceConfig::default())
    }

    fn session() -> Session {
        Session::new(Identity::new(7, "a@b.com"))
    }

    #[tokio::test]
    async fn load_profile_reports_not_found() {
        let remote = Arc::new(FakeRemote::default());
        let svc = service(remote, Arc::new(FakeSessions::default()));

        let err = svc.load_profile(&session()).await.unwrap_err();
        assert_eq!(err, DomainError::profile_not_found("a@b.com"));
    }

    #[tokio::test]
    async fn load_stats_needs_an_id() {
        let remote = Arc::new(FakeRemote::default());
        let svc = service(remote.clone(), Arc::new(FakeSessions::default()));
        let anonymous = Session::new(Identity {
            id: None,
            email: "a@b.com".into(),
            extra: Default::default(),
        });

        assert_eq!(
            svc.load_stats(&anonymous).await,
            Err(DomainError::Unauthenticated)
        );
        assert!(remote.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn save_without_id_makes_no_network_call() {
        let remote = Arc::new(FakeRemote::default());
        let svc = service(remote.clone(), Arc::new(FakeSessions::default()));
        let anonymous = Session::new(Identity {
            id: Some(UserId::Text(String::new())),
            email: "a@b.com".into(),
            extra: Default::default(),
        });

        let res = svc.save(&anonymous, &Profile::default()).await;
        assert_eq!(res, Err(DomainError::Unauthenticated));
        assert!(remote.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn save_refreshes_the_cached_identity() {
        let remote = Arc::new(FakeRemote::default());
        let sessions = Arc::new(FakeSessions::signed_in(Identity::new(7, "a@b.com")));
        let svc = service(remote.clone(), sessions.clone());

        let profile = Profile {
            full_name: "An".into(),
            email: "a@b.com".into(),
            ..Default::default()
        };
        let (new_session, saved) = svc.save(&session(), &profile).await.unwrap();

        assert_eq!(saved, profile);
        assert_eq!(remote.calls.lock().as_slice(), ["PUT /users/7"]);
        let cached = sessions.identity.lock().clone().unwrap();
        assert_eq!(&cached, new_session.identity());
        assert_eq!(cached.extra["updatedBy"], json!("server"));
        assert_eq!(cached.extra["fullName"], json!("An"));
    }

    #[tokio::test]
    async fn save_succeeds_even_if_cache_refresh_fails() {
        let remote = Arc::new(FakeRemote::default());
        let sessions = Arc::new(FakeSessions::default());
        *sessions.broken.lock() = true;
        let svc = service(remote, sessions);

        assert!(svc.save(&session(), &Profile::default()).await.is_ok());
    }

    #[test]
    fn unreadable_cache_means_signed_out() {
        let sessions = Arc::new(FakeSessions::signed_in(Identity::new(7, "a@b.com")));
        *sessions.broken.lock() = true;
        let svc = service(Arc::new(FakeRemote::default()), sessions);
        assert!(svc.active_session().is_none());
    }

    #[test]
    fn sign_out_clears_cache() {
        let sessions = Arc::new(FakeSessions::signed_in(Identity::new(7, "a@b.com")));
        let svc = service(Arc::new(FakeRemote::default()), sessions.clone());
        svc.sign_out().unwrap();
        assert!(svc.active_session().is_none());
    }
}
