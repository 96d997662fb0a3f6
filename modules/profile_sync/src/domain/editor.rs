use std::sync::Arc;

use tracing::{info, warn};

use crate::contract::model::Session;
use crate::domain::edit_buffer::{PreferenceField, ProfileField};
use crate::domain::error::DomainError;
use crate::domain::service::Service;
use crate::domain::view::{ProfileTab, ProfileView, ViewEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// Loads ran; check the view's notification for recoverable failures.
    Loaded,
    /// Nobody is signed in. Send the user to the login flow.
    RedirectToLogin,
}

/// One open profile page: the session it was opened with and its view model.
///
/// Async operations take `&mut self`, so a second save cannot start while one
/// is pending. Results are applied only when an operation completes; a future
/// dropped mid-flight leaves the previous profile in place.
pub struct ProfileEditor {
    service: Arc<Service>,
    session: Option<Session>,
    view: ProfileView,
}

impl ProfileEditor {
    pub fn new(service: Arc<Service>) -> Self {
        Self {
            service,
            session: None,
            view: ProfileView::default(),
        }
    }

    pub fn view(&self) -> &ProfileView {
        &self.view
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Rating to display, with the configured fallback for unrated users.
    pub fn display_rating(&self) -> Option<f64> {
        self.view
            .stats()
            .display_rating(self.service.config().default_rating)
    }

    fn apply(&mut self, event: ViewEvent) {
        self.view = std::mem::take(&mut self.view).reduce(event);
    }

    /// Read the session and load profile and stats concurrently.
    pub async fn mount(&mut self) -> MountOutcome {
        let Some(session) = self.service.active_session() else {
            info!("No active session; redirecting to login");
            self.session = None;
            return MountOutcome::RedirectToLogin;
        };

        self.apply(ViewEvent::LoadStarted);
        let (profile, posts) = tokio::join!(
            self.service.load_profile(&session),
            self.service.load_stats(&session)
        );

        let profile_event = match profile {
            Ok(record) => ViewEvent::ProfileLoaded {
                profile: record.profile,
                counters: record.counters,
            },
            Err(DomainError::ProfileNotFound { .. }) => ViewEvent::ProfileMissing,
            Err(e) => {
                warn!(error = %e, "Failed to load profile");
                ViewEvent::ProfileLoadFailed(e)
            }
        };
        let stats_event = match posts {
            Ok(count) => ViewEvent::PostsCounted(count),
            Err(e) => {
                warn!(error = %e, "Failed to load user stats");
                ViewEvent::StatsLoadFailed(e)
            }
        };

        self.apply(profile_event);
        self.apply(stats_event);
        self.session = Some(session);
        MountOutcome::Loaded
    }

    pub fn begin_edit(&mut self) {
        self.view.edit_mut().begin_edit();
    }

    pub fn cancel_edit(&mut self) {
        self.view.edit_mut().cancel_edit();
    }

    pub fn set_field(&mut self, field: ProfileField, value: impl Into<String>) -> Result<(), DomainError> {
        self.view.edit_mut().set_field(field, value)
    }

    pub fn set_preference_field(
        &mut self,
        field: PreferenceField,
        value: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.view.edit_mut().set_preference_field(field, value)
    }

    pub fn toggle_interest(&mut self, value: &str) -> Result<bool, DomainError> {
        self.view.edit_mut().toggle_interest(value)
    }

    pub fn toggle_lifestyle(&mut self, value: &str) -> Result<bool, DomainError> {
        self.view.edit_mut().toggle_lifestyle(value)
    }

    pub fn select_tab(&mut self, tab: ProfileTab) {
        self.apply(ViewEvent::TabSelected(tab));
    }

    /// Persist the edit buffer. On failure the buffer and edit mode are kept
    /// so the user can retry or cancel.
    pub async fn save(&mut self) -> Result<(), DomainError> {
        if !self.view.edit().is_editing() {
            return Err(DomainError::not_editing());
        }
        let Some(session) = self.session.clone() else {
            self.apply(ViewEvent::SaveRejected);
            return Err(DomainError::unauthenticated());
        };

        self.apply(ViewEvent::SaveStarted);
        let outcome = self
            .service
            .save(&session, self.view.edit().working())
            .await;

        match outcome {
            Ok((session, profile)) => {
                self.session = Some(session);
                self.apply(ViewEvent::Saved(profile));
                Ok(())
            }
            Err(DomainError::Unauthenticated) => {
                self.apply(ViewEvent::SaveRejected);
                Err(DomainError::Unauthenticated)
            }
            Err(e) => {
                warn!(error = %e, "Failed to update profile");
                self.apply(ViewEvent::SaveFailed(e.clone()));
                Err(e)
            }
        }
    }

    /// Forget the session and close the page.
    pub fn sign_out(self) -> Result<(), DomainError> {
        self.service.sign_out()
    }
}
