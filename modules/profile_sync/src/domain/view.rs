//! View model of the profile page and the reducer that advances it.
//!
//! Every async outcome (load, stats, save) is turned into a [`ViewEvent`] and
//! folded in with [`ProfileView::reduce`]; the previous view is consumed and a
//! new one returned, so no loader ever mutates shared state directly.

use std::str::FromStr;

use crate::contract::model::{Notification, Profile, RecordCounters, Stats};
use crate::domain::edit_buffer::EditBuffer;
use crate::domain::error::DomainError;

/// User-facing notification texts.
pub mod messages {
    pub const PROFILE_NOT_FOUND: &str = "User profile not found.";
    pub const PROFILE_LOAD_FAILED: &str = "Failed to load profile.";
    pub const STATS_LOAD_FAILED: &str = "Failed to load user stats.";
    pub const SAVE_SUCCEEDED: &str = "Profile updated successfully!";
    pub const SAVE_FAILED: &str = "Failed to update profile. Please try again.";
    pub const NOT_SIGNED_IN: &str = "You are not signed in or your account id is invalid.";
}

/// Sections of the profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileTab {
    #[default]
    Info,
    Preferences,
    Interests,
}

impl FromStr for ProfileTab {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(ProfileTab::Info),
            "preferences" | "prefs" => Ok(ProfileTab::Preferences),
            "interests" => Ok(ProfileTab::Interests),
            _ => Err(DomainError::unknown_field(s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    LoadStarted,
    ProfileLoaded {
        profile: Profile,
        counters: RecordCounters,
    },
    ProfileMissing,
    ProfileLoadFailed(DomainError),
    PostsCounted(u64),
    StatsLoadFailed(DomainError),
    SaveStarted,
    Saved(Profile),
    SaveFailed(DomainError),
    SaveRejected,
    TabSelected(ProfileTab),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileView {
    edit: EditBuffer,
    stats: Stats,
    notification: Option<Notification>,
    loading: bool,
    tab: ProfileTab,
    profile_ready: bool,
    posts_ready: bool,
}

impl ProfileView {
    pub fn edit(&self) -> &EditBuffer {
        &self.edit
    }

    pub(crate) fn edit_mut(&mut self) -> &mut EditBuffer {
        &mut self.edit
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn tab(&self) -> ProfileTab {
        self.tab
    }

    /// The current load produced a profile (possibly the empty default for a
    /// user without a record). False after a failed load.
    pub fn profile_ready(&self) -> bool {
        self.profile_ready
    }

    /// Both the profile counters and the post count arrived in the current load.
    pub fn stats_fresh(&self) -> bool {
        self.profile_ready && self.posts_ready
    }

    pub fn reduce(self, event: ViewEvent) -> Self {
        match event {
            ViewEvent::LoadStarted => Self {
                loading: true,
                profile_ready: false,
                posts_ready: false,
                ..self
            },
            ViewEvent::ProfileLoaded { profile, counters } => {
                let mut edit = self.edit;
                edit.reset_to(profile);
                Self {
                    edit,
                    stats: merge_counters(self.stats, counters),
                    loading: false,
                    profile_ready: true,
                    ..self
                }
            }
            ViewEvent::ProfileMissing => Self {
                edit: EditBuffer::new(Profile::default()),
                stats: merge_counters(self.stats, RecordCounters::default()),
                notification: Some(Notification::error(messages::PROFILE_NOT_FOUND)),
                loading: false,
                profile_ready: true,
                ..self
            },
            ViewEvent::ProfileLoadFailed(_) => Self {
                notification: Some(Notification::error(messages::PROFILE_LOAD_FAILED)),
                loading: false,
                ..self
            },
            ViewEvent::PostsCounted(posts_count) => Self {
                stats: Stats {
                    posts_count,
                    ..self.stats
                },
                posts_ready: true,
                ..self
            },
            ViewEvent::StatsLoadFailed(_) => Self {
                notification: Some(Notification::error(messages::STATS_LOAD_FAILED)),
                ..self
            },
            ViewEvent::SaveStarted => Self {
                loading: true,
                ..self
            },
            ViewEvent::Saved(profile) => {
                let mut edit = self.edit;
                edit.reset_to(profile);
                Self {
                    edit,
                    notification: Some(Notification::success(messages::SAVE_SUCCEEDED)),
                    loading: false,
                    ..self
                }
            }
            ViewEvent::SaveFailed(_) => Self {
                notification: Some(Notification::error(messages::SAVE_FAILED)),
                loading: false,
                ..self
            },
            ViewEvent::SaveRejected => Self {
                notification: Some(Notification::error(messages::NOT_SIGNED_IN)),
                loading: false,
                ..self
            },
            ViewEvent::TabSelected(tab) => Self { tab, ..self },
        }
    }
}

/// Counters embedded in the user record; the post count is left alone.
fn merge_counters(prev: Stats, counters: RecordCounters) -> Stats {
    Stats {
        connections_count: counters.connections_count.unwrap_or(0),
        rating: counters.rating,
        profile_views: counters.profile_views.unwrap_or(0),
        join_date: counters.created_at,
        ..prev
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::NotificationKind;
    use crate::domain::edit_buffer::{EditMode, ProfileField};

    fn profile(name: &str) -> Profile {
        Profile {
            full_name: name.into(),
            email: "a@b.com".into(),
            ..Default::default()
        }
    }

    fn loaded(name: &str) -> ProfileView {
        ProfileView::default()
            .reduce(ViewEvent::LoadStarted)
            .reduce(ViewEvent::ProfileLoaded {
                profile: profile(name),
                counters: RecordCounters {
                    connections_count: Some(3),
                    rating: None,
                    profile_views: Some(10),
                    created_at: Some("2024-09-01".into()),
                },
            })
    }

    #[test]
    fn stats_are_fresh_only_after_both_loads() {
        let view = ProfileView::default().reduce(ViewEvent::LoadStarted);
        assert!(view.is_loading());
        assert!(!view.stats_fresh());

        let view = view.reduce(ViewEvent::PostsCounted(4));
        assert!(!view.stats_fresh());

        let view = view.reduce(ViewEvent::ProfileLoaded {
            profile: profile("An"),
            counters: RecordCounters::default(),
        });
        assert!(view.stats_fresh());
        assert!(!view.is_loading());
        assert_eq!(view.stats().posts_count, 4);
    }

    #[test]
    fn counters_merge_keeps_post_count_in_either_order() {
        let view = loaded("An").reduce(ViewEvent::PostsCounted(2));
        let stats = view.stats();
        assert_eq!(stats.posts_count, 2);
        assert_eq!(stats.connections_count, 3);
        assert_eq!(stats.profile_views, 10);
        assert_eq!(stats.rating, None);
        assert_eq!(stats.join_date.as_deref(), Some("2024-09-01"));
    }

    #[test]
    fn missing_profile_resets_to_defaults_with_error() {
        let mut view = loaded("An");
        view.edit_mut().begin_edit();
        view.edit_mut().set_field(ProfileField::City, "Hue").unwrap();

        let view = view.reduce(ViewEvent::ProfileMissing);
        assert_eq!(view.edit().working(), &Profile::default());
        assert_eq!(view.edit().saved(), &Profile::default());
        assert_eq!(view.edit().mode(), EditMode::Viewing);
        let note = view.notification().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.text, messages::PROFILE_NOT_FOUND);
    }

    #[test]
    fn load_failure_keeps_prior_profile() {
        let before = loaded("An");
        let after = before
            .clone()
            .reduce(ViewEvent::LoadStarted)
            .reduce(ViewEvent::ProfileLoadFailed(DomainError::transport("GET", "HTTP 500")));
        assert_eq!(after.edit(), before.edit());
        assert_eq!(after.notification().unwrap().text, messages::PROFILE_LOAD_FAILED);
        assert!(!after.is_loading());
        assert!(!after.profile_ready());
    }

    #[test]
    fn stats_failure_is_non_fatal() {
        let view = loaded("An").reduce(ViewEvent::StatsLoadFailed(DomainError::transport(
            "GET /posts",
            "HTTP 502",
        )));
        assert_eq!(view.edit().working().full_name, "An");
        assert_eq!(view.stats().posts_count, 0);
        assert!(!view.stats_fresh());
        assert_eq!(view.notification().unwrap().text, messages::STATS_LOAD_FAILED);
    }

    #[test]
    fn save_outcomes_drive_the_state_machine() {
        let mut editing = loaded("An");
        editing.edit_mut().begin_edit();
        editing.edit_mut().set_field(ProfileField::Bio, "hi").unwrap();
        let editing = editing.reduce(ViewEvent::SaveStarted);
        assert!(editing.is_loading());

        let failed = editing
            .clone()
            .reduce(ViewEvent::SaveFailed(DomainError::transport("PUT", "HTTP 500")));
        assert_eq!(failed.edit(), editing.edit());
        assert_eq!(failed.edit().mode(), EditMode::Editing);
        assert_eq!(failed.notification().unwrap().text, messages::SAVE_FAILED);

        let server = Profile {
            bio: "hi (moderated)".into(),
            ..editing.edit().working().clone()
        };
        let saved = editing.reduce(ViewEvent::Saved(server.clone()));
        assert_eq!(saved.edit().mode(), EditMode::Viewing);
        assert_eq!(saved.edit().working(), &server);
        assert_eq!(saved.edit().saved(), &server);
        assert_eq!(saved.notification().unwrap().kind, NotificationKind::Success);
    }

    #[test]
    fn rejected_save_changes_nothing_but_the_message() {
        let mut view = loaded("An");
        view.edit_mut().begin_edit();
        let before = view.edit().clone();
        let view = view.reduce(ViewEvent::SaveRejected);
        assert_eq!(view.edit(), &before);
        assert_eq!(view.notification().unwrap().text, messages::NOT_SIGNED_IN);
    }

    #[test]
    fn tab_selection_and_parsing() {
        let view = ProfileView::default().reduce(ViewEvent::TabSelected(ProfileTab::Interests));
        assert_eq!(view.tab(), ProfileTab::Interests);
        assert_eq!("Prefs".parse::<ProfileTab>().unwrap(), ProfileTab::Preferences);
        assert!("photos".parse::<ProfileTab>().is_err());
    }
}
