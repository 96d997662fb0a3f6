//! Plain-text and JSON rendering of the profile page.

use std::fmt;

use profile_sync::catalog::{COMMON_INTERESTS, LIFESTYLE_OPTIONS};
use profile_sync::domain::edit_buffer::{PreferenceField, ProfileField};
use profile_sync::domain::view::ProfileTab;
use profile_sync::model::{Notification, NotificationKind, Profile, Stats, TagSet};
use profile_sync::ProfileEditor;
use serde::Serialize;

/// The selected tab of a loaded profile.
pub struct Page<'a> {
    profile: &'a Profile,
    stats: &'a Stats,
    rating: Option<f64>,
    tab: ProfileTab,
}

impl<'a> Page<'a> {
    pub fn new(editor: &'a ProfileEditor) -> Self {
        let view = editor.view();
        Self {
            profile: view.edit().working(),
            stats: view.stats(),
            rating: editor.display_rating(),
            tab: view.tab(),
        }
    }

    fn header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = or_dash(&self.profile.full_name);
        writeln!(f, "{name} <{}>", or_dash(&self.profile.email))?;
        let rating = self
            .rating
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "-".to_string());
        let joined = match (self.stats.joined_on(), self.stats.join_date.as_deref()) {
            (Some(day), _) => day.format("%Y-%m-%d").to_string(),
            (None, Some(raw)) => raw.to_string(),
            (None, None) => "-".to_string(),
        };
        writeln!(
            f,
            "posts: {}  connections: {}  rating: {}  views: {}  joined: {}",
            self.stats.posts_count,
            self.stats.connections_count,
            rating,
            self.stats.profile_views,
            joined,
        )?;
        writeln!(f)
    }
}

impl fmt::Display for Page<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.header(f)?;
        match self.tab {
            ProfileTab::Info => {
                for field in ProfileField::ALL {
                    if matches!(field, ProfileField::FullName | ProfileField::Email) {
                        continue;
                    }
                    writeln!(f, "{:<10} {}", field.name(), or_dash(field.get(self.profile)))?;
                }
            }
            ProfileTab::Preferences => {
                for field in PreferenceField::ALL {
                    writeln!(f, "{:<10} {}", field.name(), or_dash(field.get(self.profile)))?;
                }
                writeln!(f, "lifestyle")?;
                checklist(f, &LIFESTYLE_OPTIONS, &self.profile.looking_for.lifestyle)?;
            }
            ProfileTab::Interests => {
                checklist(f, &COMMON_INTERESTS, &self.profile.interests)?;
            }
        }
        Ok(())
    }
}

/// Suggested options with selected ones ticked, then any custom tags.
fn checklist(f: &mut fmt::Formatter<'_>, options: &[&str], selected: &TagSet) -> fmt::Result {
    for option in options {
        let mark = if selected.contains(option) { 'x' } else { ' ' };
        writeln!(f, "  [{mark}] {option}")?;
    }
    for custom in selected.iter().filter(|t| !options.contains(t)) {
        writeln!(f, "  [x] {custom}")?;
    }
    Ok(())
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonView<'a> {
    profile: &'a Profile,
    stats: &'a Stats,
    display_rating: Option<f64>,
    notification: Option<&'a Notification>,
}

impl<'a> JsonView<'a> {
    pub fn new(editor: &'a ProfileEditor) -> Self {
        let view = editor.view();
        Self {
            profile: view.edit().working(),
            stats: view.stats(),
            display_rating: editor.display_rating(),
            notification: view.notification(),
        }
    }
}

pub struct Note<'a>(pub &'a Notification);

impl fmt::Display for Note<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.kind {
            NotificationKind::Success => write!(f, "ok: {}", self.0.text),
            NotificationKind::Error => write!(f, "error: {}", self.0.text),
        }
    }
}

pub struct Catalog;

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Interests:")?;
        for tag in COMMON_INTERESTS {
            writeln!(f, "  {tag}")?;
        }
        writeln!(f, "Lifestyle:")?;
        for tag in LIFESTYLE_OPTIONS {
            writeln!(f, "  {tag}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_every_option() {
        let out = Catalog.to_string();
        for tag in COMMON_INTERESTS.iter().chain(LIFESTYLE_OPTIONS.iter()) {
            assert!(out.contains(tag), "missing {tag}");
        }
    }

    #[test]
    fn notes_are_prefixed_by_kind() {
        let ok = Notification::success("saved");
        assert_eq!(Note(&ok).to_string(), "ok: saved");
        let err = Notification::error("nope");
        assert_eq!(Note(&err).to_string(), "error: nope");
    }
}
