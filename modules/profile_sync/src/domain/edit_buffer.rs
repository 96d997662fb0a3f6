//! Working copy of a profile during an edit session.
//!
//! The buffer keeps two copies: `saved` (last loaded or last saved profile)
//! and `working` (what the user is typing). Outside an edit session both are
//! equal; every mutation requires [`EditMode::Editing`], and cancelling an
//! edit restores `working` from `saved`.

use std::fmt;
use std::str::FromStr;

use crate::contract::model::Profile;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Viewing,
    Editing,
}

/// Top-level scalar fields of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    FullName,
    Email,
    Phone,
    School,
    Major,
    Year,
    Gender,
    City,
    Bio,
}

impl ProfileField {
    pub const ALL: [ProfileField; 9] = [
        ProfileField::FullName,
        ProfileField::Email,
        ProfileField::Phone,
        ProfileField::School,
        ProfileField::Major,
        ProfileField::Year,
        ProfileField::Gender,
        ProfileField::City,
        ProfileField::Bio,
    ];

    /// Wire name of the field.
    pub fn name(self) -> &'static str {
        match self {
            ProfileField::FullName => "fullName",
            ProfileField::Email => "email",
            ProfileField::Phone => "phone",
            ProfileField::School => "school",
            ProfileField::Major => "major",
            ProfileField::Year => "year",
            ProfileField::Gender => "gender",
            ProfileField::City => "city",
            ProfileField::Bio => "bio",
        }
    }

    /// Email is the lookup key for the profile and is never edited here.
    pub fn is_read_only(self) -> bool {
        self == ProfileField::Email
    }

    pub fn get(self, profile: &Profile) -> &str {
        match self {
            ProfileField::FullName => &profile.full_name,
            ProfileField::Email => &profile.email,
            ProfileField::Phone => &profile.phone,
            ProfileField::School => &profile.school,
            ProfileField::Major => &profile.major,
            ProfileField::Year => &profile.year,
            ProfileField::Gender => &profile.gender,
            ProfileField::City => &profile.city,
            ProfileField::Bio => &profile.bio,
        }
    }

    fn slot(self, profile: &mut Profile) -> &mut String {
        match self {
            ProfileField::FullName => &mut profile.full_name,
            ProfileField::Email => &mut profile.email,
            ProfileField::Phone => &mut profile.phone,
            ProfileField::School => &mut profile.school,
            ProfileField::Major => &mut profile.major,
            ProfileField::Year => &mut profile.year,
            ProfileField::Gender => &mut profile.gender,
            ProfileField::City => &mut profile.city,
            ProfileField::Bio => &mut profile.bio,
        }
    }
}

/// Scalar fields of the nested `lookingFor` preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceField {
    Gender,
    AgeRange,
    Budget,
    Location,
}

impl PreferenceField {
    pub const ALL: [PreferenceField; 4] = [
        PreferenceField::Gender,
        PreferenceField::AgeRange,
        PreferenceField::Budget,
        PreferenceField::Location,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PreferenceField::Gender => "gender",
            PreferenceField::AgeRange => "ageRange",
            PreferenceField::Budget => "budget",
            PreferenceField::Location => "location",
        }
    }

    pub fn get(self, profile: &Profile) -> &str {
        let prefs = &profile.looking_for;
        match self {
            PreferenceField::Gender => &prefs.gender,
            PreferenceField::AgeRange => &prefs.age_range,
            PreferenceField::Budget => &prefs.budget,
            PreferenceField::Location => &prefs.location,
        }
    }

    fn slot(self, profile: &mut Profile) -> &mut String {
        let prefs = &mut profile.looking_for;
        match self {
            PreferenceField::Gender => &mut prefs.gender,
            PreferenceField::AgeRange => &mut prefs.age_range,
            PreferenceField::Budget => &mut prefs.budget,
            PreferenceField::Location => &mut prefs.location,
        }
    }
}

/// Case-insensitive match against the wire name, ignoring `_` and `-`,
/// so `fullName`, `full_name` and `full-name` all parse.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for ProfileField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|f| normalize(f.name()) == wanted)
            .ok_or_else(|| DomainError::unknown_field(s))
    }
}

impl FromStr for PreferenceField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|f| normalize(f.name()) == wanted)
            .ok_or_else(|| DomainError::unknown_field(s))
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for PreferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditBuffer {
    saved: Profile,
    working: Profile,
    mode: EditMode,
}

impl EditBuffer {
    pub fn new(profile: Profile) -> Self {
        Self {
            working: profile.clone(),
            saved: profile,
            mode: EditMode::Viewing,
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == EditMode::Editing
    }

    /// Last loaded or last saved profile.
    pub fn saved(&self) -> &Profile {
        &self.saved
    }

    /// Profile as currently edited (equal to `saved` while viewing).
    pub fn working(&self) -> &Profile {
        &self.working
    }

    pub fn is_dirty(&self) -> bool {
        self.working != self.saved
    }

    /// Enter edit mode. Re-entering while already editing keeps pending changes.
    pub fn begin_edit(&mut self) {
        self.mode = EditMode::Editing;
    }

    /// Leave edit mode, discarding every change since `begin_edit`.
    pub fn cancel_edit(&mut self) {
        self.working = self.saved.clone();
        self.mode = EditMode::Viewing;
    }

    /// Make `profile` authoritative and leave edit mode (load or successful save).
    pub fn reset_to(&mut self, profile: Profile) {
        self.working = profile.clone();
        self.saved = profile;
        self.mode = EditMode::Viewing;
    }

    pub fn set_field(&mut self, field: ProfileField, value: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_editing()?;
        if field.is_read_only() {
            return Err(DomainError::read_only_field(field.name()));
        }
        *field.slot(&mut self.working) = value.into();
        Ok(())
    }

    pub fn set_preference_field(
        &mut self,
        field: PreferenceField,
        value: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.ensure_editing()?;
        *field.slot(&mut self.working) = value.into();
        Ok(())
    }

    /// Returns whether the interest is selected afterwards.
    pub fn toggle_interest(&mut self, value: &str) -> Result<bool, DomainError> {
        self.ensure_editing()?;
        Ok(self.working.interests.toggle(value))
    }

    /// Returns whether the lifestyle habit is selected afterwards.
    pub fn toggle_lifestyle(&mut self, value: &str) -> Result<bool, DomainError> {
        self.ensure_editing()?;
        Ok(self.working.looking_for.lifestyle.toggle(value))
    }

    fn ensure_editing(&self) -> Result<(), DomainError> {
        if self.is_editing() {
            Ok(())
        } else {
            Err(DomainError::not_editing())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> EditBuffer {
        EditBuffer::new(Profile {
            full_name: "An".into(),
            email: "a@b.com".into(),
            interests: ["Gym"].into_iter().collect(),
            ..Default::default()
        })
    }

    #[test]
    fn mutations_require_edit_mode() {
        let mut buf = loaded();
        assert_eq!(
            buf.set_field(ProfileField::City, "Hue"),
            Err(DomainError::NotEditing)
        );
        assert_eq!(buf.toggle_interest("Yoga"), Err(DomainError::NotEditing));
        assert_eq!(buf.working(), buf.saved());
    }

    #[test]
    fn email_is_read_only() {
        let mut buf = loaded();
        buf.begin_edit();
        assert_eq!(
            buf.set_field(ProfileField::Email, "x@y.z"),
            Err(DomainError::read_only_field("email"))
        );
        assert_eq!(buf.working().email, "a@b.com");
    }

    #[test]
    fn cancel_discards_every_change() {
        let mut buf = loaded();
        let before = buf.saved().clone();

        buf.begin_edit();
        buf.set_field(ProfileField::Bio, "hello").unwrap();
        buf.set_preference_field(PreferenceField::Budget, "3tr").unwrap();
        buf.toggle_interest("Yoga").unwrap();
        buf.toggle_interest("Gym").unwrap();
        buf.toggle_lifestyle("Dậy sớm").unwrap();
        assert!(buf.is_dirty());

        buf.cancel_edit();
        assert_eq!(buf.mode(), EditMode::Viewing);
        assert_eq!(buf.working(), &before);
        assert!(!buf.is_dirty());
    }

    #[test]
    fn toggles_are_involutions() {
        let mut buf = loaded();
        buf.begin_edit();
        let start = buf.working().clone();

        assert!(buf.toggle_interest("Yoga").unwrap());
        assert!(!buf.toggle_interest("Yoga").unwrap());
        assert!(!buf.toggle_interest("Gym").unwrap());
        assert!(buf.toggle_interest("Gym").unwrap());
        assert!(buf.toggle_lifestyle("Yên tĩnh").unwrap());
        assert!(!buf.toggle_lifestyle("Yên tĩnh").unwrap());

        assert_eq!(buf.working(), &start);
    }

    #[test]
    fn begin_edit_twice_keeps_pending_changes() {
        let mut buf = loaded();
        buf.begin_edit();
        buf.set_field(ProfileField::City, "Hue").unwrap();
        buf.begin_edit();
        assert_eq!(buf.working().city, "Hue");
    }

    #[test]
    fn reset_to_makes_profile_authoritative() {
        let mut buf = loaded();
        buf.begin_edit();
        buf.set_field(ProfileField::City, "Hue").unwrap();

        let server = Profile {
            city: "Huế".into(),
            ..buf.working().clone()
        };
        buf.reset_to(server.clone());

        assert_eq!(buf.mode(), EditMode::Viewing);
        assert_eq!(buf.saved(), &server);
        assert_eq!(buf.working(), &server);
    }

    #[test]
    fn field_names_parse_in_several_spellings() {
        assert_eq!("fullName".parse::<ProfileField>().unwrap(), ProfileField::FullName);
        assert_eq!("full_name".parse::<ProfileField>().unwrap(), ProfileField::FullName);
        assert_eq!("AGE-RANGE".parse::<PreferenceField>().unwrap(), PreferenceField::AgeRange);
        assert_eq!(
            "nickname".parse::<ProfileField>(),
            Err(DomainError::unknown_field("nickname"))
        );
        for f in ProfileField::ALL {
            assert_eq!(f.to_string().parse::<ProfileField>().unwrap(), f);
        }
    }

    #[test]
    fn field_accessors_read_back_writes() {
        let mut buf = loaded();
        buf.begin_edit();
        for f in PreferenceField::ALL {
            buf.set_preference_field(f, f.name()).unwrap();
            assert_eq!(f.get(buf.working()), f.name());
        }
        for f in ProfileField::ALL.into_iter().filter(|f| !f.is_read_only()) {
            buf.set_field(f, f.name()).unwrap();
            assert_eq!(f.get(buf.working()), f.name());
        }
    }
}
