use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Server-side user id. The REST store hands out numeric ids, but string ids
/// are accepted too so the cache survives a backend switch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(u64),
    Text(String),
}

impl UserId {
    /// Empty or whitespace-only text ids are treated as "no id".
    pub fn is_blank(&self) -> bool {
        match self {
            UserId::Number(_) => false,
            UserId::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{n}"),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for UserId {
    fn from(n: u64) -> Self {
        UserId::Number(n)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId::Text(s.to_string())
    }
}

/// The signed-in user as cached on this device.
///
/// Only `id` and `email` are interpreted; every other field of the cached
/// user record is carried in `extra` untouched, so replacing the cache with a
/// server response and reading it back is lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            email: email.into(),
            extra: Map::new(),
        }
    }

    /// The id if present and not blank.
    pub fn user_id(&self) -> Option<&UserId> {
        self.id.as_ref().filter(|id| !id.is_blank())
    }
}

/// Explicit session context handed to every operation instead of reading a
/// process-wide "current user".
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    identity: Identity,
}

impl Session {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.identity.user_id()
    }
}

/// Set of free-form tags (interests, lifestyle habits).
///
/// Serialized as a JSON array; duplicate entries in incoming data collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// Returns false if the tag was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.0.insert(tag.into())
    }

    /// Returns false if the tag was absent.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.0.remove(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Symmetric difference with `{tag}`. Returns true if the tag is now present.
    pub fn toggle(&mut self, tag: &str) -> bool {
        if self.0.remove(tag) {
            false
        } else {
            self.0.insert(tag.to_string());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// What the user is looking for in a roommate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, deserialize_with = "lenient_string")]
    pub gender: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub age_range: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub budget: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "nullable")]
    pub lifestyle: TagSet,
}

/// The editable part of a user record. Absent or null fields take their
/// empty defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub school: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub major: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gender: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bio: String,
    #[serde(default, deserialize_with = "nullable")]
    pub interests: TagSet,
    #[serde(default, deserialize_with = "nullable")]
    pub looking_for: Preferences,
}

/// Counters the server keeps on the user record itself. Each one is read on
/// its own: a value of the wrong type reads as absent without touching the rest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCounters {
    #[serde(default, deserialize_with = "lenient")]
    pub connections_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub profile_views: Option<u64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<String>,
}

/// One user document as returned by `/users`, decoded three ways: the
/// editable profile, the embedded counters and the raw JSON (kept for the
/// session cache).
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub profile: Profile,
    pub counters: RecordCounters,
    pub raw: Value,
}

impl UserRecord {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let profile = Profile::deserialize(&raw)?;
        // Counters are display-only; a malformed record must not hide the profile.
        let counters = RecordCounters::deserialize(&raw).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "ignoring malformed user counters");
            RecordCounters::default()
        });
        Ok(Self {
            profile,
            counters,
            raw,
        })
    }

    /// The record as a session identity.
    pub fn identity(&self) -> Result<Identity, serde_json::Error> {
        Identity::deserialize(&self.raw)
    }
}

/// Read-only usage summary shown next to the profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub posts_count: u64,
    pub connections_count: u64,
    /// `None` means the user has not been rated yet.
    pub rating: Option<f64>,
    pub profile_views: u64,
    pub join_date: Option<String>,
}

impl Stats {
    /// Rating to display, using `fallback` when the user has none yet.
    pub fn display_rating(&self, fallback: Option<f64>) -> Option<f64> {
        self.rating.or(fallback)
    }

    /// Calendar day of `join_date`. Accepts RFC 3339 timestamps, plain
    /// `YYYY-MM-DD` dates and epoch milliseconds; anything else yields `None`.
    pub fn joined_on(&self) -> Option<NaiveDate> {
        let raw = self.join_date.as_deref()?.trim();
        if let Ok(millis) = raw.parse::<i64>() {
            return DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.date_naive());
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc).date_naive())
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient user-visible message; the next outcome replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub text: String,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            text: text.into(),
        }
    }
}

// --- serde helpers ---

/// `null` decodes as the type's default.
fn nullable<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Text fields written by older clients sometimes hold numbers (`"year": 3`).
fn lenient_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Display-only values: a wrong type reads as `None` instead of failing the record.
fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(d)?).ok())
}

/// `createdAt` is an ISO string from the web client but `Date.now()` millis
/// from some seed scripts.
fn lenient_timestamp<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
