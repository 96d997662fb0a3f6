use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::contract::model::Identity;
use crate::domain::error::DomainError;
use crate::domain::ports::SessionStore;

/// Key under which the login flow stores the signed-in user.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Device-local key/value cache persisted as one JSON object.
///
/// Other keys in the file belong to other parts of the app and are preserved
/// on every write.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    key: String,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: CURRENT_USER_KEY.to_string(),
        }
    }

    /// Store the identity under a different key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, DomainError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(DomainError::session_cache(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(DomainError::session_cache(format!(
                "{} is not a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(DomainError::session_cache(format!(
                "cannot parse {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write_all(&self, map: &Map<String, Value>) -> Result<(), DomainError> {
        self.write_atomically(map).map_err(|e| {
            DomainError::session_cache(format!("cannot write {}: {e}", self.path.display()))
        })
    }

    fn write_atomically(&self, map: &Map<String, Value>) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let written = Self::write_file(&tmp, map).and_then(|()| fs::rename(&tmp, &self.path));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }

    fn write_file(path: &Path, map: &Map<String, Value>) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        serde_json::to_writer_pretty(&mut file, map)?;
        file.write_all(b"\n")?;
        file.sync_all()
    }
}

impl SessionStore for FileSessionStore {
    #[instrument(name = "profile_sync.session.active_identity", skip(self), fields(path = %self.path.display()))]
    fn active_identity(&self) -> Result<Option<Identity>, DomainError> {
        let mut map = self.read_all()?;
        match map.remove(&self.key) {
            None | Some(Value::Null) => {
                debug!("No cached user");
                Ok(None)
            }
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| DomainError::session_cache(format!("invalid cached user: {e}"))),
        }
    }

    #[instrument(name = "profile_sync.session.replace_identity", skip_all, fields(path = %self.path.display()))]
    fn replace_identity(&self, identity: &Identity) -> Result<(), DomainError> {
        let mut map = self.read_all()?;
        let value = serde_json::to_value(identity)
            .map_err(|e| DomainError::session_cache(format!("cannot encode user: {e}")))?;
        map.insert(self.key.clone(), value);
        self.write_all(&map)?;
        debug!("Cached user replaced");
        Ok(())
    }

    #[instrument(name = "profile_sync.session.clear", skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<(), DomainError> {
        let mut map = self.read_all()?;
        if map.remove(&self.key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileSessionStore {
        FileSessionStore::new(dir.path().join("session.json"))
    }

    #[test]
    fn missing_file_means_signed_out() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).active_identity().unwrap(), None);
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        // A directory in the way makes the final rename fail.
        fs::create_dir(dir.path().join("session.json")).unwrap();
        let s = store(&dir);

        let err = s.write_all(&Map::new()).unwrap_err();
        assert!(matches!(err, DomainError::SessionCache { .. }), "{err:?}");
        assert!(!dir.path().join("session.json.tmp").exists());
    }

    #[test]
    fn replace_then_read_keeps_extra_fields() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let mut identity = Identity::new(7, "a@b.com");
        identity.extra.insert("fullName".into(), json!("An"));
        identity.extra.insert("lookingFor".into(), json!({ "budget": "3tr" }));

        s.replace_identity(&identity).unwrap();
        assert_eq!(s.active_identity().unwrap(), Some(identity));
    }

    #[test]
    fn other_keys_survive_writes() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        fs::write(s.path(), r#"{"theme":"dark","currentUser":{"id":1,"email":"x@y.z"}}"#).unwrap();

        s.replace_identity(&Identity::new(2, "q@r.s")).unwrap();
        s.clear().unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(s.path()).unwrap()).unwrap();
        assert_eq!(raw, json!({ "theme": "dark" }));
        assert_eq!(s.active_identity().unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_a_cache_error() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        fs::write(s.path(), "{not json").unwrap();
        assert!(matches!(
            s.active_identity(),
            Err(DomainError::SessionCache { .. })
        ));

        fs::write(s.path(), "[1,2]").unwrap();
        assert!(s.active_identity().is_err());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let s = FileSessionStore::new(dir.path().join("nested/deeper/session.json"));
        s.replace_identity(&Identity::new("u-1", "a@b.com")).unwrap();
        assert!(s.path().exists());
    }

    #[test]
    fn custom_key() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir).with_key("user");
        s.replace_identity(&Identity::new(1, "a@b.com")).unwrap();
        let raw: Value = serde_json::from_str(&fs::read_to_string(s.path()).unwrap()).unwrap();
        assert_eq!(raw["user"]["email"], json!("a@b.com"));
        assert!(raw.get(CURRENT_USER_KEY).is_none());
    }
}
