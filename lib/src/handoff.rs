//! Short-lived storage carrying the candidate's name and email from the entry
//! step to the test-taking step.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::HandoffError;
use crate::helpers::{read_optional, remove_if_exists, write_data};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CandidateIdentity {
    pub name: String,
    pub email: String,
}

impl CandidateIdentity {
    pub fn new(name: &str, email: &str) -> Result<Self, HandoffError> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() {
            return Err(HandoffError::MissingField("name"));
        }
        if email.is_empty() {
            return Err(HandoffError::MissingField("email"));
        }

        Ok(Self {
            name: name.to_owned(),
            email: email.to_owned(),
        })
    }
}

/// Keyed by test code so parallel attempts at different tests stay apart.
pub trait HandoffStore: Send + Sync {
    fn save(&self, test_code: &str, identity: &CandidateIdentity) -> Result<(), HandoffError>;
    fn load(&self, test_code: &str) -> Result<Option<CandidateIdentity>, HandoffError>;
    fn clear(&self, test_code: &str) -> Result<(), HandoffError>;
}

#[derive(Debug, Default)]
pub struct MemoryHandoff {
    entries: Mutex<HashMap<String, CandidateIdentity>>,
}

impl MemoryHandoff {
    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, CandidateIdentity>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl HandoffStore for MemoryHandoff {
    fn save(&self, test_code: &str, identity: &CandidateIdentity) -> Result<(), HandoffError> {
        self.entries()
            .insert(test_code.to_owned(), identity.clone());
        Ok(())
    }

    fn load(&self, test_code: &str) -> Result<Option<CandidateIdentity>, HandoffError> {
        Ok(self.entries().get(test_code).cloned())
    }

    fn clear(&self, test_code: &str) -> Result<(), HandoffError> {
        self.entries().remove(test_code);
        Ok(())
    }
}

/// One JSON file per test code inside `dir`.
#[derive(Debug, Clone)]
pub struct FileHandoff {
    dir: PathBuf,
}

impl FileHandoff {
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, test_code: &str) -> PathBuf {
        let safe_code: String = test_code
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();

        self.dir.join(format!("candidate-{safe_code}.json"))
    }
}

impl HandoffStore for FileHandoff {
    fn save(&self, test_code: &str, identity: &CandidateIdentity) -> Result<(), HandoffError> {
        let data = serde_json::to_string_pretty(identity)?;

        write_data(self.path(test_code), data)?;
        Ok(())
    }

    fn load(&self, test_code: &str) -> Result<Option<CandidateIdentity>, HandoffError> {
        match read_optional(self.path(test_code))? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    fn clear(&self, test_code: &str) -> Result<(), HandoffError> {
        remove_if_exists(self.path(test_code))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> CandidateIdentity {
        CandidateIdentity::new(" Ada ", "ada@example.com").unwrap()
    }

    #[test]
    fn identity_requires_both_fields() {
        assert_eq!(identity().name, "Ada");
        assert!(matches!(
            CandidateIdentity::new("Ada", "  "),
            Err(HandoffError::MissingField("email"))
        ));
        assert!(matches!(
            CandidateIdentity::new("", "ada@example.com"),
            Err(HandoffError::MissingField("name"))
        ));
    }

    #[test]
    fn file_handoff_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHandoff::new(dir.path().to_path_buf());

        assert_eq!(store.load("abc123").unwrap(), None);
        store.save("abc123", &identity()).unwrap();
        assert_eq!(store.load("abc123").unwrap(), Some(identity()));
        assert_eq!(store.load("other").unwrap(), None);

        store.clear("abc123").unwrap();
        assert_eq!(store.load("abc123").unwrap(), None);
        store.clear("abc123").unwrap();
    }

    #[test]
    fn file_names_are_sanitized() {
        let store = FileHandoff::new(PathBuf::from("/tmp"));
        assert_eq!(
            store.path("../etc/passwd"),
            PathBuf::from("/tmp/candidate-___etc_passwd.json")
        );
    }

    #[test]
    fn memory_handoff_is_keyed_by_test_code() {
        let store = MemoryHandoff::default();
        store.save("one", &identity()).unwrap();

        assert!(store.load("one").unwrap().is_some());
        assert!(store.load("two").unwrap().is_none());
        store.clear("one").unwrap();
        assert!(store.load("one").unwrap().is_none());
    }
}
