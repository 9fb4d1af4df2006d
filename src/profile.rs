// Sender profile: the name, address and email that sign every message.
// Collected once, saved as a flat JSON object next to the message files.

use crate::prompt::Prompter;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Every field the contact form needs, in prompt order, with the label
/// shown to the operator.
pub const FIELDS: &[(&str, &str)] = &[
    ("country", "country (probably USA)"),
    ("street", "street address (like 123 Wherever St.)"),
    ("city", "city (like Durham)"),
    ("state", "state (probably NC)"),
    ("zip", "zip code (like 27713-1234)"),
    ("prefix", "name prefix (like Mx./Mr./Ms.)"),
    ("first", "first name"),
    ("last", "last name"),
    ("email", "email address"),
];

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a JSON object of strings", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Key/value record of sender details. Keys outside `FIELDS` found in a
/// saved file are kept, and stay available as placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenderProfile(BTreeMap<String, String>);

impl SenderProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value of a key known to be present. Empty when it is not, which only
    /// happens for a profile that skipped `collect_missing_fields`.
    pub fn field(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Required fields this profile does not have yet, in prompt order.
    pub fn missing_fields(&self) -> impl Iterator<Item = &'static (&'static str, &'static str)> + '_ {
        FIELDS.iter().filter(move |(key, _)| !self.contains(key))
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().next().is_none()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SenderProfile {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        SenderProfile(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The JSON file a profile is kept in.
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProfileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved profile. `Ok(None)` means no profile has been saved yet.
    pub fn load(&self) -> Result<Option<SenderProfile>, ProfileError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ProfileError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let profile = serde_json::from_str(&data).map_err(|source| ProfileError::Parse {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "loaded sender profile");
        Ok(Some(profile))
    }

    pub fn save(&self, profile: &SenderProfile) -> Result<(), ProfileError> {
        let write_err = |source: io::Error| ProfileError::Write {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string(profile).map_err(|e| write_err(e.into()))?;
        std::fs::write(&self.path, json).map_err(write_err)?;
        tracing::debug!(path = %self.path.display(), "saved sender profile");
        Ok(())
    }
}

/// Prompt for every required field `profile` is missing. Each answer is
/// echoed back and must be confirmed; a rejected answer is asked again.
/// Fields already present are left alone. Nothing is saved here.
pub fn collect_missing_fields<P, W>(profile: &mut SenderProfile, prompter: &mut P, out: &mut W) -> Result<()>
where
    P: Prompter + ?Sized,
    W: Write + ?Sized,
{
    let missing: Vec<_> = profile.missing_fields().collect();
    for (key, label) in missing {
        loop {
            let value = prompter.input(&format!("Enter your {}", label))?;
            writeln!(out, "You entered: {}. If correct, type 'y'.", value)?;
            if prompter.confirm("Correct")? {
                profile.insert(*key, value);
                break;
            }
        }
    }
    Ok(())
}
