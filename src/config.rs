// Settings module: where the contact form lives and where the three local
// files are kept. Everything is resolved once at startup and passed down,
// so nothing below `main` reads the environment.

use std::path::{Path, PathBuf};

/// Production GraphQL endpoint behind the representative's contact form.
pub const DEFAULT_ENDPOINT: &str = "https://foushee.house.gov/graphql";

/// Environment variable that points the tool at another endpoint, for
/// example a local mock server while testing changes.
pub const ENDPOINT_VAR: &str = "DEAR_REP_ENDPOINT";

pub const PROFILE_FILE: &str = "sender-data.json";
pub const SUBJECT_FILE: &str = "subject.txt";
pub const MESSAGE_FILE: &str = "message.txt";

#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: String,
    pub profile_path: PathBuf,
    pub subject_path: PathBuf,
    pub message_path: PathBuf,
}

impl Settings {
    /// Settings rooted at the current working directory, with the endpoint
    /// taken from `DEAR_REP_ENDPOINT` or falling back to production.
    pub fn from_env() -> Self {
        let endpoint = std::env::var(ENDPOINT_VAR).unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
        Settings::in_dir(".").with_endpoint(endpoint)
    }

    /// Settings whose local files all live under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Settings {
            endpoint: DEFAULT_ENDPOINT.into(),
            profile_path: dir.join(PROFILE_FILE),
            subject_path: dir.join(SUBJECT_FILE),
            message_path: dir.join(MESSAGE_FILE),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}
