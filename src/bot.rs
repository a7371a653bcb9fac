//! Bot records and lifecycle states
//!
//! Defines the BotRecord struct that represents a registered bot worker
//! process and its associated source, launch configuration, and run state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Bot run-state indicator
///
/// A bot is `Running` exactly when the registry holds a pid for it; the
/// supervisor re-checks the OS before trusting either value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotStatus {
    /// Bot has no live process
    Stopped,

    /// Bot has a (believed) live process
    Running,
}

impl BotStatus {
    /// Storage/display form of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
        }
    }

    /// Check if the bot is recorded as running
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl std::fmt::Display for BotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a bot's code came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotSource {
    /// Code already present on disk
    Local {
        /// Working directory the bot runs in
        path: PathBuf,
    },

    /// Code cloned from a remote repository
    Remote {
        /// Repository URL the code was cloned from
        url: String,

        /// Working directory the clone landed in
        path: PathBuf,
    },
}

impl BotSource {
    /// The on-disk directory the bot runs in
    pub fn local_path(&self) -> &Path {
        match self {
            Self::Local { path } => path,
            Self::Remote { path, .. } => path,
        }
    }

    /// The remote URL, if the bot was ingested from one
    pub fn repo_url(&self) -> Option<&str> {
        match self {
            Self::Local { .. } => None,
            Self::Remote { url, .. } => Some(url),
        }
    }
}

/// A registered bot as persisted in the registry
#[derive(Debug, Clone)]
pub struct BotRecord {
    /// Unique identifier (SQLite rowid)
    pub id: i64,

    /// Unique human-readable name
    pub name: String,

    /// Where the code lives and where it came from
    pub source: BotSource,

    /// Entrypoint file, relative to the source directory (or absolute)
    pub entrypoint: String,

    /// Secret handed to the process via its environment at launch
    pub credential: String,

    /// Optional extra environment value (database URI)
    pub extra_env: Option<String>,

    /// Last recorded run state
    pub status: BotStatus,

    /// Last recorded process id, present exactly when status is running
    pub pid: Option<i32>,

    /// When the bot was registered (ISO-8601, UTC)
    pub created_at: String,

    /// When status/pid last changed (ISO-8601, UTC)
    pub updated_at: String,
}

impl BotRecord {
    /// File name this bot's output is appended to under the logs directory
    pub fn log_file_name(&self) -> String {
        format!("bot_{}_{}.log", self.id, self.name)
    }

    /// Credential-free view for listings and JSON output
    pub fn summary(&self) -> BotSummary {
        BotSummary {
            id: self.id,
            name: self.name.clone(),
            status: self.status,
            pid: self.pid,
            repo_url: self.source.repo_url().map(|u| u.to_string()),
            local_path: self.source.local_path().display().to_string(),
            entrypoint: self.entrypoint.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// Registration request for a new bot
#[derive(Debug, Clone)]
pub struct BotSpec {
    /// Unique name to register under
    pub name: String,

    /// Where the code lives
    pub source: BotSource,

    /// Entrypoint file, relative to the source directory (or absolute)
    pub entrypoint: String,

    /// Secret handed to the process via its environment at launch
    pub credential: String,

    /// Optional extra environment value (database URI)
    pub extra_env: Option<String>,
}

impl BotSpec {
    /// Create a new registration request
    pub fn new(
        name: impl Into<String>,
        source: BotSource,
        entrypoint: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            entrypoint: entrypoint.into(),
            credential: credential.into(),
            extra_env: None,
        }
    }

    /// Set the extra environment value
    pub fn with_extra_env(mut self, value: impl Into<String>) -> Self {
        self.extra_env = Some(value.into());
        self
    }
}

/// How a caller referred to a bot on the command line
///
/// Raw identifiers are classified once, at the boundary: a string of ASCII
/// digits that fits in an i64 is an id, anything else is a name. The text as
/// typed travels with the parsed id, so a bot whose name happens to be
/// numeric stays reachable even when the digits don't round-trip (a name
/// like "0042" classifies as id 42; the fallback looks up "0042", not "42").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotSelector {
    /// Numeric registry id
    ById {
        /// Parsed id, tried first
        id: i64,

        /// Identifier text as typed, used for the name fallback and in
        /// not-found messages
        raw: String,
    },

    /// Registered name
    ByName(String),
}

impl BotSelector {
    /// Selector for a known registry id
    pub fn by_id(id: i64) -> Self {
        Self::ById {
            id,
            raw: id.to_string(),
        }
    }

    /// Classify a raw identifier string
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(id) = raw.parse::<i64>() {
                return Self::ById {
                    id,
                    raw: raw.to_string(),
                };
            }
        }
        Self::ByName(raw.to_string())
    }
}

impl std::fmt::Display for BotSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ById { raw, .. } => write!(f, "{}", raw),
            Self::ByName(name) => write!(f, "{}", name),
        }
    }
}

/// Credential-free listing row
#[derive(Debug, Clone, Serialize)]
pub struct BotSummary {
    /// Unique identifier
    pub id: i64,

    /// Unique name
    pub name: String,

    /// Last recorded run state
    pub status: BotStatus,

    /// Last recorded process id
    pub pid: Option<i32>,

    /// Repository URL, if ingested from one
    pub repo_url: Option<String>,

    /// On-disk directory the bot runs in
    pub local_path: String,

    /// Entrypoint file
    pub entrypoint: String,

    /// When the bot was registered
    pub created_at: String,

    /// When status/pid last changed
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(BotStatus::Running.is_running());
        assert!(!BotStatus::Stopped.is_running());
        assert_eq!(BotStatus::Running.as_str(), "running");
        assert_eq!(BotStatus::Stopped.as_str(), "stopped");
    }

    #[test]
    fn test_source_accessors() {
        let local = BotSource::Local {
            path: PathBuf::from("/srv/bots/echo"),
        };
        assert_eq!(local.local_path(), Path::new("/srv/bots/echo"));
        assert_eq!(local.repo_url(), None);

        let remote = BotSource::Remote {
            url: "https://example.com/bots/echo.git".to_string(),
            path: PathBuf::from("/srv/bots/echo"),
        };
        assert_eq!(remote.local_path(), Path::new("/srv/bots/echo"));
        assert_eq!(remote.repo_url(), Some("https://example.com/bots/echo.git"));
    }

    #[test]
    fn test_selector_parse_numeric() {
        assert_eq!(BotSelector::parse("42"), BotSelector::by_id(42));
        // Leading zeros parse as the id but keep the text as typed
        assert_eq!(
            BotSelector::parse("0042"),
            BotSelector::ById {
                id: 42,
                raw: "0042".to_string(),
            }
        );
        assert_eq!(BotSelector::parse("0042").to_string(), "0042");
    }

    #[test]
    fn test_selector_parse_name() {
        assert_eq!(
            BotSelector::parse("echo-bot"),
            BotSelector::ByName("echo-bot".to_string())
        );
        assert_eq!(BotSelector::parse(""), BotSelector::ByName(String::new()));
        // Digits with other characters mixed in are a name
        assert_eq!(
            BotSelector::parse("42abc"),
            BotSelector::ByName("42abc".to_string())
        );
    }

    #[test]
    fn test_selector_parse_overflow_falls_back_to_name() {
        let huge = "99999999999999999999999999";
        assert_eq!(
            BotSelector::parse(huge),
            BotSelector::ByName(huge.to_string())
        );
    }

    #[test]
    fn test_bot_spec_builder() {
        let spec = BotSpec::new(
            "echo",
            BotSource::Local {
                path: PathBuf::from("/srv/bots/echo"),
            },
            "main.py",
            "token-123",
        )
        .with_extra_env("sqlite:///bots.db");

        assert_eq!(spec.name, "echo");
        assert_eq!(spec.entrypoint, "main.py");
        assert_eq!(spec.credential, "token-123");
        assert_eq!(spec.extra_env, Some("sqlite:///bots.db".to_string()));
    }

    #[test]
    fn test_log_file_name() {
        let record = BotRecord {
            id: 7,
            name: "echo".to_string(),
            source: BotSource::Local {
                path: PathBuf::from("/srv/bots/echo"),
            },
            entrypoint: "main.py".to_string(),
            credential: "token".to_string(),
            extra_env: None,
            status: BotStatus::Stopped,
            pid: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        };
        assert_eq!(record.log_file_name(), "bot_7_echo.log");
    }

    #[test]
    fn test_summary_has_no_credential() {
        let record = BotRecord {
            id: 1,
            name: "echo".to_string(),
            source: BotSource::Remote {
                url: "https://example.com/echo.git".to_string(),
                path: PathBuf::from("/srv/bots/echo"),
            },
            entrypoint: "main.py".to_string(),
            credential: "super-secret".to_string(),
            extra_env: None,
            status: BotStatus::Running,
            pid: Some(4242),
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-02T00:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&record.summary()).unwrap();
        assert!(!json.contains("super-secret"));
        assert!(!json.contains("credential"));
        assert!(json.contains("\"status\":\"running\""));
        assert!(json.contains("\"pid\":4242"));
    }
}
