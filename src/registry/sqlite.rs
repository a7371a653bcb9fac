//! SQLite registry implementation

use crate::bot::{BotRecord, BotSource, BotSpec, BotStatus};
use crate::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Registry configuration
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Path to SQLite database file
    pub path: PathBuf,

    /// Enable WAL mode for better concurrency
    pub wal_mode: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        // Always use ~/.config for consistency across platforms (macOS, Linux)
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("botyard");
        path.push("registry.db");

        Self {
            path,
            wal_mode: true,
        }
    }
}

/// SQLite-backed registry of bot records
///
/// Stored status/pid reflect the last transition this tool performed, not
/// live truth; the supervisor re-probes the OS and writes corrections back
/// through `update_status`. Callers keep the pair consistent: a running
/// status is stored with a pid, a stopped status with none.
pub struct Registry {
    conn: Connection,
    config: RegistryConfig,
}

impl Registry {
    /// Open or create a registry database
    pub fn new(config: RegistryConfig) -> Result<Self> {
        // Create parent directory if needed
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %config.path.display(), "Opening registry database");

        let conn = Connection::open(&config.path)?;

        // Enable WAL mode for better concurrency
        if config.wal_mode {
            conn.pragma_update(None, "journal_mode", &"WAL")?;
        }

        let registry = Self { conn, config };
        registry.init_schema()?;

        Ok(registry)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS bots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                repo_url TEXT,
                local_path TEXT NOT NULL,
                entrypoint TEXT NOT NULL,
                credential TEXT NOT NULL,
                extra_env TEXT,
                status TEXT NOT NULL DEFAULT 'stopped',
                pid INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_bots_status ON bots(status);
            "#,
        )?;

        Ok(())
    }

    /// Insert a new bot and return its id
    ///
    /// New bots start stopped with no pid. A name collision maps the
    /// underlying unique-constraint failure to `DuplicateName`.
    pub fn create(&self, spec: &BotSpec) -> Result<i64> {
        let now = now_timestamp();

        let result = self.conn.execute(
            r#"
            INSERT INTO bots (
                name, repo_url, local_path, entrypoint, credential,
                extra_env, status, pid, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                &spec.name,
                spec.source.repo_url(),
                spec.source.local_path().to_string_lossy(),
                &spec.entrypoint,
                &spec.credential,
                spec.extra_env.as_deref(),
                BotStatus::Stopped.as_str(),
                Option::<i32>::None,
                &now,
                &now,
            ],
        );

        match result {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                tracing::debug!(id, name = %spec.name, "Inserted bot record");
                Ok(id)
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(crate::BotyardError::DuplicateName(spec.name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a bot by id
    pub fn get_by_id(&self, id: i64) -> Result<Option<BotRecord>> {
        let record = self
            .conn
            .query_row(
                r#"
                SELECT id, name, repo_url, local_path, entrypoint, credential,
                       extra_env, status, pid, created_at, updated_at
                FROM bots WHERE id = ?
                "#,
                params![id],
                row_to_record,
            )
            .optional()?;

        Ok(record)
    }

    /// Fetch a bot by name
    pub fn get_by_name(&self, name: &str) -> Result<Option<BotRecord>> {
        let record = self
            .conn
            .query_row(
                r#"
                SELECT id, name, repo_url, local_path, entrypoint, credential,
                       extra_env, status, pid, created_at, updated_at
                FROM bots WHERE name = ?
                "#,
                params![name],
                row_to_record,
            )
            .optional()?;

        Ok(record)
    }

    /// Fetch all bots, sorted by name
    pub fn list_all(&self) -> Result<Vec<BotRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, repo_url, local_path, entrypoint, credential,
                   extra_env, status, pid, created_at, updated_at
            FROM bots ORDER BY name
            "#,
        )?;

        let rows = stmt.query_map([], row_to_record)?;

        let mut bots = Vec::new();
        for row in rows {
            bots.push(row?);
        }

        Ok(bots)
    }

    /// Record a run-state transition
    ///
    /// Updates status, pid, and updated_at in a single statement so no
    /// reader ever observes a half-applied transition.
    pub fn update_status(&self, id: i64, status: BotStatus, pid: Option<i32>) -> Result<()> {
        let now = now_timestamp();

        let updated = self.conn.execute(
            "UPDATE bots SET status = ?, pid = ?, updated_at = ? WHERE id = ?",
            params![status.as_str(), pid, &now, id],
        )?;

        if updated == 0 {
            return Err(crate::BotyardError::RecordNotFound(id));
        }

        tracing::debug!(id, status = %status, ?pid, "Updated bot status");
        Ok(())
    }

    /// Get the database path
    pub fn path(&self) -> &Path {
        &self.config.path
    }
}

/// Map a full bots row to a record
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<BotRecord> {
    let repo_url: Option<String> = row.get(2)?;
    let local_path: String = row.get(3)?;

    let source = match repo_url {
        Some(url) => BotSource::Remote {
            url,
            path: PathBuf::from(local_path),
        },
        None => BotSource::Local {
            path: PathBuf::from(local_path),
        },
    };

    Ok(BotRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        source,
        entrypoint: row.get(4)?,
        credential: row.get(5)?,
        extra_env: row.get(6)?,
        status: str_to_status(row.get::<_, String>(7)?.as_str()),
        pid: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

// Helper functions for type conversions

fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn str_to_status(s: &str) -> BotStatus {
    match s {
        "running" => BotStatus::Running,
        _ => BotStatus::Stopped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_registry() -> (Registry, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let config = RegistryConfig {
            path: temp_file.path().to_path_buf(),
            wal_mode: false,
        };
        (Registry::new(config).unwrap(), temp_file)
    }

    fn echo_spec(name: &str) -> BotSpec {
        BotSpec::new(
            name,
            BotSource::Local {
                path: PathBuf::from("/srv/bots").join(name),
            },
            "main.py",
            "token-123",
        )
    }

    #[test]
    fn test_registry_creation() {
        let (registry, _file) = test_registry();
        assert!(registry.path().exists());
    }

    #[test]
    fn test_create_and_get() {
        let (registry, _file) = test_registry();

        let id = registry.create(&echo_spec("echo")).unwrap();
        assert!(id > 0);

        let record = registry.get_by_id(id).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.name, "echo");
        assert_eq!(record.entrypoint, "main.py");
        assert_eq!(record.credential, "token-123");
        assert_eq!(record.extra_env, None);
        assert_eq!(record.status, BotStatus::Stopped);
        assert_eq!(record.pid, None);
        assert_eq!(record.created_at, record.updated_at);
        // Second-resolution ISO-8601 in UTC, e.g. 2025-01-01T00:00:00Z
        assert_eq!(record.created_at.len(), 20);
        assert!(record.created_at.ends_with('Z'));

        let by_name = registry.get_by_name("echo").unwrap().unwrap();
        assert_eq!(by_name.id, id);
    }

    #[test]
    fn test_remote_source_roundtrip() {
        let (registry, _file) = test_registry();

        let spec = BotSpec::new(
            "remote-bot",
            BotSource::Remote {
                url: "https://example.com/bots/remote.git".to_string(),
                path: PathBuf::from("/srv/bots/remote-bot"),
            },
            "main.py",
            "token",
        )
        .with_extra_env("sqlite:///bots.db");

        let id = registry.create(&spec).unwrap();
        let record = registry.get_by_id(id).unwrap().unwrap();

        assert_eq!(
            record.source.repo_url(),
            Some("https://example.com/bots/remote.git")
        );
        assert_eq!(
            record.source.local_path(),
            Path::new("/srv/bots/remote-bot")
        );
        assert_eq!(record.extra_env, Some("sqlite:///bots.db".to_string()));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let (registry, _file) = test_registry();

        let first_id = registry.create(&echo_spec("echo")).unwrap();
        let err = registry.create(&echo_spec("echo")).unwrap_err();

        assert!(matches!(err, crate::BotyardError::DuplicateName(name) if name == "echo"));

        // The original record is untouched by the failed insert
        let record = registry.get_by_name("echo").unwrap().unwrap();
        assert_eq!(record.id, first_id);
        assert_eq!(registry.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let (registry, _file) = test_registry();

        assert!(registry.get_by_id(999).unwrap().is_none());
        assert!(registry.get_by_name("ghost").unwrap().is_none());
    }

    #[test]
    fn test_list_sorted_by_name() {
        let (registry, _file) = test_registry();

        registry.create(&echo_spec("zulu")).unwrap();
        registry.create(&echo_spec("alpha")).unwrap();
        registry.create(&echo_spec("mike")).unwrap();

        let names: Vec<String> = registry
            .list_all()
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();

        assert_eq!(names, vec!["alpha", "mike", "zulu"]);
    }

    #[test]
    fn test_update_status() {
        let (registry, _file) = test_registry();

        let id = registry.create(&echo_spec("echo")).unwrap();

        registry
            .update_status(id, BotStatus::Running, Some(4242))
            .unwrap();
        let record = registry.get_by_id(id).unwrap().unwrap();
        assert_eq!(record.status, BotStatus::Running);
        assert_eq!(record.pid, Some(4242));

        registry.update_status(id, BotStatus::Stopped, None).unwrap();
        let record = registry.get_by_id(id).unwrap().unwrap();
        assert_eq!(record.status, BotStatus::Stopped);
        assert_eq!(record.pid, None);
    }

    #[test]
    fn test_update_missing_record() {
        let (registry, _file) = test_registry();

        let err = registry
            .update_status(999, BotStatus::Stopped, None)
            .unwrap_err();
        assert!(matches!(err, crate::BotyardError::RecordNotFound(999)));
    }

    #[test]
    fn test_numeric_name_is_stored_verbatim() {
        let (registry, _file) = test_registry();

        let id = registry.create(&echo_spec("42")).unwrap();
        let record = registry.get_by_name("42").unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.name, "42");
    }
}
