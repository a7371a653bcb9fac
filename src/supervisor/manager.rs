//! Bot lifecycle manager
//!
//! Translates identifiers into live-process decisions: spawning bot
//! processes detached with output appended to per-bot log files, delivering
//! termination signals, and keeping the registry's status/pid in sync with
//! what the OS actually reports.

use super::process;
use crate::bot::{BotRecord, BotSelector, BotSpec, BotStatus, BotSummary};
use crate::registry::Registry;
use crate::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Environment variable the credential is injected under at launch
pub const CREDENTIAL_ENV_VAR: &str = "DISCORD_TOKEN";

/// Environment variable the optional database URI is injected under at launch
pub const DB_URI_ENV_VAR: &str = "BOT_DB_URI";

/// Supervisor configuration
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Directory bot log files are appended under
    pub logs_dir: PathBuf,

    /// Program used to launch bot entrypoints
    pub runtime: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        let mut logs_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        logs_dir.push(".config");
        logs_dir.push("botyard");
        logs_dir.push("logs");

        Self {
            logs_dir,
            runtime: "python3".to_string(),
        }
    }
}

/// Bot lifecycle manager
///
/// Owns an explicit registry handle and runs every operation to completion
/// on the calling thread. Spawning is fire-and-forget: the child is never
/// waited on or reaped here, and the log file handle is released as soon as
/// the spawn call returns. Concurrent invocations racing on the same bot are
/// tolerated rather than locked out; each operation re-probes the OS, so the
/// next call self-corrects whatever the last registry write recorded.
pub struct BotManager {
    registry: Registry,
    config: ManagerConfig,
}

impl BotManager {
    /// Create a manager over an open registry
    pub fn new(registry: Registry, config: ManagerConfig) -> Self {
        Self { registry, config }
    }

    /// Access the underlying registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a new bot and return its id
    pub fn register(&self, spec: &BotSpec) -> Result<i64> {
        let id = self.registry.create(spec)?;
        info!(id, name = %spec.name, "Registered bot");
        Ok(id)
    }

    /// Credential-free summaries of all registered bots, sorted by name
    pub fn list(&self) -> Result<Vec<BotSummary>> {
        let bots = self.registry.list_all()?;
        Ok(bots.iter().map(BotRecord::summary).collect())
    }

    /// Resolve an identifier to its full record
    pub fn describe(&self, selector: &BotSelector) -> Result<BotRecord> {
        self.resolve(selector)
    }

    /// Start a bot's process and return its pid
    ///
    /// Idempotent: when the stored pid is still alive, the running state is
    /// reasserted and that pid returned without spawning anything. On spawn
    /// failure the registry is left untouched, so a retry is safe.
    pub fn start(&self, selector: &BotSelector) -> Result<i32> {
        let record = self.resolve(selector)?;

        if let Some(pid) = record.pid {
            if process::is_pid_alive(pid) {
                debug!(id = record.id, pid, "Bot already running");
                self.registry
                    .update_status(record.id, BotStatus::Running, Some(pid))?;
                return Ok(pid);
            }
        }

        let entrypoint = resolve_entrypoint(&record);
        if !entrypoint.is_file() {
            return Err(crate::BotyardError::EntrypointMissing(entrypoint));
        }

        std::fs::create_dir_all(&self.config.logs_dir)?;
        let log_path = self.config.logs_dir.join(record.log_file_name());
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let mut command = Command::new(&self.config.runtime);
        command
            .arg(&entrypoint)
            .current_dir(record.source.local_path())
            .env(CREDENTIAL_ENV_VAR, &record.credential)
            .stdin(Stdio::null())
            .stdout(log_file.try_clone()?)
            .stderr(log_file);

        if let Some(ref uri) = record.extra_env {
            command.env(DB_URI_ENV_VAR, uri);
        }

        let child = command.spawn().map_err(|e| {
            crate::BotyardError::Spawn(format!("{}: {}", self.config.runtime, e))
        })?;

        let pid = child.id() as i32;
        self.registry
            .update_status(record.id, BotStatus::Running, Some(pid))?;

        info!(
            id = record.id,
            name = %record.name,
            pid,
            log = %log_path.display(),
            "Started bot"
        );
        Ok(pid)
    }

    /// Stop a bot's process
    ///
    /// Fire-and-forget: the signal is delivered (SIGTERM, or SIGKILL when
    /// `force` is set) and the registry reconciled to stopped without
    /// waiting for the process to actually exit. Return does not imply the
    /// child is gone yet. Signal delivery failure is downgraded to a
    /// warning; reconciliation happens regardless.
    pub fn stop(&self, selector: &BotSelector, force: bool) -> Result<()> {
        let record = self.resolve(selector)?;

        let live_pid = record.pid.filter(|&pid| process::is_pid_alive(pid));

        match live_pid {
            None => {
                debug!(id = record.id, "Bot already stopped");
                self.registry
                    .update_status(record.id, BotStatus::Stopped, None)?;
                Ok(())
            }
            Some(pid) => {
                if let Err(e) = process::terminate(pid, force) {
                    warn!(id = record.id, pid, error = %e, "Failed to signal bot process");
                }

                self.registry
                    .update_status(record.id, BotStatus::Stopped, None)?;

                info!(id = record.id, name = %record.name, pid, force, "Stopped bot");
                Ok(())
            }
        }
    }

    /// Observe a bot's current run state
    ///
    /// Always re-probes the OS rather than trusting the stored field, and
    /// writes the observation back only when the stored state diverges.
    pub fn status(&self, selector: &BotSelector) -> Result<BotStatus> {
        let record = self.resolve(selector)?;

        let alive = record.pid.map(process::is_pid_alive).unwrap_or(false);
        let observed = if alive {
            BotStatus::Running
        } else {
            BotStatus::Stopped
        };

        let stale_pid = !alive && record.pid.is_some();
        if observed != record.status || stale_pid {
            debug!(
                id = record.id,
                stored = %record.status,
                observed = %observed,
                "Reconciling stored status with observed state"
            );
            let pid = if alive { record.pid } else { None };
            self.registry.update_status(record.id, observed, pid)?;
        }

        Ok(observed)
    }

    /// Resolve a selector, preferring id lookup for numeric identifiers
    ///
    /// A numeric identifier that misses as an id falls back to a name
    /// lookup on the identifier text as typed, so bots with all-digit names
    /// stay reachable; when both interpretations could match, the id wins.
    fn resolve(&self, selector: &BotSelector) -> Result<BotRecord> {
        let record = match selector {
            BotSelector::ById { id, raw } => match self.registry.get_by_id(*id)? {
                Some(record) => Some(record),
                None => self.registry.get_by_name(raw)?,
            },
            BotSelector::ByName(name) => self.registry.get_by_name(name)?,
        };

        record.ok_or_else(|| crate::BotyardError::BotNotFound(selector.to_string()))
    }
}

/// Resolve a record's entrypoint: absolute as-is, relative joined to its
/// local path
fn resolve_entrypoint(record: &BotRecord) -> PathBuf {
    let entrypoint = Path::new(&record.entrypoint);
    if entrypoint.is_absolute() {
        entrypoint.to_path_buf()
    } else {
        record.source.local_path().join(entrypoint)
    }
}
