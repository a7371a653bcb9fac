//! Bot process supervision
//!
//! The lifecycle manager plus the Unix process layer it drives. All
//! decisions about whether a bot is "really" running come from probing the
//! OS here, never from trusting the registry's cached fields.

mod manager;
mod process;

pub use manager::{BotManager, ManagerConfig, CREDENTIAL_ENV_VAR, DB_URI_ENV_VAR};
pub use process::{is_pid_alive, terminate};
