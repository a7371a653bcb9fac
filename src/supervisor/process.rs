//! OS process probing and signalling
//!
//! Thin Unix layer under the lifecycle manager: existence checks via a
//! no-op kill, termination via SIGTERM/SIGKILL.

use crate::Result;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

/// Check whether a process with this pid currently exists
///
/// Sends signal 0, which performs permission and existence checking without
/// delivering anything. EPERM means the process exists but belongs to
/// another user; that still counts as alive, so a pid we cannot verify we
/// own is never double-launched over.
pub fn is_pid_alive(pid: i32) -> bool {
    if pid <= 0 {
        return false;
    }

    let result = unsafe { libc::kill(pid, 0) };
    if result == 0 {
        return true;
    }

    let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
    errno == libc::EPERM
}

/// Deliver a termination signal
///
/// SIGTERM by default, SIGKILL when `force` is set. A target that is
/// already gone (ESRCH) is not an error; the process exiting between probe
/// and signal is an expected race.
pub fn terminate(pid: i32, force: bool) -> Result<()> {
    let sig = if force {
        Signal::SIGKILL
    } else {
        Signal::SIGTERM
    };

    match signal::kill(Pid::from_raw(pid), sig) {
        Ok(()) => {
            tracing::debug!(pid, signal = %sig, "Delivered signal");
            Ok(())
        }
        Err(Errno::ESRCH) => {
            tracing::debug!(pid, "Process already gone");
            Ok(())
        }
        Err(err) => Err(crate::BotyardError::Signal(format!(
            "kill({}, {}) failed: {}",
            pid, sig, err
        ))),
    }
}
