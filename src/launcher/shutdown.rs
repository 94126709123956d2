//! Cancellation escalation for a supervised child
//!
//! Policy: interrupt first so the tool can clean up partial files, wait a
//! bounded grace period, then kill outright and reap the real exit status.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Child;
use tokio::time::timeout;
use tracing::debug;

/// Send an interrupt to the child without waiting
///
/// On unix this is SIGINT, the same signal a Ctrl-C in a terminal would
/// deliver. Elsewhere there is no interrupt equivalent; the forced-kill
/// phase of [`reap_cancelled`] handles termination.
pub(crate) fn interrupt(child: &Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = child.id()
            && let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGINT)
            && e != nix::errno::Errno::ESRCH
        {
            // ESRCH just means the child beat us to the exit
            debug!(%pid, error = %e, "failed to interrupt child");
        }
    }

    #[cfg(not(unix))]
    {
        let _ = child;
    }
}

/// Reap a cancelled child
///
/// Gives the child `grace` to react to the interrupt; if it is still
/// running afterwards it is killed outright. Always returns the child's
/// real exit status, never a fabricated one.
pub(crate) async fn reap_cancelled(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    match timeout(grace, child.wait()).await {
        Ok(status) => status,
        Err(_) => {
            debug!("child ignored interrupt, escalating to forced kill");
            child.kill().await?;
            child.wait().await
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tokio::process::Command;

    #[tokio::test]
    #[cfg(unix)]
    async fn interrupted_child_exits_within_grace() {
        // sleep dies to SIGINT, so the forced-kill phase is never reached
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();

        interrupt(&child);
        let status = reap_cancelled(&mut child, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn stubborn_child_is_killed_after_grace() {
        // A shell that traps INT keeps running until the forced kill
        let mut child = Command::new("sh")
            .arg("-c")
            .arg("trap '' INT; sleep 30")
            .spawn()
            .unwrap();

        interrupt(&child);
        let status = reap_cancelled(&mut child, Duration::from_millis(200))
            .await
            .unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    async fn interrupt_on_exited_child_is_harmless() {
        let mut child = Command::new("echo").arg("done").spawn().unwrap();
        child.wait().await.unwrap();
        interrupt(&child);
    }
}
