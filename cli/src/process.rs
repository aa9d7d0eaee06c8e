//! Child process ownership for per-item commands.

use std::io;
use std::process::ExitStatus;

use tokio::process::{Child, Command};

/// Kills a spawned child (its whole process group on Unix) unless it was reaped.
///
/// An item's future owns the guard, so dropping the future (timeout, aborted run)
/// takes the child down with it. [`ChildGuard::wait`] disarms the guard once the
/// child has exited on its own.
#[derive(Debug)]
pub struct ChildGuard {
    child: Option<Child>,
}

impl ChildGuard {
    /// Spawn `cmd` in a fresh process group and take ownership of the child.
    pub fn spawn(cmd: &mut Command) -> io::Result<Self> {
        #[cfg(unix)]
        cmd.process_group(0);
        let child = cmd.spawn()?;
        Ok(Self { child: Some(child) })
    }

    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        let Some(child) = self.child.as_mut() else {
            return Err(io::Error::other("child already reaped"));
        };
        let status = child.wait().await?;
        self.child = None;
        Ok(status)
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        // Dropping a tokio `Child` hands it to the runtime's orphan reaper.
        let Some(mut child) = self.child.take() else {
            return;
        };
        let pid = child.id();
        match kill_tree(&mut child) {
            Ok(()) => tracing::trace!(?pid, "killed unfinished child"),
            Err(err) => tracing::debug!(?pid, %err, "failed to kill unfinished child"),
        }
    }
}

/// SIGKILL the child's process group, falling back to the child alone.
fn kill_tree(child: &mut Child) -> io::Result<()> {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // SAFETY: killpg takes no pointers; the group was created for this child.
        if unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) } == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        tracing::trace!(pid, %err, "killpg failed, killing the child only");
    }
    child.start_kill()
}
