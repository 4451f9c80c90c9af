//! Process-tree termination for backend test runs.
//!
//! The credential tests only need one capability from the host OS: "kill this pid and
//! everything it spawned". Unix gets there through process groups, Windows through
//! `taskkill /T`.

use std::io;

/// Host capability for force-terminating a backend process and its descendants.
pub trait ProcessTreeKiller: Send + Sync {
    /// Kill `pid` and its children. A pid that already exited is not an error.
    fn kill_tree(&self, pid: u32) -> io::Result<()>;
}

/// Platform-native tree killer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemKiller;

impl ProcessTreeKiller for SystemKiller {
    #[cfg(unix)]
    fn kill_tree(&self, pid: u32) -> io::Result<()> {
        let Ok(pid) = i32::try_from(pid) else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("pid {pid} out of range for signal delivery"),
            ));
        };
        signal_process_group_or_pid(pid, libc::SIGKILL, true)
    }

    #[cfg(windows)]
    fn kill_tree(&self, pid: u32) -> io::Result<()> {
        use std::process::Command;

        let output = Command::new("taskkill")
            .args(["/F", "/T", "/PID", &pid.to_string()])
            .output()?;
        tracing::debug!(
            pid,
            stdout = %String::from_utf8_lossy(&output.stdout).trim(),
            "taskkill finished"
        );
        // 128: process not found, it already exited on its own.
        match output.status.code() {
            Some(0) | Some(128) => Ok(()),
            _ => Err(io::Error::other(format!(
                "taskkill /PID {pid} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }

    #[cfg(not(any(unix, windows)))]
    fn kill_tree(&self, _pid: u32) -> io::Result<()> {
        Ok(())
    }
}

/// Send a signal to a process group first, then fall back to the direct pid.
///
/// Backend children are spawned as group leaders, so signaling `-pid` reaches
/// anything the interpreter forked. Callers choose whether a missing pid (`ESRCH`)
/// counts as success (already exited) or as an error.
#[cfg(unix)]
pub(crate) fn signal_process_group_or_pid(
    pid: i32,
    signal: i32,
    missing_is_ok: bool,
) -> io::Result<()> {
    if pid <= 0 {
        return Ok(());
    }

    // SAFETY: `libc::kill` takes plain integer pid/signal values. No pointers are
    // dereferenced and errno is read immediately after each call on this thread.
    unsafe {
        if libc::kill(-pid, signal) == 0 {
            return Ok(());
        }
        let group_err = io::Error::last_os_error();

        if libc::kill(pid, signal) == 0 {
            return Ok(());
        }
        let pid_err = io::Error::last_os_error();

        if missing_target_can_be_ignored(missing_is_ok, &pid_err) {
            return Ok(());
        }

        Err(io::Error::new(
            pid_err.kind(),
            format!(
                "group(-{pid}) signal failed: {group_err}; pid({pid}) signal failed: {pid_err}"
            ),
        ))
    }
}

#[cfg(unix)]
fn is_no_such_process(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(code) if code == libc::ESRCH)
}

#[cfg(unix)]
fn missing_target_can_be_ignored(missing_is_ok: bool, pid_err: &io::Error) -> bool {
    // Only the direct pid lookup reporting ESRCH means the target is really gone.
    missing_is_ok && is_no_such_process(pid_err)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::CommandExt;
    use std::process::{Command, Stdio};

    fn find_missing_pid() -> i32 {
        let high_pid = i32::MAX;
        // SAFETY: signal `0` only probes pid existence and delivers nothing.
        let high_res = unsafe { libc::kill(high_pid, 0) };
        let high_err = io::Error::last_os_error();
        if high_res != 0 && is_no_such_process(&high_err) {
            return high_pid;
        }

        // SAFETY: `getpid` has no preconditions.
        let current_pid = unsafe { libc::getpid() };
        let mut candidate = current_pid.saturating_add(10_000);
        for _ in 0..1000 {
            // SAFETY: probe-only signal.
            let res = unsafe { libc::kill(candidate, 0) };
            let err = io::Error::last_os_error();
            if res != 0 && is_no_such_process(&err) {
                return candidate;
            }
            candidate = candidate.saturating_add(1);
        }

        panic!("unable to find an unused pid for signal helper tests")
    }

    #[test]
    fn signal_helper_ignores_non_positive_pid() {
        assert!(signal_process_group_or_pid(0, 0, true).is_ok());
        assert!(signal_process_group_or_pid(-1, 0, false).is_ok());
    }

    #[test]
    fn signal_helper_missing_pid_is_optional_error() {
        let missing = find_missing_pid();
        assert!(signal_process_group_or_pid(missing, libc::SIGTERM, true).is_ok());
        assert!(signal_process_group_or_pid(missing, libc::SIGTERM, false).is_err());
    }

    #[test]
    fn signal_helper_optional_missing_requires_pid_esrch() {
        let pid_missing = io::Error::from_raw_os_error(libc::ESRCH);
        let pid_not_missing = io::Error::from_raw_os_error(libc::EPERM);

        assert!(missing_target_can_be_ignored(true, &pid_missing));
        assert!(!missing_target_can_be_ignored(true, &pid_not_missing));
        assert!(!missing_target_can_be_ignored(false, &pid_missing));
    }

    #[test]
    fn system_killer_treats_exited_pid_as_success() {
        let missing = u32::try_from(find_missing_pid()).expect("positive pid");
        assert!(SystemKiller.kill_tree(missing).is_ok());
    }

    #[test]
    fn system_killer_terminates_running_group_leader() {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdout(Stdio::null())
            .process_group(0)
            .spawn()
            .expect("spawn sleep");

        SystemKiller.kill_tree(child.id()).expect("kill sleep");
        let status = child.wait().expect("wait sleep");
        assert!(!status.success());
    }
}
