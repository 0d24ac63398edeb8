//! Process utilities: launching user commands and child reaping.
use crate::{Error, Result};
use nix::{
    sys::{
        signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal},
        wait::{waitpid, WaitPidFlag, WaitStatus},
    },
    unistd::setsid,
};
use std::{
    io,
    os::unix::process::CommandExt,
    process::{Command, Stdio},
};
use tracing::debug;

/// Set SIGCHLD to be ignored with NOCLDWAIT so spawned children are reaped
/// by the kernel, then collect any zombies inherited from whatever started
/// us. Call once before the manager runs.
pub fn init_signals() -> Result<()> {
    let sa = SigAction::new(
        SigHandler::SigIgn,
        SaFlags::SA_NOCLDSTOP | SaFlags::SA_NOCLDWAIT | SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    unsafe { sigaction(Signal::SIGCHLD, &sa)? };

    loop {
        match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(_) => continue,
        }
    }

    Ok(())
}

/// Launch an external command, fully detached: its own session, default
/// signal handling and no stdio tied to ours.
pub fn spawn(argv: &[&str]) -> Result<()> {
    let (cmd, args) = argv
        .split_first()
        .ok_or_else(|| Error::InvalidConfig("spawn requires a command".to_string()))?;

    debug!(?argv, "spawning subprocess");

    let mut command = Command::new(cmd);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    unsafe {
        command.pre_exec(|| {
            setsid().map_err(to_io)?;
            // the child should see stock SIGCHLD behavior, not our NOCLDWAIT
            let sa = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
            sigaction(Signal::SIGCHLD, &sa).map_err(to_io)?;

            Ok(())
        });
    }

    command.spawn()?;

    Ok(())
}

fn to_io(e: nix::errno::Errno) -> io::Error {
    io::Error::from_raw_os_error(e as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_rejects_an_empty_argv() {
        assert!(spawn(&[]).is_err());
    }
}
