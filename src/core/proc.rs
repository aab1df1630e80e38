//! Process control helpers.
//!
//! [stop_process_group] implements Ctrl-Z: the whole process group is stopped the way a
//! shell would stop it. [run_foreground] runs an external program (the editor) that
//! takes over the terminal until it exits.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

/// Sends SIGTSTP to our own process group. Returns once the group is continued.
#[cfg(unix)]
pub fn stop_process_group() -> io::Result<()> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    kill(Pid::from_raw(0), Signal::SIGTSTP).map_err(io::Error::from)
}

#[cfg(not(unix))]
pub fn stop_process_group() -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "job control is not available on this platform",
    ))
}

/// Runs `program path` in the foreground and waits for it.
pub fn run_foreground(program: &str, path: &Path) -> io::Result<ExitStatus> {
    tracing::debug!(program, path = %path.display(), "running foreground program");
    Command::new(program).arg(path).status()
}
