//! Background shell jobs.
//!
//! Jobs are plain child processes. Nothing waits on them: the loop calls
//! [BgJobs::poll] between key reads and collects whatever has exited.

use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

/// Finished jobs remembered for the jobs menu; older ones are forgotten first.
pub const FINISHED_KEPT: usize = 16;

/// A running or finished job.
#[derive(Debug)]
pub struct Job {
    id: u32,
    cmd: String,
    child: Child,
    status: Option<ExitStatus>,
}

impl Job {
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.status.is_none()
    }
}

/// Job that exited since the last poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedJob {
    pub id: u32,
    pub cmd: String,
    pub success: bool,
    pub code: Option<i32>,
}

#[derive(Debug, Default)]
pub struct BgJobs {
    jobs: Vec<Job>,
    next_id: u32,
}

impl BgJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `cmd` through `sh -c` in `cwd` with no access to the terminal.
    pub fn spawn(&mut self, cmd: &str, cwd: &Path) -> io::Result<u32> {
        let child = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        self.next_id += 1;
        let id = self.next_id;
        tracing::info!(id, cmd, pid = child.id(), "background job started");
        self.jobs.push(Job {
            id,
            cmd: cmd.to_string(),
            child,
            status: None,
        });
        Ok(id)
    }

    /// Collects jobs that exited since the last call. Never blocks.
    pub fn poll(&mut self) -> Vec<FinishedJob> {
        let mut finished = Vec::new();
        for job in self.jobs.iter_mut().filter(|j| j.status.is_none()) {
            match job.child.try_wait() {
                Ok(Some(status)) => {
                    job.status = Some(status);
                    tracing::info!(id = job.id, %status, "background job finished");
                    finished.push(FinishedJob {
                        id: job.id,
                        cmd: job.cmd.clone(),
                        success: status.success(),
                        code: status.code(),
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(id = job.id, error = %e, "could not poll background job");
                }
            }
        }
        if !finished.is_empty() {
            self.trim_finished();
        }
        finished
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn running(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_running()).count()
    }

    /// Forgets finished jobs, keeping running ones.
    pub fn prune(&mut self) {
        self.jobs.retain(Job::is_running);
    }

    fn trim_finished(&mut self) {
        let finished = self.jobs.len() - self.running();
        let mut excess = finished.saturating_sub(FINISHED_KEPT);
        self.jobs.retain(|job| {
            if excess > 0 && !job.is_running() {
                excess -= 1;
                false
            } else {
                true
            }
        });
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn poll_until_done(jobs: &mut BgJobs) -> Vec<FinishedJob> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut done = Vec::new();
        while Instant::now() < deadline {
            done.extend(jobs.poll());
            if jobs.running() == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        done
    }

    #[test]
    fn finished_jobs_are_reported_once() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut jobs = BgJobs::new();
        let ok = jobs.spawn("touch created", dir.path())?;
        let bad = jobs.spawn("exit 3", dir.path())?;

        let done = poll_until_done(&mut jobs);
        assert_eq!(done.len(), 2);
        let ok_job = done.iter().find(|j| j.id == ok).ok_or("missing job")?;
        assert!(ok_job.success);
        let bad_job = done.iter().find(|j| j.id == bad).ok_or("missing job")?;
        assert_eq!(bad_job.code, Some(3));
        assert!(dir.path().join("created").exists());

        assert!(jobs.poll().is_empty());
        jobs.prune();
        assert!(jobs.jobs().is_empty());
        Ok(())
    }

    #[test]
    fn finished_history_is_capped() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut jobs = BgJobs::new();
        let total = FINISHED_KEPT + 4;
        for _ in 0..total {
            jobs.spawn("true", dir.path())?;
        }

        let done = poll_until_done(&mut jobs);
        assert_eq!(done.len(), total);
        assert_eq!(jobs.jobs().len(), FINISHED_KEPT);
        assert!(jobs.jobs().iter().all(|job| !job.is_running()));
        Ok(())
    }
}
