//! Bounded input polling.
//!
//! There is only one blocking primitive in the loop: reading a key with a timeout.
//! [poll] splits the wait into short reads and runs the non-blocking work (background
//! jobs, IPC, directory checks, deferred redraws) between them, so that none of it
//! waits for a key press to be noticed.

use crate::core::host::{Host, ModeKind, Side};
use crate::core::updates;
use crate::error::Result;

use std::time::Duration;

/// Reads per chunk while an IPC server listens, so remote commands are picked up sooner.
const IPC_READS_PER_CHUNK: u32 = 10;

/// Outcome of one [poll].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polled {
    Key(char),
    Timeout,
}

/// Waits up to `total` for a key while keeping the rest of the world up to date.
///
/// The wait is consumed in chunks no longer than `min_slice`. Every chunk polls
/// background jobs, flushes scheduled updates and checks the panes' directories, then
/// performs its reads, polling IPC and flushing again around each one.
pub fn poll<H: Host + ?Sized>(host: &mut H, total: Duration, min_slice: Duration) -> Result<Polled> {
    let reads = if host.ipc_enabled() && host.ipc_has_listener() {
        IPC_READS_PER_CHUNK
    } else {
        1
    };

    let min_slice = min_slice.max(Duration::from_millis(1));
    let mut remaining = total;
    loop {
        host.poll_jobs();
        updates::flush(host);

        if should_check_views_for_changes(host) {
            host.check_for_changes(Side::Active);
            host.check_for_changes(Side::Other);
        }

        let slice = remaining.min(min_slice) / reads;
        for _ in 0..reads {
            host.poll_ipc();

            if let Some(c) = host.read_key(slice)? {
                return Ok(Polled::Key(c));
            }

            updates::flush(host);
        }

        remaining = remaining.saturating_sub(min_slice);
        if remaining.is_zero() {
            return Ok(Polled::Timeout);
        }
    }
}

fn should_check_views_for_changes<H: Host + ?Sized>(host: &H) -> bool {
    !host.is_multiline()
        && !host.is_menu_like()
        && !matches!(host.current_mode(), ModeKind::CmdLine | ModeKind::Msg)
}
