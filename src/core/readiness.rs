//! Terminal readiness gate run at the top of every loop iteration.

use crate::core::host::{Host, TerminalState};
use crate::error::Result;

/// Makes sure the terminal can be used for this iteration.
///
/// Returns `false` when the terminal is too small; by then the notice has been shown
/// and a wake-up (resize) received, and the caller should start the iteration over.
pub fn check_and_prepare<H: Host + ?Sized>(host: &mut H) -> Result<bool> {
    match host.refresh_terminal_state() {
        TerminalState::TooSmall => {
            host.show_too_small();
            host.wait_for_wake()?;
            Ok(false)
        }
        TerminalState::BackToNormal => {
            // Keys typed while the terminal was unusable were never seen by the user.
            host.drain_input()?;
            host.set_terminal_state(TerminalState::Normal);
            host.redraw_all();

            host.set_pinned(false);
            host.show_message("");
            tracing::debug!("terminal usable again");
            Ok(true)
        }
        TerminalState::Normal => Ok(true),
    }
}
