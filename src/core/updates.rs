//! Deferred screen updates.
//!
//! Views never repaint or reload themselves on the spot; they schedule a
//! [ScheduledEvent] and the loop flushes it here, between key reads and after every
//! resolved command.

use crate::core::host::{Host, ModeKind, ScheduledEvent, Side};

/// Performs every scheduled update. Calling it again with nothing scheduled is a no-op.
pub fn flush<H: Host + ?Sized>(host: &mut H) {
    if host.take_redraw_request() {
        host.redraw_all();
    }

    // Menus cover the panes, reloading under them would only move their cursors.
    if host.primary_mode() != ModeKind::Menu {
        for side in Side::BOTH {
            flush_view(host, side);
        }
    }
}

fn flush_view<H: Host + ?Sized>(host: &mut H, side: Side) {
    if !host.shows_dirlist(side) {
        return;
    }

    match host.take_scheduled_event(side) {
        ScheduledEvent::None => {}
        ScheduledEvent::Redraw => host.redraw_view(side),
        ScheduledEvent::Reload => {
            host.reload(side, true);
            if side == Side::Active && !host.is_multiline() {
                host.update_ruler();
            }
        }
        ScheduledEvent::FullReload => host.reload(side, false),
    }
}
