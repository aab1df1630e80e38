//! The main loop.
//!
//! One iteration: readiness gate, pre-dispatch hooks, one bounded wait for a key, one
//! pass of the key state machine and, if a command ran to completion, the
//! post-dispatch hooks.
//!
//! [run] is reentrant. A command that needs an answer (a confirmation dialog) calls it
//! again with its own [QuitFlag]; the nested invocation publishes its own input echo
//! and restores the outer one when it returns.

use crate::core::host::{Host, QuitFlag};
use crate::core::keys::{LoopContext, Step};
use crate::core::multiplexer;
use crate::core::readiness;
use crate::error::Result;

/// Runs the loop until `quit` is set.
pub fn run<H: Host + ?Sized>(host: &mut H, quit: &QuitFlag) -> Result<()> {
    let mut ctx = LoopContext::enter(host);
    tracing::debug!(depth = host.input_echo().depth(), "event loop entered");

    let result = drive(host, quit, &mut ctx);

    ctx.leave(host);
    tracing::debug!(depth = host.input_echo().depth(), "event loop left");
    result
}

fn drive<H: Host + ?Sized>(host: &mut H, quit: &QuitFlag, ctx: &mut LoopContext) -> Result<()> {
    while !quit.is_set() {
        if !readiness::check_and_prepare(host)? {
            ctx.cancel_wait_for_enter();
            continue;
        }

        host.set_user_selection(true);
        host.pre();
        sync_cwd(host);

        let polled = multiplexer::poll(host, ctx.timeout(), ctx.settings().min_slice)?;

        if ctx.step(host, polled) == Step::Resolved {
            // Commands may have changed directory.
            sync_cwd(host);
            host.post();
        }
    }
    Ok(())
}

/// Points the process working directory at the active pane.
fn sync_cwd<H: Host + ?Sized>(host: &mut H) {
    let dir = host.active_dir();
    if let Err(e) = host.change_dir(&dir) {
        tracing::debug!(dir = %dir.display(), error = %e, "could not change working directory");
    }
}
