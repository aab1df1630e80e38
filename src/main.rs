//! main.rs
//! Entry point for twinpane

use twinpane::app::App;
use twinpane::config::Config;
use twinpane::core::{ipc, terminal, terminal::Tui};
use twinpane::error::Result;
use twinpane::utils::cli::{CliAction, handle_args};
use twinpane::utils::{logging, resolve_path};

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = crossterm::execute!(
            stdout,
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        );

        tracing::error!(%info, "panic");
        eprintln!("\n[twinpane] Error occurred: {}", info);

        #[cfg(debug_assertions)]
        {
            let bt = std::backtrace::Backtrace::force_capture();
            eprintln!("\nStack Backtrace:\n{}", bt);
        }
    }));

    let (path_arg, server_name) = match handle_args() {
        CliAction::Exit => return Ok(()),
        CliAction::Remote { cmd, server_name } => {
            let config = Config::load();
            let name = server_name.as_deref().unwrap_or(config.general().server_name());
            if let Err(e) = ipc::send(name, &cmd) {
                eprintln!("[twinpane] Error: {}", e);
                std::process::exit(1);
            }
            return Ok(());
        }
        CliAction::RunApp { path, server_name } => (path, server_name),
    };

    let _log_guard = logging::init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let mut config = Config::load();
    if let Some(name) = server_name {
        config.general_mut().set_server_name(&name);
    }

    let cwd = std::env::current_dir()?;
    let start_dir = match path_arg {
        Some(arg) => {
            match std::fs::canonicalize(resolve_path(&cwd, &arg)) {
                Ok(target) if target.is_dir() => target,
                _ => {
                    eprintln!("\n[twinpane] Error: Path '{}' cannot be opened.", arg);
                    std::process::exit(1);
                }
            }
        }
        None => cwd,
    };

    let (min_width, min_height) = config.general().min_size();
    let app = App::new(config, &start_dir)?;
    let tui = Tui::new(min_width, min_height)?;
    let mut app = app.with_tui(tui);
    let result = terminal::run_terminal(&mut app);
    if let Err(e) = &result {
        tracing::error!(error = %e, "main loop failed");
    }
    result
}
