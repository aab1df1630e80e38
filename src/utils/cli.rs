//! Command-line argument parsing and help for twinpane.
//!
//! When invoked with no args/flags (twp), twinpane simply launches the TUI in the
//! current directory.

#[derive(Debug, PartialEq, Eq)]
pub enum CliAction {
    RunApp {
        path: Option<String>,
        server_name: Option<String>,
    },
    /// Send one command line to a running instance and exit.
    Remote {
        cmd: String,
        server_name: Option<String>,
    },
    Exit,
}

pub fn handle_args() -> CliAction {
    parse_args(std::env::args().skip(1))
}

/// Parses the arguments following the program name.
pub fn parse_args<I>(args: I) -> CliAction
where
    I: IntoIterator<Item = String>,
{
    let mut path = None;
    let mut remote = None;
    let mut server_name = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-v" => {
                print_version();
                return CliAction::Exit;
            }
            "-h" | "--help" => {
                print_help();
                return CliAction::Exit;
            }
            "--remote" | "--server-name" => {
                let Some(value) = args.next().filter(|v| !v.trim().is_empty()) else {
                    eprintln!("Error: {arg} needs a value.");
                    eprintln!("Try --help for available options");
                    return CliAction::Exit;
                };
                if arg == "--remote" {
                    remote = Some(value);
                } else {
                    server_name = Some(value);
                }
            }
            arg if !arg.starts_with('-') && !arg.trim().is_empty() => {
                if path.is_some() {
                    eprintln!("Error: twinpane opens only one directory.");
                    eprintln!("Usage: twp [PATH] or twp [OPTION]");
                    return CliAction::Exit;
                }
                path = Some(arg.to_string());
            }
            arg => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Try --help for available options");
                return CliAction::Exit;
            }
        }
    }

    match remote {
        Some(_) if path.is_some() => {
            eprintln!("Error: --remote does not take a PATH.");
            CliAction::Exit
        }
        Some(cmd) => CliAction::Remote { cmd, server_name },
        None => CliAction::RunApp { path, server_name },
    }
}

fn print_version() {
    println!("twinpane {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    println!(
        r#"twinpane - A keyboard-driven two-pane terminal file manager

USAGE:
  twp [PATH] [--server-name NAME]
  twp --remote COMMAND [--server-name NAME]

PATH:
  Directory to open (defaults to current directory)

OPTIONS:
      --remote CMD        Run a command line (e.g. "cd /tmp") in a running instance
      --server-name NAME  Name of the IPC server to listen as or send to
  -h, --help              Print help information
  -v, --version           Display the current installed version of twinpane

ENVIRONMENT:
  TWINPANE_CONFIG         Override the default config path
  TWINPANE_LOG            Log filter, e.g. "debug" or "twinpane::core=trace"
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        parse_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_arguments_runs_in_cwd() {
        assert_eq!(
            parse(&[]),
            CliAction::RunApp {
                path: None,
                server_name: None
            }
        );
    }

    #[test]
    fn server_name_goes_with_path_or_remote() {
        assert_eq!(
            parse(&["/tmp", "--server-name", "left"]),
            CliAction::RunApp {
                path: Some("/tmp".into()),
                server_name: Some("left".into())
            }
        );
        assert_eq!(
            parse(&["--server-name", "left", "--remote", "cd /tmp"]),
            CliAction::Remote {
                cmd: "cd /tmp".into(),
                server_name: Some("left".into())
            }
        );
    }

    #[test]
    fn malformed_arguments_exit() {
        assert_eq!(parse(&["--remote"]), CliAction::Exit);
        assert_eq!(parse(&["a", "b"]), CliAction::Exit);
        assert_eq!(parse(&["--remote", "q", "/tmp"]), CliAction::Exit);
        assert_eq!(parse(&["--bogus"]), CliAction::Exit);
    }
}
