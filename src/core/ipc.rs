//! Inter-process command channel.
//!
//! A running instance listens on a Unix socket named after its server name. Another
//! invocation (`twp --remote ...`) connects and writes command lines, one per line.
//!
//! The accept loop runs on its own thread and forwards lines through a crossbeam
//! channel; the main loop only ever calls [IpcServer::try_recv], which never blocks.

use crate::error::{Error, Result};

use crossbeam_channel::{Receiver, TryRecvError, unbounded};

use std::path::PathBuf;

pub const DEFAULT_SERVER_NAME: &str = "twinpane";

/// Location of the socket for `name`.
pub fn socket_path(name: &str) -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("twinpane")
        .join(format!("{name}.sock"))
}

pub struct IpcServer {
    name: String,
    path: PathBuf,
    rx: Receiver<String>,
}

impl IpcServer {
    /// Returns the next received command line, if any.
    ///
    /// An error means the listener thread is gone and nothing will arrive any more.
    pub fn try_recv(&self) -> Result<Option<String>> {
        match self.rx.try_recv() {
            Ok(line) => Ok(Some(line)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Error::Ipc {
                name: self.name.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "listener stopped",
                ),
            }),
        }
    }

    /// A server whose listener has already stopped.
    #[cfg(test)]
    pub(crate) fn stopped(name: &str) -> Self {
        let (_, rx) = unbounded();
        Self {
            name: name.to_string(),
            path: std::env::temp_dir().join(format!("twinpane-{name}-stopped.sock")),
            rx,
        }
    }
}

#[cfg(unix)]
mod imp {
    use super::*;

    use std::io::{self, BufRead, BufReader, Write};
    use std::os::unix::net::{UnixListener, UnixStream};
    use std::thread;

    impl IpcServer {
        /// Binds the socket for `name` and starts accepting connections.
        ///
        /// A leftover socket from a crashed instance is replaced; a live one is an error.
        pub fn start(name: &str) -> Result<Self> {
            let path = socket_path(name);
            let ipc_err = |source: io::Error| Error::Ipc {
                name: name.to_string(),
                source,
            };

            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir).map_err(ipc_err)?;
            }

            if path.exists() {
                if UnixStream::connect(&path).is_ok() {
                    return Err(ipc_err(io::Error::new(
                        io::ErrorKind::AddrInUse,
                        "another instance is listening",
                    )));
                }
                std::fs::remove_file(&path).map_err(ipc_err)?;
            }

            let listener = UnixListener::bind(&path).map_err(ipc_err)?;
            let (tx, rx) = unbounded::<String>();

            thread::Builder::new()
                .name("ipc-listener".into())
                .spawn(move || {
                    for stream in listener.incoming() {
                        let stream = match stream {
                            Ok(s) => s,
                            Err(e) => {
                                tracing::warn!(error = %e, "IPC accept failed");
                                continue;
                            }
                        };
                        for line in BufReader::new(stream).lines() {
                            let Ok(line) = line else { break };
                            let line = line.trim().to_string();
                            if line.is_empty() {
                                continue;
                            }
                            if tx.send(line).is_err() {
                                return;
                            }
                        }
                    }
                })
                .map_err(ipc_err)?;

            tracing::info!(path = %path.display(), "IPC server listening");
            Ok(Self {
                name: name.to_string(),
                path,
                rx,
            })
        }
    }

    impl Drop for IpcServer {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    /// Sends one command line to the instance listening as `name`.
    pub fn send(name: &str, cmd: &str) -> Result<()> {
        let ipc_err = |source: io::Error| Error::Ipc {
            name: name.to_string(),
            source,
        };
        let mut stream = UnixStream::connect(socket_path(name)).map_err(ipc_err)?;
        writeln!(stream, "{}", cmd.trim()).map_err(ipc_err)?;
        stream.flush().map_err(ipc_err)?;
        Ok(())
    }
}

#[cfg(not(unix))]
mod imp {
    use super::*;
    use std::io;

    fn unsupported(name: &str) -> Error {
        Error::Ipc {
            name: name.to_string(),
            source: io::Error::new(io::ErrorKind::Unsupported, "IPC needs Unix sockets"),
        }
    }

    impl IpcServer {
        pub fn start(name: &str) -> Result<Self> {
            Err(unsupported(name))
        }
    }

    pub fn send(name: &str, _cmd: &str) -> Result<()> {
        Err(unsupported(name))
    }
}

pub use imp::send;

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn remote_lines_arrive_in_order() -> Result<()> {
        let name = format!("test-{}", std::process::id());
        let server = IpcServer::start(&name)?;
        send(&name, "cd /tmp")?;
        send(&name, "  echo hi  ")?;

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut got = Vec::new();
        while got.len() < 2 && Instant::now() < deadline {
            match server.try_recv()? {
                Some(line) => got.push(line),
                None => std::thread::sleep(Duration::from_millis(5)),
            }
        }
        assert_eq!(got, ["cd /tmp", "echo hi"]);
        assert!(server.try_recv()?.is_none());
        Ok(())
    }

    #[test]
    fn stopped_listener_is_an_error() {
        let server = IpcServer::stopped(&format!("gone-{}", std::process::id()));
        assert!(matches!(server.try_recv(), Err(Error::Ipc { .. })));
    }

    #[test]
    fn second_server_with_same_name_fails() -> Result<()> {
        let name = format!("dup-{}", std::process::id());
        let _first = IpcServer::start(&name)?;
        assert!(matches!(IpcServer::start(&name), Err(Error::Ipc { .. })));
        Ok(())
    }
}
