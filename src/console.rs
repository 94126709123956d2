//! Visible-console launching via a detected terminal emulator
//!
//! Some requests want a terminal window the user can watch instead of
//! captured output. For those the target command is wrapped in a terminal
//! emulator invocation: the emulator becomes the spawned executable and the
//! original command is passed behind its "run this" flag. The spawn is fire
//! and forget; no output capture, no wait, no cancellation.

use crate::config::LaunchConfig;
use crate::error::{Error, LaunchError, Result};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::{debug, warn};

/// A terminal emulator and the flag that makes it execute a command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalDescriptor {
    /// Executable name of the terminal emulator
    pub name: &'static str,
    /// Flag telling the emulator to run the following command instead of
    /// opening a shell
    pub exec_flag: &'static str,
}

/// Ordered preference list of known terminal emulators
const TERMINALS: &[TerminalDescriptor] = &[
    TerminalDescriptor {
        name: "gnome-terminal",
        exec_flag: "--",
    },
    TerminalDescriptor {
        name: "konsole",
        exec_flag: "-e",
    },
    TerminalDescriptor {
        name: "xterm",
        exec_flag: "-e",
    },
];

static RESOLVED: OnceLock<Option<TerminalDescriptor>> = OnceLock::new();

/// Resolve the first installed terminal emulator from the preference list
///
/// The result is cached process-wide: it depends only on which binaries are
/// installed, never on request content. Not finding any emulator is a
/// configuration error, since visible-console mode is impossible on such a system.
pub fn resolve_terminal() -> Result<TerminalDescriptor> {
    RESOLVED
        .get_or_init(|| resolve_terminal_with(|name| which::which(name).is_ok()))
        .clone()
        .ok_or_else(|| Error::config("no supported terminal emulator found on this system"))
}

/// Resolve against an arbitrary presence predicate
///
/// Probes the preference list in order and returns the first entry the
/// predicate accepts. Exposed separately so resolution is testable without
/// touching the real PATH.
pub fn resolve_terminal_with(present: impl Fn(&str) -> bool) -> Option<TerminalDescriptor> {
    TERMINALS.iter().find(|t| present(t.name)).cloned()
}

/// Fire-and-forget launcher for user-visible terminal windows
#[derive(Clone, Debug, Default)]
pub struct ConsoleLauncher {
    config: LaunchConfig,
}

impl ConsoleLauncher {
    /// Create a console launcher with the given configuration
    pub fn new(config: LaunchConfig) -> Self {
        Self { config }
    }

    /// Launch an executable, optionally inside a new terminal window
    ///
    /// With `show_console` the argument vector is rewritten so the resolved
    /// terminal emulator is the spawned executable and the original command
    /// runs inside it; without it the executable is spawned directly. Either
    /// way the child is detached from the caller's lifetime: this returns as
    /// soon as the spawn succeeds and a background task reaps the child
    /// whenever it exits.
    pub async fn launch_visible(
        &self,
        executable: impl Into<PathBuf>,
        args: Vec<String>,
        show_console: bool,
    ) -> Result<()> {
        let executable = executable.into();
        let exe_len = executable.as_os_str().len();
        if exe_len > self.config.max_exe_path_len {
            return Err(Error::config_key(
                format!(
                    "executable path is {exe_len} bytes, limit is {}",
                    self.config.max_exe_path_len
                ),
                "max_exe_path_len",
            ));
        }

        let (executable, args) = if show_console {
            let terminal = resolve_terminal()?;
            console_command(&terminal, &executable, args)
        } else {
            (executable, args)
        };

        debug!(executable = %executable.display(), ?args, "spawning detached process");

        let mut child = Command::new(&executable)
            .args(&args)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                executable: executable.clone(),
                source,
            })?;

        // Reap in the background so the detached child never lingers as a zombie
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(?status, "detached process exited"),
                Err(e) => warn!(error = %e, "failed to wait for detached process"),
            }
        });

        Ok(())
    }
}

/// Rewrite a command so it runs inside the given terminal emulator
///
/// The original executable and arguments are passed verbatim behind the
/// emulator's exec flag; nothing ever goes through a shell.
fn console_command(
    terminal: &TerminalDescriptor,
    executable: &Path,
    args: Vec<String>,
) -> (PathBuf, Vec<String>) {
    let mut wrapped = Vec::with_capacity(args.len() + 2);
    wrapped.push(terminal.exec_flag.to_string());
    wrapped.push(executable.display().to_string());
    wrapped.extend(args);
    (PathBuf::from(terminal.name), wrapped)
}
