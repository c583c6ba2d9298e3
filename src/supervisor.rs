//! Supervisor Module
//!
//! Starts the embedded program with the host window id in its environment
//! and reaps it once the session is over.

use std::ffi::OsString;
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command};
use tracing::{debug, info};
use x11rb::protocol::xproto::Window;

use crate::error::{ModalError, Result};

/// Handle on the spawned child process
pub struct Supervisor {
    child: Child,
}

impl Supervisor {
    /// Start `argv` with `env_var` set to the decimal id of `host`
    pub fn spawn(env_var: &str, host: Window, argv: &[OsString]) -> Result<Self> {
        let Some((program, args)) = argv.split_first() else {
            return Err(ModalError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        let child = Command::new(program)
            .args(args)
            .env(env_var, host.to_string())
            .spawn()
            .map_err(|source| ModalError::Spawn {
                program: program.to_string_lossy().into_owned(),
                source,
            })?;

        info!(
            "Spawned {:?} (pid {}) with {}={}",
            program,
            child.id(),
            env_var,
            host
        );

        Ok(Self { child })
    }

    /// Block until the child exits and return its exit code.
    /// A child killed by a signal is fatal.
    pub fn wait(mut self) -> Result<u8> {
        let status = self.child.wait().map_err(ModalError::Wait)?;
        debug!("Child {} finished: {:?}", self.child.id(), status);

        match status.code() {
            // exit codes are 0..=255 on unix
            Some(code) => Ok(code as u8),
            None => Err(ModalError::ChildSignaled(status.signal().unwrap_or(0))),
        }
    }
}
