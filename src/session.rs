//! Session Module
//!
//! One modal session from lock to teardown: connect, spawn the child, run the
//! embedder until its window goes away, reap the child and restore focus.
//! Every path out of `run` releases the lock.

use anyhow::{bail, Result};
use std::ffi::OsString;
use tracing::{error, info};

use crate::config::Config;
use crate::display::DisplayService;
use crate::embedder::Embedder;
use crate::lock::LockGuard;
use crate::supervisor::Supervisor;

/// Take the lock, run the session, and release the lock whatever happened.
/// The display is only connected once the lock is held.
pub fn run<D, F>(config: &Config, argv: &[OsString], connect: F) -> Result<u8>
where
    D: DisplayService,
    F: FnOnce() -> crate::error::Result<D>,
{
    if argv.is_empty() {
        bail!("usage: modal <command> [args...]");
    }

    let mut lock = LockGuard::new(config.lock_path()?);
    lock.acquire()?;

    let outcome = session(config, argv, connect);
    let released = lock.release();

    match (outcome, released) {
        (Ok(code), Ok(())) => Ok(code),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(release)) => {
            error!("{}", release);
            Err(e)
        }
    }
}

/// Host window, child, event loop, then reap and tear down
fn session<D, F>(config: &Config, argv: &[OsString], connect: F) -> Result<u8>
where
    D: DisplayService,
    F: FnOnce() -> crate::error::Result<D>,
{
    let mut display = connect()?;
    let previous_focus = display.input_focus()?;

    let child = Supervisor::spawn(&config.embed_env, display.host(), argv)?;

    let mut embedder = Embedder::new(display, config.grab.clone());
    // a failure here abandons the child; it is not reaped
    embedder.run()?;

    let code = child.wait()?;
    info!("child process exited with {}", code);

    embedder.shutdown(previous_focus)?;
    Ok(code)
}
