//! Error Module
//!
//! Every fatal condition of a modal session. Anything not listed here
//! (stray notifications, late protocol errors) is logged and ignored.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ModalError>;

#[derive(Debug, Error)]
pub enum ModalError {
    #[error("cannot open display: {0}")]
    Connect(#[from] ConnectError),

    #[error("display connection failed: {0}")]
    Connection(#[from] ConnectionError),

    #[error("display request failed: {0}")]
    Reply(#[from] ReplyError),

    #[error("cannot create host window: {0}")]
    HostWindow(#[from] ReplyOrIdError),

    #[error("no home directory")]
    NoHome,

    #[error("can't obtain lock {}: {source}", path.display())]
    LockHeld { path: PathBuf, source: io::Error },

    #[error("can't release lock {}: {source}", path.display())]
    LockRelease { path: PathBuf, source: io::Error },

    #[error("cannot grab focus after {0} attempts")]
    FocusExhausted(u32),

    #[error("cannot grab keyboard after {0} attempts")]
    KeyboardExhausted(u32),

    #[error("cannot start {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("waiting for child failed: {0}")]
    Wait(io::Error),

    #[error("child process terminated unexpectedly (signal {0})")]
    ChildSignaled(i32),
}
