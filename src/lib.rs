//! modal
//!
//! Runs one program inside an override-redirect host window and embeds the
//! first window it creates there via XEmbed, centered and holding the
//! keyboard grab until that window goes away.

pub mod config;
pub mod display;
pub mod embedder;
pub mod error;
pub mod grab;
pub mod lock;
pub mod logging;
pub mod session;
pub mod supervisor;
pub mod xembed;

#[cfg(test)]
mod testing;
