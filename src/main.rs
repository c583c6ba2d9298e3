//! modal: run a program as a modal XEmbed client
//!
//! `modal <command> [args...]` exits with the command's own exit status,
//! or 1 if anything fails before or around it.

use std::ffi::OsString;
use std::process::ExitCode;

use tracing::error;

use modal::config::Config;
use modal::display::X11Display;
use modal::logging;
use modal::session;

fn main() -> ExitCode {
    let argv: Vec<OsString> = std::env::args_os().skip(1).collect();

    // the trace file location comes from the config, so loading is traced to stderr only
    let config = tracing::dispatcher::with_default(
        &logging::bootstrap(std::io::stderr),
        Config::load,
    );
    let log_path = match &config {
        Ok(config) => config.log_path(),
        Err(_) => Ok(None),
    };
    let traced = log_path
        .map_err(anyhow::Error::from)
        .and_then(|path| logging::init(path.as_deref()));
    if let Err(e) = traced {
        eprintln!("modal: {:#}", e);
        return ExitCode::FAILURE;
    }

    let result = config.and_then(|config| session::run(&config, &argv, X11Display::connect));
    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
