use anyhow::{bail, Result};
use paths::StatusdPaths;
use registry::QUIT_REQUEST_ID;

use crate::server::ForkResult;

mod app;
mod application_lifecycle;
mod client;
mod config;
mod display_backend;
mod field;
mod ipc_server;
mod opts;
mod paths;
mod registry;
mod render;
mod server;
mod shell;

fn main() {
    let opts: opts::Opt = opts::Opt::from_env();

    let log_level_filter = if opts.log_debug { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    if std::env::var("RUST_LOG").is_ok() {
        pretty_env_logger::init_timed();
    } else {
        pretty_env_logger::formatted_timed_builder().filter(Some("statusd"), log_level_filter).init();
    }

    if let Err(err) = run(opts) {
        log::error!("{:?}", err);
        std::process::exit(1);
    }
}

fn run(opts: opts::Opt) -> Result<()> {
    let paths = StatusdPaths::default()?;

    match opts.action {
        opts::Action::Daemon => {
            // make sure that there isn't already a statusd daemon running.
            if client::daemon_is_reachable(&paths) {
                bail!("statusd daemon already running on {}", paths.get_ipc_socket_file().display());
            }
            log::info!("Initializing statusd daemon. ({})", paths.get_ipc_socket_file().display());
            if !opts.no_daemonize {
                println!("Run `statusd logs` to see daemon output.");
            }
            let _: ForkResult = server::initialize_server(paths, !opts.no_daemonize)?;
            Ok(())
        }
        opts::Action::Send { id } => client::send_request(&paths, id),
        opts::Action::Kill => client::send_request(&paths, QUIT_REQUEST_ID),
        opts::Action::Logs => client::watch_logs(&paths),
    }
}
