use std::{os::unix::io::AsRawFd, path::Path};

use anyhow::{bail, Context, Result};

use crate::{app::App, config, display_backend, ipc_server, paths::StatusdPaths};

pub fn initialize_server(paths: StatusdPaths, should_daemonize: bool) -> Result<ForkResult> {
    // Bind before anything else so clients never race a missing endpoint.
    let listener = open_ipc_socket(paths.get_ipc_socket_file())?;

    if should_daemonize {
        let fork_result = do_detach(paths.get_log_file())?;

        if fork_result == ForkResult::Parent {
            return Ok(ForkResult::Parent);
        }
    }

    // Subscribed before the handler is installed so no signal can slip
    // through unbuffered, even one arriving during startup population.
    let exit_recv = crate::application_lifecycle::subscribe_exit();
    simple_signal::set_handler(&[simple_signal::Signal::Int, simple_signal::Signal::Term], move |_| {
        log::info!("Shutting down statusd daemon...");
        crate::application_lifecycle::send_exit();
    });

    let registry = config::inbuilt_registry()?;
    let sink = display_backend::open_sink().context("Failed to open the status display sink")?;
    let mut app = App::new(registry, sink);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to initialize tokio runtime")?;

    let result = rt.block_on(async {
        listener.set_nonblocking(true)?;
        let listener = tokio::net::UnixListener::from_std(listener)?;
        app.init_statusbar().await.context("Failed to populate the initial status line")?;
        ipc_server::run_server(listener, &mut app, exit_recv).await
    });

    // The bound socket name outlives the listener fd. Every exit path runs
    // through here, including fatal dispatch errors and signal shutdown.
    if let Err(err) = std::fs::remove_file(paths.get_ipc_socket_file()) {
        log::warn!("Failed to remove ipc socket file {}: {}", paths.get_ipc_socket_file().display(), err);
    }

    log::info!("statusd daemon exited");
    result.map(|()| ForkResult::Child)
}

/// Claim the well-known socket name. A name that something still answers on
/// means another daemon is serving; a name nothing answers on is a leftover
/// of an unclean shutdown and gets replaced.
fn open_ipc_socket(socket_path: &Path) -> Result<std::os::unix::net::UnixListener> {
    if socket_path.exists() {
        if std::os::unix::net::UnixStream::connect(socket_path).is_ok() {
            bail!("statusd is already running on {}", socket_path.display());
        }
        log::info!("Removing stale socket file {}", socket_path.display());
        std::fs::remove_file(socket_path)
            .with_context(|| format!("Failed to remove stale socket file {}", socket_path.display()))?;
    }
    std::os::unix::net::UnixListener::bind(socket_path)
        .with_context(|| format!("Failed to bind request socket {}", socket_path.display()))
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ForkResult {
    Parent,
    Child,
}

/// Detach the process from the terminal, redirecting stdout and stderr to
/// the log file.
fn do_detach(log_file_path: impl AsRef<Path>) -> Result<ForkResult> {
    match unsafe { nix::unistd::fork()? } {
        nix::unistd::ForkResult::Child => {
            nix::unistd::setsid()?;
            match unsafe { nix::unistd::fork()? } {
                nix::unistd::ForkResult::Parent { .. } => std::process::exit(0),
                nix::unistd::ForkResult::Child => {}
            }
        }
        nix::unistd::ForkResult::Parent { .. } => {
            return Ok(ForkResult::Parent);
        }
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("Error opening log file ({}) for writing", log_file_path.as_ref().display()))?;
    let fd = file.as_raw_fd();

    if nix::unistd::isatty(1)? {
        nix::unistd::dup2(fd, std::io::stdout().as_raw_fd())?;
    }
    if nix::unistd::isatty(2)? {
        nix::unistd::dup2(fd, std::io::stderr().as_raw_fd())?;
    }

    Ok(ForkResult::Child)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::os::unix::net::UnixListener;

    fn scratch_socket_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("statusd-{}-{}.sock", tag, std::process::id()))
    }

    #[test]
    fn refuses_to_claim_a_socket_something_answers_on() {
        let path = scratch_socket_path("live");
        let _listener = UnixListener::bind(&path).unwrap();
        assert!(open_ipc_socket(&path).is_err());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn replaces_a_stale_socket_file_nothing_answers_on() {
        let path = scratch_socket_path("stale");
        // Bind and drop: the name stays behind but nothing serves it.
        drop(UnixListener::bind(&path).unwrap());
        assert!(path.exists());
        let listener = open_ipc_socket(&path).unwrap();
        drop(listener);
        std::fs::remove_file(&path).unwrap();
    }
}
