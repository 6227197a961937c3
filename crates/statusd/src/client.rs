use std::{io::Write, os::unix::net::UnixStream, process::Stdio};

use anyhow::{Context, Result};

use crate::paths::StatusdPaths;

/// Encode a request id as its 4-byte wire frame.
pub fn encode_request(id: u32) -> [u8; 4] {
    id.to_le_bytes()
}

/// Connect to a running daemon and deliver one request id. Fire-and-forget:
/// the daemon never sends anything back.
pub fn send_request(paths: &StatusdPaths, id: u32) -> Result<()> {
    let socket_path = paths.get_ipc_socket_file();
    log::debug!("Forwarding request {} to daemon at {}", id, socket_path.display());
    let mut stream = UnixStream::connect(socket_path)
        .with_context(|| format!("Failed to connect to daemon at {}", socket_path.display()))?;
    stream.write_all(&encode_request(id)).context("Failed to write request id to IPC stream")?;
    Ok(())
}

/// Whether something is currently serving the daemon's socket.
pub fn daemon_is_reachable(paths: &StatusdPaths) -> bool {
    UnixStream::connect(paths.get_ipc_socket_file()).is_ok()
}

/// Print and follow the daemon's log file.
pub fn watch_logs(paths: &StatusdPaths) -> Result<()> {
    std::process::Command::new("tail")
        .args(["-f", paths.get_log_file().to_string_lossy().as_ref()])
        .stdin(Stdio::null())
        .spawn()
        .context("Failed to start tail on the log file")?
        .wait()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_frame_is_four_little_endian_bytes() {
        assert_eq!(encode_request(0), [0, 0, 0, 0]);
        assert_eq!(encode_request(6), [6, 0, 0, 0]);
        assert_eq!(encode_request(0x0102_0304), [4, 3, 2, 1]);
    }
}
