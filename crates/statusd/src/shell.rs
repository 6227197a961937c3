use std::process::Stdio;

use anyhow::{Context, Result};

/// Run a command through the shell and hand back the first line of its
/// stdout, trailing newline included. A command that prints nothing yields an
/// empty buffer and a non-zero exit status is only worth a debug log; not
/// being able to spawn the shell at all is an error.
pub async fn run_capture_first_line(cmd: &str) -> Result<Vec<u8>> {
    log::debug!("Running command: {}", cmd);
    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .with_context(|| format!("Failed to spawn `{}`", cmd))?;

    if !output.status.success() {
        log::debug!("Command `{}` exited with {}", cmd, output.status);
    }

    let mut stdout = output.stdout;
    if let Some(newline) = stdout.iter().position(|&byte| byte == b'\n') {
        stdout.truncate(newline + 1);
    }
    Ok(stdout)
}

/// Run a command through the shell purely for its side effect, without
/// waiting on it. Output is thrown away; the command may well still be
/// running when the caller moves on.
pub fn run_detached(cmd: &str) -> Result<()> {
    log::debug!("Spawning detached command: {}", cmd);
    tokio::process::Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to spawn `{}`", cmd))?;
    Ok(())
}
