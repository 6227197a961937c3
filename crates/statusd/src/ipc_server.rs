use anyhow::{Context, Result};
use tokio::{io::AsyncReadExt, sync::broadcast};

use crate::app::App;

/// Serve requests strictly one at a time: accept a connection, read its one
/// request frame, dispatch and render, and only then accept the next. The
/// loop ends once a dispatched action clears the running flag, or on a
/// shutdown event; `exit_recv` is held for the loop's whole lifetime, so an
/// event arriving mid-dispatch is picked up on the next iteration.
pub async fn run_server(
    listener: tokio::net::UnixListener,
    app: &mut App,
    mut exit_recv: broadcast::Receiver<()>,
) -> Result<()> {
    log::info!("IPC server initialized");
    loop {
        tokio::select! {
            _ = exit_recv.recv() => break,
            connection = listener.accept() => match connection {
                Ok((mut stream, _addr)) => {
                    match read_request(&mut stream).await {
                        Ok(id) => {
                            log::debug!("received request id {} from IPC client", id);
                            app.handle_request(id).await?;
                        }
                        Err(err) => log::warn!("Discarding malformed IPC request: {:?}", err),
                    }
                    // The connection is only dropped once the request is
                    // fully dispatched and rendered.
                    drop(stream);
                    if !app.running {
                        break;
                    }
                }
                Err(e) => log::error!("Failed to connect to client: {:?}", e),
            }
        }
    }
    Ok(())
}

/// A request frame is exactly one little-endian u32. A client that closes
/// the stream early produces a short read, which discards the request.
async fn read_request(stream: &mut tokio::net::UnixStream) -> Result<u32> {
    let mut raw_id = [0u8; 4];
    stream.read_exact(&mut raw_id).await.context("Client closed the stream before a full request id arrived")?;
    Ok(u32::from_le_bytes(raw_id))
}
