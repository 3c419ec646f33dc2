//! TCP listener accepting pings and status requests

use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, info, warn};

use super::engine::EngineSender;
use super::protocol::{Request, Response, MAX_REQUEST_LENGTH};

/// Back-off after a failed accept (e.g. out of file descriptors)
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Accept connections forever, one task per connection
pub async fn serve(listener: TcpListener, engine: EngineSender) -> Result<()> {
    let local = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!(address = %local, "Listening for pings");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };

        let engine = engine.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &engine).await {
                debug!(%peer, "Connection closed: {:#}", e);
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, engine: &EngineSender) -> Result<()> {
    let (read, mut write) = stream.into_split();
    let mut lines = FramedRead::new(read, LinesCodec::new_with_max_length(MAX_REQUEST_LENGTH));

    while let Some(line) = lines.next().await {
        let line = line.context("Failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match line.parse::<Request>() {
            Ok(request) => respond(request, engine)
                .await
                .unwrap_or_else(|e| Response::Error(format!("{e:#}"))),
            Err(e) => Response::Error(e.to_string()),
        };

        write
            .write_all(format!("{}\n", response.encode()).as_bytes())
            .await
            .context("Failed to write response")?;
    }

    Ok(())
}

async fn respond(request: Request, engine: &EngineSender) -> Result<Response> {
    match request {
        Request::Ping => {
            engine.ping()?;
            Ok(Response::Ok)
        }
        Request::Status => Ok(Response::Status(engine.status().await?)),
    }
}
