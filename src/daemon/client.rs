//! Client side of the ping protocol

use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, LinesCodec};

use super::protocol::{Request, Response, MAX_RESPONSE_LENGTH};
use crate::liveness::LivenessSnapshot;

/// Total time allowed for one request/response exchange
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Send a single ping to the daemon at `address`
pub async fn ping(address: &str) -> Result<()> {
    match request(address, Request::Ping).await? {
        Response::Ok => Ok(()),
        Response::Error(message) => bail!("Daemon rejected ping: {}", message),
        other => bail!("Unexpected response to PING: {:?}", other),
    }
}

/// Fetch the current liveness snapshot from the daemon at `address`
pub async fn status(address: &str) -> Result<LivenessSnapshot> {
    match request(address, Request::Status).await? {
        Response::Status(snapshot) => Ok(snapshot),
        Response::Error(message) => bail!("Daemon rejected status request: {}", message),
        other => bail!("Unexpected response to STATUS: {:?}", other),
    }
}

async fn request(address: &str, request: Request) -> Result<Response> {
    tokio::time::timeout(REQUEST_TIMEOUT, exchange(address, request))
        .await
        .with_context(|| format!("Timed out talking to deadman daemon at {address}"))?
}

async fn exchange(address: &str, request: Request) -> Result<Response> {
    let stream = TcpStream::connect(address)
        .await
        .with_context(|| format!("Failed to connect to deadman daemon at {address}"))?;
    let (read, mut write) = stream.into_split();

    write
        .write_all(format!("{}\n", request.as_line()).as_bytes())
        .await
        .context("Failed to send request")?;

    let mut lines = FramedRead::new(read, LinesCodec::new_with_max_length(MAX_RESPONSE_LENGTH));
    let line = lines
        .next()
        .await
        .context("Daemon closed the connection without answering")?
        .context("Failed to read response")?;

    Ok(Response::parse(&line)?)
}
