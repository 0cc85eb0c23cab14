//! Stdin/stdout transport for the browser's native-messaging host.
//!
//! Reads framed requests, dispatches them through the [`BridgeClient`], and
//! writes one framed response per request. Stdout is reserved for protocol
//! frames; all diagnostics go to stderr.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, BufReader, BufWriter};
use tracing::Instrument;

use super::channel::{BridgeClient, VerificationHandler, bridge_channel};
use super::contract::{BridgeResponse, parse_request};
use super::framing::{Frame, Framing, MAX_OUTGOING_FRAME, read_frame, write_frame};
use crate::error::{Result, VerityError};

/// Request channel capacity for the stdio bridge.
const REQUEST_CAPACITY: usize = 16;

/// Serve requests on stdin/stdout until stdin closes.
///
/// # Errors
///
/// Returns transport failures; per-request failures become error responses.
pub async fn run_stdio_bridge<H: VerificationHandler>(
    handler: H,
    framing: Framing,
    deadline: Duration,
) -> Result<()> {
    let (client, server) = bridge_channel(REQUEST_CAPACITY, deadline, handler);
    let server_handle = tokio::spawn(server.run());

    let result = run_bridge(tokio::io::stdin(), tokio::io::stdout(), framing, client).await;

    // The client was dropped by `run_bridge`, so the server drains and exits.
    if let Err(e) = server_handle.await {
        tracing::error!(error = %e, "bridge server task failed");
    }
    result
}

/// Serve requests from `reader`, writing responses to `writer`, until the
/// reader reaches end of stream.
///
/// # Errors
///
/// [`VerityError::Io`] or [`VerityError::Bridge`] when the transport
/// itself breaks.
pub async fn run_bridge<R, W>(reader: R, writer: W, framing: Framing, client: BridgeClient) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut writer = BufWriter::new(writer);

    while let Some(frame) = read_frame(&mut reader, framing).await? {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("bridge_request", %request_id);
        let response = dispatch(&client, frame).instrument(span).await;
        let payload = encode_response(&response)?;
        write_frame(&mut writer, framing, &payload).await?;
    }

    tracing::info!("input closed; shutting down bridge");
    Ok(())
}

async fn dispatch(client: &BridgeClient, frame: Frame) -> BridgeResponse {
    let bytes = match frame {
        Frame::Message(bytes) => bytes,
        Frame::Oversized(len) => {
            tracing::warn!(len, "request frame too large");
            return BridgeResponse::error("Request too large");
        }
    };

    let command = match parse_request(&bytes) {
        Ok(command) => command,
        Err(err) => return BridgeResponse::from_error(&err),
    };

    match client.send(command).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "bridge dispatch failed");
            BridgeResponse::from_error(&err)
        }
    }
}

/// Serialize a response, replacing it with an error if it would not fit
/// in one outgoing frame.
fn encode_response(response: &BridgeResponse) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(response)
        .map_err(|e| VerityError::Bridge(format!("failed to serialize response: {e}")))?;
    if payload.len() <= MAX_OUTGOING_FRAME {
        return Ok(payload);
    }
    tracing::warn!(len = payload.len(), "response too large; sending error instead");
    serde_json::to_vec(&BridgeResponse::error("Response too large"))
        .map_err(|e| VerityError::Bridge(format!("failed to serialize response: {e}")))
}
