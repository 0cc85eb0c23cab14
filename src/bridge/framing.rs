//! Message framing on the extension transport.
//!
//! Browsers talk to native-messaging hosts with a 4-byte length prefix in
//! native byte order followed by UTF-8 JSON. Newline-delimited JSON is
//! offered for driving the host from a shell.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, VerityError};

/// Largest request accepted from the extension.
pub const MAX_INCOMING_FRAME: usize = 4 * 1024 * 1024;

/// Largest response the browser will accept from a native host.
pub const MAX_OUTGOING_FRAME: usize = 1024 * 1024;

/// Wire framing used on stdin/stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    /// 4-byte native-endian length prefix, then the JSON body.
    #[default]
    NativeMessaging,
    /// One JSON document per line.
    JsonLines,
}

/// One unit read from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete message body.
    Message(Vec<u8>),
    /// A message over [`MAX_INCOMING_FRAME`]; its body has been consumed
    /// and discarded.
    Oversized(usize),
}

/// Read the next frame, or `None` at end of stream.
///
/// # Errors
///
/// [`VerityError::Io`] for read failures and [`VerityError::Bridge`] when
/// the stream ends inside a length-prefixed body.
pub async fn read_frame<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    framing: Framing,
) -> Result<Option<Frame>> {
    match framing {
        Framing::NativeMessaging => read_length_prefixed(reader).await,
        Framing::JsonLines => read_line_frame(reader).await,
    }
}

async fn read_length_prefixed<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<Frame>> {
    let mut header = [0u8; 4];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_ne_bytes(header) as usize;
    if len > MAX_INCOMING_FRAME {
        let mut rest = (&mut *reader).take(len as u64);
        let discarded = tokio::io::copy(&mut rest, &mut tokio::io::sink()).await?;
        if discarded < len as u64 {
            return Err(VerityError::Bridge("stream ended inside oversized frame".into()));
        }
        return Ok(Some(Frame::Oversized(len)));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            VerityError::Bridge(format!("stream ended inside a {len}-byte frame"))
        } else {
            VerityError::Io(e)
        }
    })?;
    Ok(Some(Frame::Message(body)))
}

async fn read_line_frame<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<Frame>> {
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = (&mut *reader)
            .take(MAX_INCOMING_FRAME as u64 + 1)
            .read_until(b'\n', &mut line)
            .await?;
        if read == 0 {
            return Ok(None);
        }
        if line.len() > MAX_INCOMING_FRAME {
            let mut total = line.len();
            if line.last() != Some(&b'\n') {
                total += skip_line(reader).await?;
            }
            return Ok(Some(Frame::Oversized(total)));
        }
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }
        return Ok(Some(Frame::Message(trimmed.to_vec())));
    }
}

/// Consume through the next newline (or end of stream) without buffering.
async fn skip_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<usize> {
    let mut skipped = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(skipped);
        }
        let (used, done) = match available.iter().position(|&b| b == b'\n') {
            Some(end) => (end + 1, true),
            None => (available.len(), false),
        };
        reader.consume(used);
        skipped += used;
        if done {
            return Ok(skipped);
        }
    }
}

/// Write one frame and flush.
///
/// # Errors
///
/// [`VerityError::Bridge`] if `payload` exceeds [`MAX_OUTGOING_FRAME`],
/// [`VerityError::Io`] for write failures.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    framing: Framing,
    payload: &[u8],
) -> Result<()> {
    if payload.len() > MAX_OUTGOING_FRAME {
        return Err(VerityError::Bridge(format!(
            "outgoing frame of {} bytes exceeds {MAX_OUTGOING_FRAME}",
            payload.len()
        )));
    }
    match framing {
        Framing::NativeMessaging => {
            // Bounded by MAX_OUTGOING_FRAME above.
            let len = payload.len() as u32;
            writer.write_all(&len.to_ne_bytes()).await?;
            writer.write_all(payload).await?;
        }
        Framing::JsonLines => {
            writer.write_all(payload).await?;
            writer.write_all(b"\n").await?;
        }
    }
    writer.flush().await?;
    Ok(())
}
