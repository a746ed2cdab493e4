/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use std::io;
use std::time::Duration;

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("not enough data, {0} more bytes needed")]
    NotEnoughData(usize),
    #[error("read timed out")]
    Timeout,
    #[error("io failed: {0:?}")]
    Io(#[from] io::Error),
}

/// A buffered byte stream.
///
/// Received data is kept in the buffer until it is consumed explicitly, so the
/// same bytes could be parsed more than once.
pub struct StreamTransfer<S> {
    stream: S,
    buf: BytesMut,
    receive_timeout: Option<Duration>,
    closed: bool,
}

impl<S> StreamTransfer<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, receive_timeout: Option<Duration>) -> Self {
        StreamTransfer {
            stream,
            buf: BytesMut::with_capacity(1024),
            receive_timeout,
            closed: false,
        }
    }

    /// Receive at least `size` more bytes into the buffer
    pub async fn receive(&mut self, size: usize) -> Result<(), TransferError> {
        let target = self.buf.len() + size;
        self.buf.reserve(size);

        while self.buf.len() < target {
            let nr = match self.receive_timeout {
                Some(timeout) => {
                    match tokio::time::timeout(timeout, self.stream.read_buf(&mut self.buf)).await {
                        Ok(r) => r?,
                        Err(_) => return Err(TransferError::Timeout),
                    }
                }
                None => self.stream.read_buf(&mut self.buf).await?,
            };
            if nr == 0 {
                return Err(TransferError::NotEnoughData(target - self.buf.len()));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    pub fn consume(&mut self, size: usize) {
        let size = size.min(self.buf.len());
        self.buf.advance(size);
    }

    /// Check if the buffered data looks like printable text rather than binary records
    pub fn buffer_is_plain_text(&self) -> bool {
        !self.buf.is_empty()
            && self
                .buf
                .iter()
                .all(|b| b.is_ascii_graphic() || matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
    }

    pub async fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data).await?;
        self.stream.flush().await
    }

    /// Shutdown the write side of the stream, this can be called more than once
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.stream.shutdown().await;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
