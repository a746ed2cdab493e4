/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use std::sync::Arc;

use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};

mod config;
pub use config::{CaptureTarget, HandshakeServerConfig};

mod outcome;
pub use outcome::{
    CapturedMessages, HandshakeError, HandshakeOutcome, Protocol, SentSignal, Termination,
    TlsClientMessage,
};

mod transfer;
pub use transfer::{StreamTransfer, TransferError};

mod detect;
mod responder;

use responder::{SslResponder, TlsResponder};

/// Take part in the handshake on an accepted connection until the capture target
/// message arrives, an error happens or the peer closes.
///
/// The stream is always shut down before this returns.
pub async fn run_handshake<S>(
    stream: S,
    config: Arc<HandshakeServerConfig>,
    target: CaptureTarget,
) -> HandshakeOutcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut transfer = StreamTransfer::new(stream, config.receive_timeout);

    let protocol = if config.fallback_to_ssl {
        match detect::detect_protocol(&mut transfer).await {
            Ok(protocol) => protocol,
            Err(e) => {
                debug!("protocol detection failed: {e}");
                transfer.close().await;
                let termination = match e {
                    TransferError::NotEnoughData(_) => Termination::PeerClosed,
                    TransferError::Timeout => Termination::Failed(HandshakeError::ReadTimeout),
                    TransferError::Io(e) => Termination::Failed(HandshakeError::Io(e)),
                };
                return HandshakeOutcome::undetected(termination);
            }
        }
    } else {
        Protocol::Tls
    };

    match protocol {
        Protocol::Tls => {
            let responder = TlsResponder::new(transfer, config, target.tls);
            responder::drive(responder).await
        }
        Protocol::Ssl => {
            let responder = SslResponder::new(transfer, target.ssl);
            responder::drive(responder).await
        }
    }
}
