/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use std::io;

use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::outcome::{HandshakeError, HandshakeOutcome, Termination};
use crate::transfer::{StreamTransfer, TransferError};

mod ssl;
pub(crate) use ssl::SslResponder;

mod tls;
pub(crate) use tls::TlsResponder;

pub(crate) enum ProcessFlow {
    Continue,
    Stop(Termination),
}

pub(crate) enum RecordParseFailure {
    NeedMoreData(usize),
    InvalidValue(String),
}

/// The per protocol hooks used by [`drive`].
pub(crate) trait HandshakeResponder {
    type Stream: AsyncRead + AsyncWrite + Unpin;
    type Record;
    type Signal;

    /// Send the error signal even if `close_on_error` is set
    const ANNOUNCE_ERRORS: bool;

    fn transfer(&mut self) -> &mut StreamTransfer<Self::Stream>;

    /// Whether parsed record content is still waiting for more data
    fn has_pending_data(&self) -> bool {
        false
    }

    /// Decode and consume the next record in the transfer buffer.
    ///
    /// The returned flag tells if the record carries handshake content.
    fn parse_next_record(&mut self) -> Result<(Self::Record, bool), RecordParseFailure>;

    async fn process_handshake_record(&mut self, record: Self::Record) -> ProcessFlow;

    async fn process_non_handshake_record(&mut self, record: Self::Record) -> ProcessFlow;

    async fn process_invalid_message(&mut self, cause: HandshakeError) -> ProcessFlow;

    async fn process_plain_text_message(&mut self) -> ProcessFlow;

    /// Signal the termination to the peer, the handshake should always stop after this
    async fn handle_error(&mut self, signal: Self::Signal, termination: Termination)
    -> Termination;

    fn into_outcome(self, termination: Termination) -> HandshakeOutcome;
}

/// Run the handshake until the responder wants to stop, then close the transfer
pub(crate) async fn drive<R: HandshakeResponder>(mut responder: R) -> HandshakeOutcome {
    let termination = loop {
        let flow = match responder.parse_next_record() {
            Ok((record, true)) => responder.process_handshake_record(record).await,
            Ok((record, false)) => responder.process_non_handshake_record(record).await,
            Err(RecordParseFailure::NeedMoreData(size)) => {
                match responder.transfer().receive(size).await {
                    Ok(_) => ProcessFlow::Continue,
                    Err(TransferError::NotEnoughData(_)) => {
                        if !responder.transfer().buffer().is_empty() {
                            process_invalid(&mut responder, HandshakeError::TruncatedRecord(size))
                                .await
                        } else if responder.has_pending_data() {
                            let cause = HandshakeError::InvalidMessage(
                                "incomplete handshake message".to_string(),
                            );
                            process_invalid(&mut responder, cause).await
                        } else {
                            ProcessFlow::Stop(Termination::PeerClosed)
                        }
                    }
                    Err(TransferError::Timeout) => {
                        ProcessFlow::Stop(Termination::Failed(HandshakeError::ReadTimeout))
                    }
                    Err(TransferError::Io(e)) => {
                        ProcessFlow::Stop(Termination::Failed(HandshakeError::Io(e)))
                    }
                }
            }
            Err(RecordParseFailure::InvalidValue(reason)) => {
                process_invalid(&mut responder, HandshakeError::InvalidRecord(reason)).await
            }
        };

        if let ProcessFlow::Stop(termination) = flow {
            break termination;
        }
    };

    debug!("handshake terminated: {}", termination.brief());
    responder.transfer().close().await;
    responder.into_outcome(termination)
}

async fn process_invalid<R: HandshakeResponder>(
    responder: &mut R,
    cause: HandshakeError,
) -> ProcessFlow {
    if responder.transfer().buffer_is_plain_text() {
        responder.process_plain_text_message().await
    } else {
        responder.process_invalid_message(cause).await
    }
}

/// Keep the original failure if there is one when the final signal can not be sent
fn send_failed(termination: Termination, e: io::Error) -> Termination {
    match termination {
        Termination::Failed(_) => termination,
        _ => Termination::Failed(HandshakeError::Io(e)),
    }
}
