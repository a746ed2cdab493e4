/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use bytes::Bytes;
use indexmap::IndexMap;
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncWrite};

use g3_codec::ssl::{
    SslErrorType, SslMessage, SslMessageType, SslRecord, SslRecordParseError, SslServerHello,
};
use g3_codec::tls::RawVersion;

use super::{HandshakeResponder, ProcessFlow, RecordParseFailure, send_failed};
use crate::outcome::{
    CapturedMessages, HandshakeError, HandshakeOutcome, Protocol, SentSignal, Termination,
};
use crate::transfer::StreamTransfer;

/// An empty DER SEQUENCE
const PLACEHOLDER_CERTIFICATE: &[u8] = &[0x30, 0x00];
const PLACEHOLDER_CONNECTION_ID: &[u8] = &[0x00; 16];

pub(crate) struct SslResponder<S> {
    transfer: StreamTransfer<S>,
    capture_until: SslMessageType,
    received_messages: IndexMap<SslMessageType, SslMessage>,
    last_processed_message_type: Option<SslMessageType>,
    signal: Option<SentSignal>,
}

impl<S> SslResponder<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(
        transfer: StreamTransfer<S>,
        capture_until: SslMessageType,
    ) -> Self {
        SslResponder {
            transfer,
            capture_until,
            received_messages: IndexMap::new(),
            last_processed_message_type: None,
            signal: None,
        }
    }

    async fn send_server_hello(&mut self, cipher_kinds: Vec<u32>) -> Result<(), HandshakeError> {
        let hello = SslServerHello {
            session_id_hit: false,
            version: RawVersion::SSL2,
            certificate: Bytes::from_static(PLACEHOLDER_CERTIFICATE),
            cipher_kinds,
            connection_id: Bytes::from_static(PLACEHOLDER_CONNECTION_ID),
        };
        let mut buf = Vec::with_capacity(128);
        hello
            .encode_record(&mut buf)
            .map_err(|_| HandshakeError::ReplyTooLong)?;
        debug!("send ssl server hello");
        self.transfer.send(&buf).await?;
        Ok(())
    }
}

impl<S> HandshakeResponder for SslResponder<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    type Stream = S;
    type Record = SslMessage;
    type Signal = SslErrorType;

    /// SSL 2.0 has no way to tell a graceful close from a fatal one,
    /// so errors are always sent whatever `close_on_error` says
    const ANNOUNCE_ERRORS: bool = true;

    fn transfer(&mut self) -> &mut StreamTransfer<S> {
        &mut self.transfer
    }

    fn parse_next_record(&mut self) -> Result<(SslMessage, bool), RecordParseFailure> {
        let (message, consumed) = match SslRecord::parse(self.transfer.buffer()) {
            Ok(record) => match SslMessage::parse(record.message) {
                Ok(msg) => (msg, record.encoded_len()),
                Err(e) => return Err(RecordParseFailure::InvalidValue(e.to_string())),
            },
            Err(SslRecordParseError::NeedMoreData(n)) => {
                return Err(RecordParseFailure::NeedMoreData(n));
            }
            Err(e) => return Err(RecordParseFailure::InvalidValue(e.to_string())),
        };
        self.transfer.consume(consumed);

        let is_handshake = message.msg_type() != SslMessageType::Error;
        Ok((message, is_handshake))
    }

    async fn process_handshake_record(&mut self, message: SslMessage) -> ProcessFlow {
        let msg_type = message.msg_type();
        trace!("received ssl message {msg_type}");

        let cipher_kinds = match &message {
            SslMessage::ClientHello(hello) => Some(hello.cipher_kinds.clone()),
            _ => None,
        };
        self.last_processed_message_type = Some(msg_type);
        self.received_messages.insert(msg_type, message);

        if let Some(cipher_kinds) = cipher_kinds
            && let Err(e) = self.send_server_hello(cipher_kinds).await
        {
            return match e {
                HandshakeError::Io(_) => ProcessFlow::Stop(Termination::Failed(e)),
                _ => ProcessFlow::Stop(
                    self.handle_error(SslErrorType::NoCipher, Termination::Failed(e))
                        .await,
                ),
            };
        }

        if self.last_processed_message_type == Some(self.capture_until) {
            return ProcessFlow::Stop(
                self.handle_error(SslErrorType::NoCipher, Termination::Graceful)
                    .await,
            );
        }
        ProcessFlow::Continue
    }

    async fn process_non_handshake_record(&mut self, message: SslMessage) -> ProcessFlow {
        debug!("unexpected ssl {} message", message.msg_type());
        ProcessFlow::Stop(
            self.handle_error(
                SslErrorType::NoCipher,
                Termination::Failed(HandshakeError::UnexpectedRecord),
            )
            .await,
        )
    }

    async fn process_invalid_message(&mut self, cause: HandshakeError) -> ProcessFlow {
        debug!("invalid ssl message: {cause}");
        ProcessFlow::Stop(
            self.handle_error(SslErrorType::NoCipher, Termination::Failed(cause))
                .await,
        )
    }

    async fn process_plain_text_message(&mut self) -> ProcessFlow {
        ProcessFlow::Stop(
            self.handle_error(
                SslErrorType::NoCipher,
                Termination::Failed(HandshakeError::PlainTextData),
            )
            .await,
        )
    }

    async fn handle_error(&mut self, error: SslErrorType, termination: Termination) -> Termination {
        let mut buf = Vec::with_capacity(5);
        SslMessage::encode_error_record(error, &mut buf);
        match self.transfer.send(&buf).await {
            Ok(_) => {
                self.signal = Some(SentSignal::SslError(error));
                termination
            }
            Err(e) => send_failed(termination, e),
        }
    }

    fn into_outcome(self, termination: Termination) -> HandshakeOutcome {
        HandshakeOutcome {
            protocol: Some(Protocol::Ssl),
            messages: CapturedMessages::Ssl(self.received_messages),
            termination,
            signal: self.signal,
        }
    }
}
