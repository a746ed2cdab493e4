/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncWrite};

use g3_codec::tls::{
    Alert, AlertDescription, AlertLevel, ContentType, HandshakeCoalescer, HandshakeMessage,
    HandshakeType, RawVersion, Record, RecordParseError, ServerHello,
};

use super::{HandshakeResponder, ProcessFlow, RecordParseFailure, send_failed};
use crate::config::HandshakeServerConfig;
use crate::outcome::{
    CapturedMessages, HandshakeError, HandshakeOutcome, Protocol, SentSignal, Termination,
    TlsClientMessage,
};
use crate::transfer::StreamTransfer;

const ALERT_UNEXPECTED_MESSAGE: Alert =
    Alert::new(AlertLevel::Fatal, AlertDescription::UnexpectedMessage);
const ALERT_PROTOCOL_VERSION: Alert =
    Alert::new(AlertLevel::Fatal, AlertDescription::ProtocolVersion);
const ALERT_CLOSE_NOTIFY: Alert = Alert::new(AlertLevel::Warning, AlertDescription::CloseNotify);
const ALERT_DECRYPT_ERROR: Alert = Alert::new(AlertLevel::Warning, AlertDescription::DecryptError);

pub(crate) struct TlsRecord {
    content_type: ContentType,
    fragment: Bytes,
}

pub(crate) struct TlsResponder<S> {
    transfer: StreamTransfer<S>,
    config: Arc<HandshakeServerConfig>,
    capture_until: HandshakeType,
    coalescer: HandshakeCoalescer,
    received_messages: IndexMap<HandshakeType, TlsClientMessage>,
    last_processed_message_type: Option<HandshakeType>,
    record_version: RawVersion,
    signal: Option<SentSignal>,
}

impl<S> TlsResponder<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(
        transfer: StreamTransfer<S>,
        config: Arc<HandshakeServerConfig>,
        capture_until: HandshakeType,
    ) -> Self {
        let coalescer = HandshakeCoalescer::new(config.max_handshake_message_size);
        TlsResponder {
            transfer,
            config,
            capture_until,
            coalescer,
            received_messages: IndexMap::new(),
            last_processed_message_type: None,
            record_version: RawVersion::TLS1_0,
            signal: None,
        }
    }

    async fn process_message(&mut self, msg: HandshakeMessage) -> ProcessFlow {
        let msg_type = msg.msg_type();
        trace!("received handshake message {msg_type}");

        let mut hello_info = None;
        let captured = if msg_type == HandshakeType::ClientHello {
            match msg.parse_client_hello() {
                Ok(hello) => {
                    let cipher_suite = hello.cipher_suites.first().copied().unwrap_or_default();
                    let offered = hello.offered_versions();
                    let selected = self
                        .config
                        .negotiate_version(hello.legacy_version, offered.as_deref());
                    hello_info = Some((hello.advertised_version(), selected, cipher_suite));
                    TlsClientMessage::ClientHello(Box::new(hello))
                }
                Err(e) => {
                    return self
                        .process_invalid_message(HandshakeError::InvalidMessage(e.to_string()))
                        .await;
                }
            }
        } else {
            TlsClientMessage::Other(msg)
        };

        let is_first = self.last_processed_message_type.is_none();
        self.last_processed_message_type = Some(msg_type);
        self.received_messages.insert(msg_type, captured);

        if is_first && msg_type != HandshakeType::ClientHello {
            let termination = Termination::Failed(HandshakeError::UnexpectedFirstMessage(
                msg_type.to_string(),
            ));
            return ProcessFlow::Stop(
                self.handle_error(ALERT_UNEXPECTED_MESSAGE, termination).await,
            );
        }

        if let Some((advertised, selected, cipher_suite)) = hello_info {
            let Some(version) = selected else {
                debug!("no configured version matches client version {advertised}");
                let termination =
                    Termination::Failed(HandshakeError::UnsupportedVersion(advertised));
                return ProcessFlow::Stop(
                    self.handle_error(ALERT_PROTOCOL_VERSION, termination).await,
                );
            };
            if let Err(e) = self.send_server_hello(version, cipher_suite).await {
                return ProcessFlow::Stop(Termination::Failed(HandshakeError::Io(e)));
            }
        }

        if self.last_processed_message_type == Some(self.capture_until) {
            return ProcessFlow::Stop(
                self.handle_error(ALERT_CLOSE_NOTIFY, Termination::Graceful)
                    .await,
            );
        }
        ProcessFlow::Continue
    }

    async fn send_server_hello(
        &mut self,
        version: RawVersion,
        cipher_suite: u16,
    ) -> std::io::Result<()> {
        self.record_version = version.min(RawVersion::TLS1_2);

        let mut random = [0u8; 32];
        fastrand::fill(&mut random);
        let hello = ServerHello {
            version,
            random,
            session_id: Bytes::new(),
            cipher_suite,
            compression_method: 0,
            extensions: Vec::new(),
        };
        let mut msg = Vec::with_capacity(64);
        hello.encode(&mut msg);

        let mut buf = Vec::with_capacity(msg.len() + 5);
        Record::encode(ContentType::Handshake, self.record_version, &msg, &mut buf);
        debug!("send server hello with version {version} cipher 0x{cipher_suite:04x}");
        self.transfer.send(&buf).await
    }
}

impl<S> HandshakeResponder for TlsResponder<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    type Stream = S;
    type Record = TlsRecord;
    type Signal = Alert;

    const ANNOUNCE_ERRORS: bool = false;

    fn transfer(&mut self) -> &mut StreamTransfer<S> {
        &mut self.transfer
    }

    fn has_pending_data(&self) -> bool {
        !self.coalescer.is_empty()
    }

    fn parse_next_record(&mut self) -> Result<(TlsRecord, bool), RecordParseFailure> {
        let (record, consumed) = match Record::parse(self.transfer.buffer()) {
            Ok(r) => (
                TlsRecord {
                    content_type: r.header.content_type,
                    fragment: Bytes::copy_from_slice(r.fragment),
                },
                r.encoded_len(),
            ),
            Err(RecordParseError::NeedMoreData(n)) => {
                return Err(RecordParseFailure::NeedMoreData(n));
            }
            Err(e) => return Err(RecordParseFailure::InvalidValue(e.to_string())),
        };
        self.transfer.consume(consumed);

        let is_handshake = record.content_type == ContentType::Handshake;
        Ok((record, is_handshake))
    }

    async fn process_handshake_record(&mut self, record: TlsRecord) -> ProcessFlow {
        self.coalescer.coalesce_fragment(&record.fragment);
        loop {
            match self.coalescer.next_message() {
                Ok(Some(msg)) => {
                    if let ProcessFlow::Stop(t) = self.process_message(msg).await {
                        return ProcessFlow::Stop(t);
                    }
                }
                Ok(None) => return ProcessFlow::Continue,
                Err(e) => {
                    return self
                        .process_invalid_message(HandshakeError::InvalidMessage(e.to_string()))
                        .await;
                }
            }
        }
    }

    async fn process_non_handshake_record(&mut self, record: TlsRecord) -> ProcessFlow {
        debug!("unexpected {:?} record", record.content_type);
        ProcessFlow::Stop(
            self.handle_error(
                ALERT_UNEXPECTED_MESSAGE,
                Termination::Failed(HandshakeError::UnexpectedRecord),
            )
            .await,
        )
    }

    async fn process_invalid_message(&mut self, cause: HandshakeError) -> ProcessFlow {
        debug!("invalid message: {cause}");
        ProcessFlow::Stop(
            self.handle_error(ALERT_DECRYPT_ERROR, Termination::Failed(cause))
                .await,
        )
    }

    async fn process_plain_text_message(&mut self) -> ProcessFlow {
        ProcessFlow::Stop(
            self.handle_error(
                ALERT_DECRYPT_ERROR,
                Termination::Failed(HandshakeError::PlainTextData),
            )
            .await,
        )
    }

    async fn handle_error(&mut self, alert: Alert, termination: Termination) -> Termination {
        if !Self::ANNOUNCE_ERRORS && self.config.close_on_error {
            self.transfer.close().await;
            return termination;
        }

        let mut buf = Vec::with_capacity(7);
        alert.encode_record(self.record_version, &mut buf);
        match self.transfer.send(&buf).await {
            Ok(_) => {
                self.signal = Some(SentSignal::Alert(alert));
                termination
            }
            Err(e) => send_failed(termination, e),
        }
    }

    fn into_outcome(self, termination: Termination) -> HandshakeOutcome {
        HandshakeOutcome {
            protocol: Some(Protocol::Tls),
            messages: CapturedMessages::Tls(self.received_messages),
            termination,
            signal: self.signal,
        }
    }
}
