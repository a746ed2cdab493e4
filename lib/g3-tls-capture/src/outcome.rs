/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use std::fmt;
use std::io;

use indexmap::IndexMap;
use thiserror::Error;

use g3_codec::ssl::{SslClientHello, SslErrorType, SslMessage, SslMessageType};
use g3_codec::tls::{Alert, ClientHello, HandshakeMessage, HandshakeType, RawVersion};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    Tls,
    Ssl,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tls => "tls",
            Protocol::Ssl => "ssl",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("unexpected first message {0}")]
    UnexpectedFirstMessage(String),
    #[error("unexpected non-handshake record")]
    UnexpectedRecord,
    #[error("no supported version for client version {0}")]
    UnsupportedVersion(RawVersion),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("invalid handshake message: {0}")]
    InvalidMessage(String),
    #[error("truncated record, {0} more bytes expected")]
    TruncatedRecord(usize),
    #[error("plain text data received")]
    PlainTextData,
    #[error("too long reply message")]
    ReplyTooLong,
    #[error("read timed out")]
    ReadTimeout,
    #[error("io failed: {0:?}")]
    Io(#[from] io::Error),
}

impl HandshakeError {
    pub fn brief(&self) -> &'static str {
        match self {
            HandshakeError::UnexpectedFirstMessage(_) => "UnexpectedFirstMessage",
            HandshakeError::UnexpectedRecord => "UnexpectedRecord",
            HandshakeError::UnsupportedVersion(_) => "UnsupportedVersion",
            HandshakeError::InvalidRecord(_) => "InvalidRecord",
            HandshakeError::InvalidMessage(_) => "InvalidMessage",
            HandshakeError::TruncatedRecord(_) => "TruncatedRecord",
            HandshakeError::PlainTextData => "PlainTextData",
            HandshakeError::ReplyTooLong => "ReplyTooLong",
            HandshakeError::ReadTimeout => "ReadTimeout",
            HandshakeError::Io(_) => "IoFailed",
        }
    }
}

#[derive(Debug)]
pub enum Termination {
    /// The capture target message has been received
    Graceful,
    /// The peer closed the connection at a record boundary
    PeerClosed,
    Failed(HandshakeError),
}

impl Termination {
    pub fn is_graceful(&self) -> bool {
        matches!(self, Termination::Graceful)
    }

    pub fn error(&self) -> Option<&HandshakeError> {
        match self {
            Termination::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn brief(&self) -> &'static str {
        match self {
            Termination::Graceful => "Graceful",
            Termination::PeerClosed => "PeerClosed",
            Termination::Failed(e) => e.brief(),
        }
    }
}

/// What has been sent to the peer to end the handshake
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SentSignal {
    Alert(Alert),
    SslError(SslErrorType),
}

impl fmt::Display for SentSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentSignal::Alert(a) => write!(f, "alert:{a}"),
            SentSignal::SslError(e) => write!(f, "ssl:{e}"),
        }
    }
}

#[derive(Clone, Debug)]
pub enum TlsClientMessage {
    ClientHello(Box<ClientHello>),
    Other(HandshakeMessage),
}

#[derive(Debug, Default)]
pub enum CapturedMessages {
    Tls(IndexMap<HandshakeType, TlsClientMessage>),
    Ssl(IndexMap<SslMessageType, SslMessage>),
    #[default]
    Empty,
}

impl CapturedMessages {
    pub fn len(&self) -> usize {
        match self {
            CapturedMessages::Tls(map) => map.len(),
            CapturedMessages::Ssl(map) => map.len(),
            CapturedMessages::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Message type names in arrival order
    pub fn message_names(&self) -> Vec<String> {
        match self {
            CapturedMessages::Tls(map) => map.keys().map(|t| t.to_string()).collect(),
            CapturedMessages::Ssl(map) => map.keys().map(|t| t.to_string()).collect(),
            CapturedMessages::Empty => Vec::new(),
        }
    }

    pub fn tls_client_hello(&self) -> Option<&ClientHello> {
        let CapturedMessages::Tls(map) = self else {
            return None;
        };
        match map.get(&HandshakeType::ClientHello) {
            Some(TlsClientMessage::ClientHello(hello)) => Some(&**hello),
            _ => None,
        }
    }

    pub fn ssl_client_hello(&self) -> Option<&SslClientHello> {
        let CapturedMessages::Ssl(map) = self else {
            return None;
        };
        match map.get(&SslMessageType::ClientHello) {
            Some(SslMessage::ClientHello(hello)) => Some(hello),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct HandshakeOutcome {
    pub protocol: Option<Protocol>,
    pub messages: CapturedMessages,
    pub termination: Termination,
    pub signal: Option<SentSignal>,
}

impl HandshakeOutcome {
    pub(crate) fn undetected(termination: Termination) -> Self {
        HandshakeOutcome {
            protocol: None,
            messages: CapturedMessages::Empty,
            termination,
            signal: None,
        }
    }

    /// The highest version offered in the client hello
    pub fn client_version(&self) -> Option<RawVersion> {
        if let Some(hello) = self.messages.tls_client_hello() {
            return Some(hello.advertised_version());
        }
        self.messages.ssl_client_hello().map(|hello| hello.version)
    }

    pub fn offered_cipher_count(&self) -> usize {
        if let Some(hello) = self.messages.tls_client_hello() {
            return hello.cipher_suites.len();
        }
        self.messages
            .ssl_client_hello()
            .map(|hello| hello.cipher_kinds.len())
            .unwrap_or_default()
    }

    pub fn server_name(&self) -> Option<&str> {
        self.messages
            .tls_client_hello()
            .and_then(|hello| hello.server_name())
    }
}
