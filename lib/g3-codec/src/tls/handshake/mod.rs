/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use bytes::{Bytes, BytesMut};
use thiserror::Error;

mod client_hello;
pub use client_hello::{ClientHello, ClientHelloParseError};

mod server_hello;
pub use server_hello::ServerHello;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakeType {
    HelloRequest,
    ClientHello,
    ServerHello,
    HelloVerifyRequest,
    NewSessionTicket,
    EndOfEarlyData,
    EncryptedExtensions,
    Certificate,
    ServerKeyExchange,
    CertificateRequest,
    ServerHelloDone,
    CertificateVerify,
    ClientKeyExchange,
    Finished,
    CertificateStatus,
    KeyUpdate,
    MessageHash,
    Unknown(u8),
}

impl HandshakeType {
    pub fn as_u8(&self) -> u8 {
        match self {
            HandshakeType::HelloRequest => 0,
            HandshakeType::ClientHello => 1,
            HandshakeType::ServerHello => 2,
            HandshakeType::HelloVerifyRequest => 3,
            HandshakeType::NewSessionTicket => 4,
            HandshakeType::EndOfEarlyData => 5,
            HandshakeType::EncryptedExtensions => 8,
            HandshakeType::Certificate => 11,
            HandshakeType::ServerKeyExchange => 12,
            HandshakeType::CertificateRequest => 13,
            HandshakeType::ServerHelloDone => 14,
            HandshakeType::CertificateVerify => 15,
            HandshakeType::ClientKeyExchange => 16,
            HandshakeType::Finished => 20,
            HandshakeType::CertificateStatus => 22,
            HandshakeType::KeyUpdate => 24,
            HandshakeType::MessageHash => 254,
            HandshakeType::Unknown(v) => *v,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HandshakeType::HelloRequest => "hello_request",
            HandshakeType::ClientHello => "client_hello",
            HandshakeType::ServerHello => "server_hello",
            HandshakeType::HelloVerifyRequest => "hello_verify_request",
            HandshakeType::NewSessionTicket => "new_session_ticket",
            HandshakeType::EndOfEarlyData => "end_of_early_data",
            HandshakeType::EncryptedExtensions => "encrypted_extensions",
            HandshakeType::Certificate => "certificate",
            HandshakeType::ServerKeyExchange => "server_key_exchange",
            HandshakeType::CertificateRequest => "certificate_request",
            HandshakeType::ServerHelloDone => "server_hello_done",
            HandshakeType::CertificateVerify => "certificate_verify",
            HandshakeType::ClientKeyExchange => "client_key_exchange",
            HandshakeType::Finished => "finished",
            HandshakeType::CertificateStatus => "certificate_status",
            HandshakeType::KeyUpdate => "key_update",
            HandshakeType::MessageHash => "message_hash",
            HandshakeType::Unknown(_) => "unknown",
        }
    }
}

impl From<u8> for HandshakeType {
    fn from(value: u8) -> Self {
        match value {
            0 => HandshakeType::HelloRequest,
            1 => HandshakeType::ClientHello,
            2 => HandshakeType::ServerHello,
            3 => HandshakeType::HelloVerifyRequest,
            4 => HandshakeType::NewSessionTicket,
            5 => HandshakeType::EndOfEarlyData,
            8 => HandshakeType::EncryptedExtensions,
            11 => HandshakeType::Certificate,
            12 => HandshakeType::ServerKeyExchange,
            13 => HandshakeType::CertificateRequest,
            14 => HandshakeType::ServerHelloDone,
            15 => HandshakeType::CertificateVerify,
            16 => HandshakeType::ClientKeyExchange,
            20 => HandshakeType::Finished,
            22 => HandshakeType::CertificateStatus,
            24 => HandshakeType::KeyUpdate,
            254 => HandshakeType::MessageHash,
            n => HandshakeType::Unknown(n),
        }
    }
}

impl FromStr for HandshakeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "hello_request" => Ok(HandshakeType::HelloRequest),
            "client_hello" => Ok(HandshakeType::ClientHello),
            "server_hello" => Ok(HandshakeType::ServerHello),
            "hello_verify_request" => Ok(HandshakeType::HelloVerifyRequest),
            "new_session_ticket" => Ok(HandshakeType::NewSessionTicket),
            "end_of_early_data" => Ok(HandshakeType::EndOfEarlyData),
            "encrypted_extensions" => Ok(HandshakeType::EncryptedExtensions),
            "certificate" => Ok(HandshakeType::Certificate),
            "server_key_exchange" => Ok(HandshakeType::ServerKeyExchange),
            "certificate_request" => Ok(HandshakeType::CertificateRequest),
            "server_hello_done" => Ok(HandshakeType::ServerHelloDone),
            "certificate_verify" => Ok(HandshakeType::CertificateVerify),
            "client_key_exchange" => Ok(HandshakeType::ClientKeyExchange),
            "finished" => Ok(HandshakeType::Finished),
            "certificate_status" => Ok(HandshakeType::CertificateStatus),
            "key_update" => Ok(HandshakeType::KeyUpdate),
            "message_hash" => Ok(HandshakeType::MessageHash),
            _ => Err(()),
        }
    }
}

impl fmt::Display for HandshakeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeType::Unknown(v) => write!(f, "unknown({v})"),
            _ => f.write_str(self.as_str()),
        }
    }
}

pub struct HandshakeHeader {
    pub msg_type: u8,
    pub msg_length: u32,
}

impl HandshakeHeader {
    pub const SIZE: usize = 4;

    /// Try to parse the data as a HandshakeHeader
    pub fn try_parse(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE {
            return None;
        }

        Some(HandshakeHeader {
            msg_type: data[0],
            msg_length: u32::from_be_bytes([0, data[1], data[2], data[3]]),
        })
    }

    /// Get the capacity needed to hold the encoded Handshake message
    pub fn encoded_cap(&self) -> usize {
        Self::SIZE + self.msg_length as usize
    }

    pub(crate) fn encode(msg_type: HandshakeType, body_len: usize, buf: &mut Vec<u8>) {
        let len = (body_len as u32).to_be_bytes();
        buf.push(msg_type.as_u8());
        buf.extend_from_slice(&len[1..]);
    }
}

/// A complete handshake message, without its header
#[derive(Clone, Debug)]
pub struct HandshakeMessage {
    msg_type: HandshakeType,
    body: Bytes,
}

impl HandshakeMessage {
    pub fn new(msg_type: HandshakeType, body: Bytes) -> Self {
        HandshakeMessage { msg_type, body }
    }

    #[inline]
    pub fn msg_type(&self) -> HandshakeType {
        self.msg_type
    }

    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get the total length of this message on the wire
    pub fn encoded_len(&self) -> usize {
        HandshakeHeader::SIZE + self.body.len()
    }

    /// Parse this message as a ClientHello message
    pub fn parse_client_hello(&self) -> Result<ClientHello, ClientHelloParseError> {
        if self.msg_type != HandshakeType::ClientHello {
            return Err(ClientHelloParseError::InvalidMessageType(
                self.msg_type.as_u8(),
            ));
        }
        ClientHello::parse_msg_data(&self.body)
    }
}

#[derive(Debug, Error)]
pub enum HandshakeCoalesceError {
    #[error("too large message size {0}")]
    TooLargeMessageSize(u32),
}

/// Join handshake messages which may be fragmented into multiple records,
/// or batched into a single record
pub struct HandshakeCoalescer {
    max_message_size: u32,
    buf: BytesMut,
}

impl Default for HandshakeCoalescer {
    fn default() -> Self {
        HandshakeCoalescer::new(1 << 16)
    }
}

impl HandshakeCoalescer {
    pub fn new(max_message_size: u32) -> Self {
        HandshakeCoalescer {
            max_message_size,
            buf: BytesMut::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn coalesce_fragment(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Take out the next complete message, if there is one
    pub fn next_message(&mut self) -> Result<Option<HandshakeMessage>, HandshakeCoalesceError> {
        let Some(hdr) = HandshakeHeader::try_parse(&self.buf) else {
            return Ok(None);
        };
        if hdr.msg_length > self.max_message_size {
            return Err(HandshakeCoalesceError::TooLargeMessageSize(hdr.msg_length));
        }

        let cap = hdr.encoded_cap();
        if self.buf.len() < cap {
            self.buf.reserve(cap - self.buf.len());
            return Ok(None);
        }

        let mut data = self.buf.split_to(cap);
        let body = data.split_off(HandshakeHeader::SIZE).freeze();
        Ok(Some(HandshakeMessage {
            msg_type: HandshakeType::from(hdr.msg_type),
            body,
        }))
    }
}
