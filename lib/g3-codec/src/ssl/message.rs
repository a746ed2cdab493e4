/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use thiserror::Error;

use super::{SslRecord, SslRecordEncodeError};
use crate::tls::RawVersion;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SslMessageType {
    Error = 0,
    ClientHello = 1,
    ClientMasterKey = 2,
    ClientFinished = 3,
    ServerHello = 4,
    ServerVerify = 5,
    ServerFinished = 6,
    RequestCertificate = 7,
    ClientCertificate = 8,
}

impl SslMessageType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SslMessageType::Error),
            1 => Some(SslMessageType::ClientHello),
            2 => Some(SslMessageType::ClientMasterKey),
            3 => Some(SslMessageType::ClientFinished),
            4 => Some(SslMessageType::ServerHello),
            5 => Some(SslMessageType::ServerVerify),
            6 => Some(SslMessageType::ServerFinished),
            7 => Some(SslMessageType::RequestCertificate),
            8 => Some(SslMessageType::ClientCertificate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SslMessageType::Error => "error",
            SslMessageType::ClientHello => "client_hello",
            SslMessageType::ClientMasterKey => "client_master_key",
            SslMessageType::ClientFinished => "client_finished",
            SslMessageType::ServerHello => "server_hello",
            SslMessageType::ServerVerify => "server_verify",
            SslMessageType::ServerFinished => "server_finished",
            SslMessageType::RequestCertificate => "request_certificate",
            SslMessageType::ClientCertificate => "client_certificate",
        }
    }
}

impl FromStr for SslMessageType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "error" => Ok(SslMessageType::Error),
            "client_hello" => Ok(SslMessageType::ClientHello),
            "client_master_key" => Ok(SslMessageType::ClientMasterKey),
            "client_finished" => Ok(SslMessageType::ClientFinished),
            "server_hello" => Ok(SslMessageType::ServerHello),
            "server_verify" => Ok(SslMessageType::ServerVerify),
            "server_finished" => Ok(SslMessageType::ServerFinished),
            "request_certificate" => Ok(SslMessageType::RequestCertificate),
            "client_certificate" => Ok(SslMessageType::ClientCertificate),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SslMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SslErrorType {
    NoCipher,
    NoCertificate,
    BadCertificate,
    UnsupportedCertificateType,
    Unknown(u16),
}

impl From<u16> for SslErrorType {
    fn from(value: u16) -> Self {
        match value {
            0x0001 => SslErrorType::NoCipher,
            0x0002 => SslErrorType::NoCertificate,
            0x0004 => SslErrorType::BadCertificate,
            0x0006 => SslErrorType::UnsupportedCertificateType,
            n => SslErrorType::Unknown(n),
        }
    }
}

impl From<SslErrorType> for u16 {
    fn from(value: SslErrorType) -> Self {
        match value {
            SslErrorType::NoCipher => 0x0001,
            SslErrorType::NoCertificate => 0x0002,
            SslErrorType::BadCertificate => 0x0004,
            SslErrorType::UnsupportedCertificateType => 0x0006,
            SslErrorType::Unknown(n) => n,
        }
    }
}

impl fmt::Display for SslErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SslErrorType::NoCipher => f.write_str("no_cipher_error"),
            SslErrorType::NoCertificate => f.write_str("no_certificate_error"),
            SslErrorType::BadCertificate => f.write_str("bad_certificate_error"),
            SslErrorType::UnsupportedCertificateType => {
                f.write_str("unsupported_certificate_type_error")
            }
            SslErrorType::Unknown(n) => write!(f, "error(0x{n:04x})"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SslMessageParseError {
    #[error("empty message")]
    EmptyMessage,
    #[error("invalid message type {0}")]
    InvalidMessageType(u8),
    #[error("invalid message length")]
    InvalidMessageLength,
    #[error("invalid cipher specs length {0}")]
    InvalidCipherSpecsLength(u16),
    #[error("invalid session id length {0}")]
    InvalidSessionIdLength(u16),
    #[error("invalid challenge length {0}")]
    InvalidChallengeLength(u16),
}

/// The CLIENT-HELLO message
#[derive(Clone, Debug)]
pub struct SslClientHello {
    pub version: RawVersion,
    /// 3-byte cipher kinds, stored in the low bits
    pub cipher_kinds: Vec<u32>,
    pub session_id: Bytes,
    pub challenge: Bytes,
}

impl SslClientHello {
    const FIXED_LEN: usize = 8;

    fn parse_msg_data(data: &[u8]) -> Result<Self, SslMessageParseError> {
        if data.len() < Self::FIXED_LEN {
            return Err(SslMessageParseError::InvalidMessageLength);
        }

        let version = RawVersion::new(data[0], data[1]);
        let cipher_specs_len = u16::from_be_bytes([data[2], data[3]]);
        let session_id_len = u16::from_be_bytes([data[4], data[5]]);
        let challenge_len = u16::from_be_bytes([data[6], data[7]]);

        if cipher_specs_len == 0 || cipher_specs_len % 3 != 0 {
            return Err(SslMessageParseError::InvalidCipherSpecsLength(
                cipher_specs_len,
            ));
        }
        if session_id_len != 0 && session_id_len != 16 {
            return Err(SslMessageParseError::InvalidSessionIdLength(session_id_len));
        }
        if !(16..=32).contains(&challenge_len) {
            return Err(SslMessageParseError::InvalidChallengeLength(challenge_len));
        }

        let mut offset = Self::FIXED_LEN;
        let total = offset
            + cipher_specs_len as usize
            + session_id_len as usize
            + challenge_len as usize;
        if data.len() != total {
            return Err(SslMessageParseError::InvalidMessageLength);
        }

        let end = offset + cipher_specs_len as usize;
        let cipher_kinds = data[offset..end]
            .chunks_exact(3)
            .map(|v| u32::from_be_bytes([0, v[0], v[1], v[2]]))
            .collect();
        offset = end;

        let end = offset + session_id_len as usize;
        let session_id = Bytes::copy_from_slice(&data[offset..end]);
        offset = end;

        let challenge = Bytes::copy_from_slice(&data[offset..]);

        Ok(SslClientHello {
            version,
            cipher_kinds,
            session_id,
            challenge,
        })
    }
}

/// The SERVER-HELLO message
pub struct SslServerHello {
    pub session_id_hit: bool,
    pub version: RawVersion,
    pub certificate: Bytes,
    pub cipher_kinds: Vec<u32>,
    pub connection_id: Bytes,
}

impl SslServerHello {
    const CERTIFICATE_TYPE_X509: u8 = 0x01;

    /// Encode as a complete record
    pub fn encode_record(&self, buf: &mut Vec<u8>) -> Result<(), SslRecordEncodeError> {
        let cipher_specs_len = self.cipher_kinds.len() * 3;
        let mut msg = Vec::with_capacity(
            11 + self.certificate.len() + cipher_specs_len + self.connection_id.len(),
        );
        msg.push(SslMessageType::ServerHello as u8);
        msg.push(u8::from(self.session_id_hit));
        msg.push(Self::CERTIFICATE_TYPE_X509);
        msg.extend_from_slice(&self.version.to_be_bytes());
        msg.extend_from_slice(&(self.certificate.len() as u16).to_be_bytes());
        msg.extend_from_slice(&(cipher_specs_len as u16).to_be_bytes());
        msg.extend_from_slice(&(self.connection_id.len() as u16).to_be_bytes());
        msg.extend_from_slice(&self.certificate);
        for kind in &self.cipher_kinds {
            msg.extend_from_slice(&kind.to_be_bytes()[1..]);
        }
        msg.extend_from_slice(&self.connection_id);

        SslRecord::encode(&msg, buf)
    }
}

/// A decoded message from the client
#[derive(Clone, Debug)]
pub enum SslMessage {
    Error(SslErrorType),
    ClientHello(SslClientHello),
    /// Messages sent after the server hello are encrypted, so they are kept as is
    Other(SslMessageType, Bytes),
}

impl SslMessage {
    pub fn parse(data: &[u8]) -> Result<Self, SslMessageParseError> {
        let Some(b) = data.first() else {
            return Err(SslMessageParseError::EmptyMessage);
        };
        let msg_type =
            SslMessageType::from_u8(*b).ok_or(SslMessageParseError::InvalidMessageType(*b))?;
        let left = &data[1..];

        match msg_type {
            SslMessageType::Error => {
                if left.len() != 2 {
                    return Err(SslMessageParseError::InvalidMessageLength);
                }
                let code = u16::from_be_bytes([left[0], left[1]]);
                Ok(SslMessage::Error(SslErrorType::from(code)))
            }
            SslMessageType::ClientHello => {
                let hello = SslClientHello::parse_msg_data(left)?;
                Ok(SslMessage::ClientHello(hello))
            }
            _ => Ok(SslMessage::Other(msg_type, Bytes::copy_from_slice(left))),
        }
    }

    pub fn msg_type(&self) -> SslMessageType {
        match self {
            SslMessage::Error(_) => SslMessageType::Error,
            SslMessage::ClientHello(_) => SslMessageType::ClientHello,
            SslMessage::Other(t, _) => *t,
        }
    }

    /// Encode an ERROR message as a complete record
    pub fn encode_error_record(error: SslErrorType, buf: &mut Vec<u8>) {
        let code = u16::from(error).to_be_bytes();
        let msg = [SslMessageType::Error as u8, code[0], code[1]];
        // a 3 bytes message always fits
        let _ = SslRecord::encode(&msg, buf);
    }
}
