/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::RawVersion;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ContentType {
    ChangeCipherSpec = 20,
    Alert = 21,
    Handshake = 22, // 0x16
    ApplicationData = 23,
    Heartbeat = 24, // RFC 6520
}

impl TryFrom<u8> for ContentType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            20 => Ok(ContentType::ChangeCipherSpec),
            21 => Ok(ContentType::Alert),
            22 => Ok(ContentType::Handshake),
            23 => Ok(ContentType::ApplicationData),
            24 => Ok(ContentType::Heartbeat),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecordParseError {
    #[error("need more data of size {0}")]
    NeedMoreData(usize),
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(RawVersion),
    #[error("invalid content type {0}")]
    InvalidContentType(u8),
    #[error("too large fragment length {0}")]
    InvalidFragmentLength(u16),
}

#[derive(Clone, Copy, Debug)]
pub struct RecordHeader {
    pub version: RawVersion,
    pub content_type: ContentType,
    pub fragment_len: u16,
}

impl RecordHeader {
    pub const SIZE: usize = 5;
    /// 2^14 for the plaintext plus the expansion allowed for protected records
    pub const MAX_FRAGMENT_LEN: u16 = (1 << 14) + 2048;
    const MAX_PLAINTEXT_LEN: usize = 1 << 14;

    pub fn parse(data: &[u8]) -> Result<Self, RecordParseError> {
        if data.len() < Self::SIZE {
            return Err(RecordParseError::NeedMoreData(Self::SIZE - data.len()));
        }

        let Ok(content_type) = ContentType::try_from(data[0]) else {
            return Err(RecordParseError::InvalidContentType(data[0]));
        };

        let version = RawVersion::new(data[1], data[2]);
        match (data[1], data[2]) {
            (3, 0) => {} // SSL 3.0
            (3, 1) => {} // TLS 1.0
            (3, 2) => {} // TLS 1.1
            (3, 3) => {} // TLS 1.2 and TLS 1.3
            _ => return Err(RecordParseError::UnsupportedVersion(version)),
        }

        let fragment_len = u16::from_be_bytes([data[3], data[4]]);
        if fragment_len > Self::MAX_FRAGMENT_LEN {
            return Err(RecordParseError::InvalidFragmentLength(fragment_len));
        }

        Ok(RecordHeader {
            version,
            content_type,
            fragment_len,
        })
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.content_type as u8);
        buf.extend_from_slice(&self.version.to_be_bytes());
        buf.extend_from_slice(&self.fragment_len.to_be_bytes());
    }
}

pub struct Record<'a> {
    pub header: RecordHeader,
    pub fragment: &'a [u8],
}

impl<'a> Record<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, RecordParseError> {
        let header = RecordHeader::parse(data)?;

        let start = RecordHeader::SIZE;
        let end = start + header.fragment_len as usize;
        if data.len() < end {
            return Err(RecordParseError::NeedMoreData(end - data.len()));
        }

        Ok(Record {
            header,
            fragment: &data[start..end],
        })
    }

    /// Get the total length of this record on the wire
    pub fn encoded_len(&self) -> usize {
        RecordHeader::SIZE + self.fragment.len()
    }

    /// Wrap the data into plaintext records, splitting it if it exceeds 2^14 bytes
    pub fn encode(content_type: ContentType, version: RawVersion, data: &[u8], buf: &mut Vec<u8>) {
        if data.is_empty() {
            let header = RecordHeader {
                version,
                content_type,
                fragment_len: 0,
            };
            header.encode(buf);
            return;
        }

        for chunk in data.chunks(RecordHeader::MAX_PLAINTEXT_LEN) {
            let header = RecordHeader {
                version,
                content_type,
                fragment_len: chunk.len() as u16,
            };
            header.encode(buf);
            buf.extend_from_slice(chunk);
        }
    }
}
