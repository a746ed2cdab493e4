/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SslRecordParseError {
    #[error("need more data of size {0}")]
    NeedMoreData(usize),
    #[error("invalid padding length {0}")]
    InvalidPadding(u8),
    #[error("empty record")]
    EmptyRecord,
}

#[derive(Debug, Error)]
pub enum SslRecordEncodeError {
    #[error("too long message size {0}")]
    MessageTooLong(usize),
}

#[derive(Clone, Copy, Debug)]
pub struct SslRecordHeader {
    header_len: u8,
    pub data_len: u16,
    pub padding_len: u8,
}

impl SslRecordHeader {
    const MAX_DATA_LEN_SHORT: usize = 0x7fff;
    // block ciphers of SSL 2.0 are all 64 bits
    const MAX_PADDING_LEN: u8 = 7;

    /// Parse the 2-byte or 3-byte record header
    pub fn parse(data: &[u8]) -> Result<Self, SslRecordParseError> {
        if data.len() < 2 {
            return Err(SslRecordParseError::NeedMoreData(2 - data.len()));
        }

        let header = if data[0] & 0x80 != 0 {
            SslRecordHeader {
                header_len: 2,
                data_len: u16::from_be_bytes([data[0] & 0x7f, data[1]]),
                padding_len: 0,
            }
        } else {
            if data.len() < 3 {
                return Err(SslRecordParseError::NeedMoreData(3 - data.len()));
            }
            let padding_len = data[2];
            if padding_len > Self::MAX_PADDING_LEN {
                return Err(SslRecordParseError::InvalidPadding(padding_len));
            }
            SslRecordHeader {
                header_len: 3,
                data_len: u16::from_be_bytes([data[0] & 0x3f, data[1]]),
                padding_len,
            }
        };

        if header.data_len == 0 {
            return Err(SslRecordParseError::EmptyRecord);
        }
        if header.padding_len as u16 > header.data_len {
            return Err(SslRecordParseError::InvalidPadding(header.padding_len));
        }
        Ok(header)
    }

    #[inline]
    pub fn header_len(&self) -> usize {
        self.header_len as usize
    }

    pub fn encoded_cap(&self) -> usize {
        self.header_len() + self.data_len as usize
    }
}

/// An SSL 2.0 record, which always carries exactly one message
pub struct SslRecord<'a> {
    pub header: SslRecordHeader,
    pub message: &'a [u8],
}

impl<'a> SslRecord<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, SslRecordParseError> {
        let header = SslRecordHeader::parse(data)?;

        let end = header.encoded_cap();
        if data.len() < end {
            return Err(SslRecordParseError::NeedMoreData(end - data.len()));
        }

        let start = header.header_len();
        let message_end = end - header.padding_len as usize;
        Ok(SslRecord {
            header,
            message: &data[start..message_end],
        })
    }

    pub fn encoded_len(&self) -> usize {
        self.header.encoded_cap()
    }

    /// Wrap the message into a record with the 2-byte header form
    pub fn encode(message: &[u8], buf: &mut Vec<u8>) -> Result<(), SslRecordEncodeError> {
        if message.len() > SslRecordHeader::MAX_DATA_LEN_SHORT {
            return Err(SslRecordEncodeError::MessageTooLong(message.len()));
        }
        let len = message.len() as u16 | 0x8000;
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(message);
        Ok(())
    }
}
