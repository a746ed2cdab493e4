/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use bytes::Bytes;
use thiserror::Error;

use super::RawVersion;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionType {
    ServerName,                          // rfc6066
    MaxFragmentLength,                   // rfc6066
    StatusRequest,                       // rfc6066
    SupportedGroups,                     // rfc8422, rfc7919
    EcPointFormats,                      // rfc8422
    SignatureAlgorithms,                 // rfc8446
    UseSrtp,                             // rfc5764
    Heartbeat,                           // rfc6520
    ApplicationLayerProtocolNegotiation, // rfc7301
    SignedCertificateTimestamp,          // rfc6962
    ClientCertificateType,               // rfc7250
    ServerCertificateType,               // rfc7250
    Padding,                             // rfc7685
    EncryptThenMac,                      // rfc7366
    ExtendedMasterSecret,                // rfc7627
    SessionTicket,                       // rfc5077
    PreSharedKey,                        // rfc8446(TLS1.3)
    EarlyData,                           // rfc8446(TLS1.3)
    SupportedVersions,                   // rfc8446(TLS1.3)
    Cookie,                              // rfc8446(TLS1.3)
    PskKeyExchangeModes,                 // rfc8446(TLS1.3)
    CertificateAuthorities,              // rfc8446(TLS1.3)
    OidFilters,                          // rfc8446(TLS1.3)
    PostHandshakeAuth,                   // rfc8446(TLS1.3)
    SignatureAlgorithmsCert,             // rfc8446(TLS1.3)
    KeyShare,                            // rfc8446(TLS1.3)
    RenegotiationInfo,                   // rfc5746
    Unknown(u16),
}

impl From<u16> for ExtensionType {
    fn from(value: u16) -> Self {
        match value {
            0 => ExtensionType::ServerName,
            1 => ExtensionType::MaxFragmentLength,
            5 => ExtensionType::StatusRequest,
            10 => ExtensionType::SupportedGroups,
            11 => ExtensionType::EcPointFormats,
            13 => ExtensionType::SignatureAlgorithms,
            14 => ExtensionType::UseSrtp,
            15 => ExtensionType::Heartbeat,
            16 => ExtensionType::ApplicationLayerProtocolNegotiation,
            18 => ExtensionType::SignedCertificateTimestamp,
            19 => ExtensionType::ClientCertificateType,
            20 => ExtensionType::ServerCertificateType,
            21 => ExtensionType::Padding,
            22 => ExtensionType::EncryptThenMac,
            23 => ExtensionType::ExtendedMasterSecret,
            35 => ExtensionType::SessionTicket,
            41 => ExtensionType::PreSharedKey,
            42 => ExtensionType::EarlyData,
            43 => ExtensionType::SupportedVersions,
            44 => ExtensionType::Cookie,
            45 => ExtensionType::PskKeyExchangeModes,
            47 => ExtensionType::CertificateAuthorities,
            48 => ExtensionType::OidFilters,
            49 => ExtensionType::PostHandshakeAuth,
            50 => ExtensionType::SignatureAlgorithmsCert,
            51 => ExtensionType::KeyShare,
            0xff01 => ExtensionType::RenegotiationInfo,
            n => ExtensionType::Unknown(n),
        }
    }
}

impl From<ExtensionType> for u16 {
    fn from(value: ExtensionType) -> Self {
        match value {
            ExtensionType::ServerName => 0,
            ExtensionType::MaxFragmentLength => 1,
            ExtensionType::StatusRequest => 5,
            ExtensionType::SupportedGroups => 10,
            ExtensionType::EcPointFormats => 11,
            ExtensionType::SignatureAlgorithms => 13,
            ExtensionType::UseSrtp => 14,
            ExtensionType::Heartbeat => 15,
            ExtensionType::ApplicationLayerProtocolNegotiation => 16,
            ExtensionType::SignedCertificateTimestamp => 18,
            ExtensionType::ClientCertificateType => 19,
            ExtensionType::ServerCertificateType => 20,
            ExtensionType::Padding => 21,
            ExtensionType::EncryptThenMac => 22,
            ExtensionType::ExtendedMasterSecret => 23,
            ExtensionType::SessionTicket => 35,
            ExtensionType::PreSharedKey => 41,
            ExtensionType::EarlyData => 42,
            ExtensionType::SupportedVersions => 43,
            ExtensionType::Cookie => 44,
            ExtensionType::PskKeyExchangeModes => 45,
            ExtensionType::CertificateAuthorities => 47,
            ExtensionType::OidFilters => 48,
            ExtensionType::PostHandshakeAuth => 49,
            ExtensionType::SignatureAlgorithmsCert => 50,
            ExtensionType::KeyShare => 51,
            ExtensionType::RenegotiationInfo => 0xff01,
            ExtensionType::Unknown(n) => n,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtensionParseError {
    #[error("not enough data")]
    NotEnoughData,
    #[error("invalid length")]
    InvalidLength,
}

#[derive(Clone, Debug)]
pub struct Extension {
    ext_type: ExtensionType,
    ext_data: Bytes,
}

impl Extension {
    const HEADER_LEN: usize = 4;

    pub fn new(ext_type: ExtensionType, ext_data: Bytes) -> Self {
        Extension { ext_type, ext_data }
    }

    pub fn r#type(&self) -> ExtensionType {
        self.ext_type
    }

    pub fn data(&self) -> &Bytes {
        &self.ext_data
    }

    fn encoded_len(&self) -> usize {
        Self::HEADER_LEN + self.ext_data.len()
    }

    fn parse(data: &Bytes) -> Result<Self, ExtensionParseError> {
        if data.len() < Self::HEADER_LEN {
            return Err(ExtensionParseError::NotEnoughData);
        }

        let ext_type = u16::from_be_bytes([data[0], data[1]]);
        let ext_len = u16::from_be_bytes([data[2], data[3]]) as usize;

        let start = Self::HEADER_LEN;
        let end = start + ext_len;
        if end > data.len() {
            return Err(ExtensionParseError::InvalidLength);
        }
        Ok(Extension {
            ext_type: ext_type.into(),
            ext_data: data.slice(start..end),
        })
    }

    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&u16::from(self.ext_type).to_be_bytes());
        buf.extend_from_slice(&(self.ext_data.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.ext_data);
    }

    /// Decode the versions list of a client side supported_versions extension
    pub fn parse_supported_versions(&self) -> Result<Vec<RawVersion>, ExtensionParseError> {
        let data = &self.ext_data;
        if data.is_empty() {
            return Err(ExtensionParseError::NotEnoughData);
        }
        let list_len = data[0] as usize;
        if list_len & 0x01 != 0 || data.len() != 1 + list_len {
            return Err(ExtensionParseError::InvalidLength);
        }
        Ok(data[1..]
            .chunks_exact(2)
            .map(|v| RawVersion::new(v[0], v[1]))
            .collect())
    }

    /// Get the first host_name entry of a server_name extension
    pub fn parse_server_name(&self) -> Result<Option<&str>, ExtensionParseError> {
        let data = &self.ext_data;
        if data.len() < 2 {
            return Err(ExtensionParseError::NotEnoughData);
        }
        let list_len = u16::from_be_bytes([data[0], data[1]]) as usize;
        if data.len() != 2 + list_len {
            return Err(ExtensionParseError::InvalidLength);
        }

        let mut offset = 2;
        while offset < data.len() {
            let left = &data[offset..];
            if left.len() < 3 {
                return Err(ExtensionParseError::NotEnoughData);
            }
            let name_type = left[0];
            let name_len = u16::from_be_bytes([left[1], left[2]]) as usize;
            if left.len() < 3 + name_len {
                return Err(ExtensionParseError::InvalidLength);
            }
            if name_type == 0 {
                return Ok(std::str::from_utf8(&left[3..3 + name_len]).ok());
            }
            offset += 3 + name_len;
        }
        Ok(None)
    }
}

pub struct ExtensionIter {
    data: Bytes,
    offset: usize,
}

impl ExtensionIter {
    pub fn new(data: Bytes) -> Self {
        ExtensionIter { data, offset: 0 }
    }
}

impl Iterator for ExtensionIter {
    type Item = Result<Extension, ExtensionParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset < self.data.len() {
            match Extension::parse(&self.data.slice(self.offset..)) {
                Ok(ext) => {
                    self.offset += ext.encoded_len();
                    Some(Ok(ext))
                }
                Err(e) => {
                    self.offset = self.data.len();
                    Some(Err(e))
                }
            }
        } else {
            None
        }
    }
}
