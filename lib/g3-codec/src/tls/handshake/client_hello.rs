/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use bytes::Bytes;
use thiserror::Error;

use crate::tls::{Extension, ExtensionIter, ExtensionParseError, ExtensionType, RawVersion};

#[derive(Debug, Error)]
pub enum ClientHelloParseError {
    #[error("invalid message type {0}")]
    InvalidMessageType(u8),
    #[error("invalid message length")]
    InvalidMessageLength,
    #[error("invalid cipher suites length")]
    InvalidCipherSuitesLength,
    #[error("invalid extensions: {0}")]
    InvalidExtensions(#[from] ExtensionParseError),
}

/// A decoded ClientHello message.
///
/// The legacy version is not checked here, so hellos of unknown or future
/// versions could still be captured.
#[derive(Clone, Debug)]
pub struct ClientHello {
    pub legacy_version: RawVersion,
    pub random: [u8; 32],
    pub session_id: Bytes,
    pub cipher_suites: Vec<u16>,
    pub compression_methods: Bytes,
    pub extensions: Vec<Extension>,
}

impl ClientHello {
    pub(crate) fn parse_msg_data(data: &Bytes) -> Result<Self, ClientHelloParseError> {
        if data.len() < 2 {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }
        let legacy_version = RawVersion::new(data[0], data[1]);

        // Random Data
        let mut offset = 2;
        let left = &data[offset..];
        if left.len() < 32 {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }
        let mut random = [0u8; 32];
        random.copy_from_slice(&left[..32]);
        offset += 32;

        // Session ID
        let left = &data[offset..];
        if left.is_empty() {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }
        let session_id_len = left[0] as usize;
        if left.len() < 1 + session_id_len {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }
        let session_id = data.slice(offset + 1..offset + 1 + session_id_len);
        offset += 1 + session_id_len;

        // Cipher Suites
        let left = &data[offset..];
        if left.len() < 2 {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }
        let cipher_suites_len = u16::from_be_bytes([left[0], left[1]]) as usize;
        if cipher_suites_len == 0 || cipher_suites_len & 0x01 != 0 {
            return Err(ClientHelloParseError::InvalidCipherSuitesLength);
        }
        if left.len() < 2 + cipher_suites_len {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }
        let cipher_suites = left[2..2 + cipher_suites_len]
            .chunks_exact(2)
            .map(|v| u16::from_be_bytes([v[0], v[1]]))
            .collect();
        offset += 2 + cipher_suites_len;

        // Compression Methods
        let left = &data[offset..];
        if left.is_empty() {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }
        let compression_methods_len = left[0] as usize;
        if left.len() < 1 + compression_methods_len {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }
        let compression_methods = data.slice(offset + 1..offset + 1 + compression_methods_len);
        offset += 1 + compression_methods_len;

        if data.len() <= offset {
            // No Extensions
            return Ok(ClientHello {
                legacy_version,
                random,
                session_id,
                cipher_suites,
                compression_methods,
                extensions: Vec::new(),
            });
        }

        // Extensions
        let left = &data[offset..];
        if left.len() < 2 {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }
        let extensions_len = u16::from_be_bytes([left[0], left[1]]) as usize;
        if left.len() != 2 + extensions_len {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }
        let start = offset + 2;
        let extensions = ExtensionIter::new(data.slice(start..start + extensions_len))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ClientHello {
            legacy_version,
            random,
            session_id,
            cipher_suites,
            compression_methods,
            extensions,
        })
    }

    pub fn get_ext(&self, ext_type: ExtensionType) -> Option<&Extension> {
        self.extensions.iter().find(|ext| ext.r#type() == ext_type)
    }

    /// The versions listed in the supported_versions extension, if present
    pub fn supported_versions(&self) -> Result<Option<Vec<RawVersion>>, ExtensionParseError> {
        match self.get_ext(ExtensionType::SupportedVersions) {
            Some(ext) => ext.parse_supported_versions().map(Some),
            None => Ok(None),
        }
    }

    /// The non-GREASE versions in supported_versions.
    ///
    /// None if the extension is absent, malformed or has no real value.
    pub fn offered_versions(&self) -> Option<Vec<RawVersion>> {
        let Ok(Some(versions)) = self.supported_versions() else {
            return None;
        };
        let versions: Vec<RawVersion> = versions.into_iter().filter(|v| !v.is_grease()).collect();
        if versions.is_empty() {
            None
        } else {
            Some(versions)
        }
    }

    /// The highest version the client is willing to speak
    pub fn advertised_version(&self) -> RawVersion {
        self.offered_versions()
            .and_then(|versions| versions.into_iter().max())
            .unwrap_or(self.legacy_version)
    }

    pub fn server_name(&self) -> Option<&str> {
        self.get_ext(ExtensionType::ServerName)
            .and_then(|ext| ext.parse_server_name().ok().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::{HandshakeCoalescer, HandshakeType, Record};

    #[test]
    fn tls1_2() {
        let data: &[u8] = &[
            0x16, //
            0x03, 0x01, // TLS 1.0
            0x00, 0x65, // Fragment Length, 101
            0x01, // Handshake Type - ClientHello
            0x00, 0x00, 0x61, // Message Length, 97
            0x03, 0x03, // TLS 1.2
            0x74, 0x90, 0x65, 0xea, 0xbb, 0x00, 0x5d, 0xf8, 0xdf, 0xd6, 0xde, 0x04, 0xf8, 0xd3,
            0x69, 0x02, 0xf5, 0x8c, 0x82, 0x50, 0x7a, 0x40, 0xf6, 0xf3, 0xbb, 0x18, 0xc0, 0xac,
            0x4f, 0x55, 0x9a, 0xda, // Random data, 32 bytes
            0x20, // Session ID Length
            0x57, 0x5a, 0x8d, 0x9c, 0xa3, 0x8e, 0x16, 0xbd, 0xb6, 0x6c, 0xe7, 0x35, 0x62, 0x63,
            0x7f, 0x51, 0x5f, 0x6e, 0x97, 0xf7, 0xf9, 0x85, 0xad, 0xf0, 0x2d, 0x3a, 0x72, 0x9d,
            0x71, 0x0b, 0xe1, 0x32, // Session ID, 32 bytes
            0x00, 0x04, // Cipher Suites Length
            0x13, 0x02, 0x13, 0x01, // Cipher Suites
            0x01, // Compression Methods Length
            0x00, // Compression Methods
            0x00, 0x14, // Extensions Length, 20
            0x00, 0x00, // Extension Type - Server Name
            0x00, 0x10, // Extension Length, 16
            0x00, 0x0e, // Server Name List Length, 14
            0x00, // Server Name Type - Domain
            0x00, 0x0b, // Server Name Length, 11
            b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'.', b'n', b'e', b't',
        ];

        let record = Record::parse(data).unwrap();
        assert_eq!(record.encoded_len(), data.len());
        let mut coalescer = HandshakeCoalescer::default();
        coalescer.coalesce_fragment(record.fragment);
        let msg = coalescer.next_message().unwrap().unwrap();
        assert_eq!(msg.msg_type(), HandshakeType::ClientHello);

        let ch = msg.parse_client_hello().unwrap();
        assert_eq!(ch.legacy_version, RawVersion::TLS1_2);
        assert_eq!(ch.random[0], 0x74);
        assert_eq!(ch.session_id.len(), 32);
        assert_eq!(ch.cipher_suites, vec![0x1302, 0x1301]);
        assert_eq!(ch.compression_methods.as_ref(), &[0x00]);
        assert_eq!(ch.server_name(), Some("example.net"));
        assert!(ch.supported_versions().unwrap().is_none());
    }

    #[test]
    fn future_version() {
        let mut data = vec![0x03, 0x05];
        data.extend_from_slice(&[0u8; 32]);
        data.extend_from_slice(&[0x00, 0x00, 0x02, 0x00, 0x2f, 0x01, 0x00]);
        let ch = ClientHello::parse_msg_data(&Bytes::from(data)).unwrap();
        assert_eq!(ch.legacy_version, RawVersion::new(3, 5));
        assert!(ch.session_id.is_empty());
        assert!(ch.extensions.is_empty());
    }

    #[test]
    fn advertised_version() {
        let mut data = vec![0x03, 0x03];
        data.extend_from_slice(&[0u8; 32]);
        data.extend_from_slice(&[0x00, 0x00, 0x02, 0x13, 0x01, 0x01, 0x00]);
        data.extend_from_slice(&[
            0x00, 0x0b, // Extensions Length
            0x00, 0x2b, 0x00, 0x07, // supported_versions
            0x06, 0x3a, 0x3a, 0x03, 0x04, 0x03, 0x03,
        ]);
        let ch = ClientHello::parse_msg_data(&Bytes::from(data)).unwrap();
        assert_eq!(
            ch.supported_versions().unwrap().unwrap(),
            vec![
                RawVersion::new(0x3a, 0x3a),
                RawVersion::TLS1_3,
                RawVersion::TLS1_2
            ]
        );
        assert_eq!(
            ch.offered_versions(),
            Some(vec![RawVersion::TLS1_3, RawVersion::TLS1_2])
        );
        assert_eq!(ch.advertised_version(), RawVersion::TLS1_3);
    }

    #[test]
    fn advertised_version_grease_only() {
        let mut data = vec![0x03, 0x01];
        data.extend_from_slice(&[0u8; 32]);
        data.extend_from_slice(&[0x00, 0x00, 0x02, 0x00, 0x2f, 0x01, 0x00]);
        data.extend_from_slice(&[0x00, 0x07, 0x00, 0x2b, 0x00, 0x03, 0x02, 0xda, 0xda]);
        let ch = ClientHello::parse_msg_data(&Bytes::from(data)).unwrap();
        assert!(ch.offered_versions().is_none());
        assert_eq!(ch.advertised_version(), RawVersion::TLS1_0);
    }

    #[test]
    fn invalid_cipher_suites_len() {
        let mut data = vec![0x03, 0x03];
        data.extend_from_slice(&[0u8; 32]);
        data.extend_from_slice(&[0x00, 0x00, 0x03, 0x00, 0x2f, 0x00, 0x01, 0x00]);
        assert!(matches!(
            ClientHello::parse_msg_data(&Bytes::from(data)),
            Err(ClientHelloParseError::InvalidCipherSuitesLength)
        ));
    }

    #[test]
    fn invalid_ext_len() {
        let mut data = vec![0x03, 0x03];
        data.extend_from_slice(&[0u8; 32]);
        data.extend_from_slice(&[0x00, 0x00, 0x02, 0x00, 0x2f, 0x01, 0x00]);
        data.extend_from_slice(&[0x00, 0x04, 0x00, 0x2b, 0x00, 0x10]);
        assert!(matches!(
            ClientHello::parse_msg_data(&Bytes::from(data)),
            Err(ClientHelloParseError::InvalidExtensions(_))
        ));
    }

    #[test]
    fn invalid_ext_list_len() {
        let mut data = vec![0x03, 0x03];
        data.extend_from_slice(&[0u8; 32]);
        data.extend_from_slice(&[0x00, 0x00, 0x02, 0x00, 0x2f, 0x01, 0x00]);
        data.extend_from_slice(&[0x01, 0x04, 0x00, 0x17, 0x00, 0x00]);
        assert!(matches!(
            ClientHello::parse_msg_data(&Bytes::from(data)),
            Err(ClientHelloParseError::InvalidMessageLength)
        ));
    }

    #[test]
    fn wrong_message_type() {
        let msg = crate::tls::HandshakeMessage::new(
            HandshakeType::Finished,
            Bytes::from_static(&[0x00]),
        );
        assert!(matches!(
            msg.parse_client_hello(),
            Err(ClientHelloParseError::InvalidMessageType(20))
        ));
    }
}
