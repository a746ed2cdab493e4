/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use bytes::Bytes;

use super::{HandshakeHeader, HandshakeType};
use crate::tls::{Extension, RawVersion};

pub struct ServerHello {
    pub version: RawVersion,
    pub random: [u8; 32],
    pub session_id: Bytes,
    pub cipher_suite: u16,
    pub compression_method: u8,
    pub extensions: Vec<Extension>,
}

impl ServerHello {
    /// Encode as a complete handshake message, including the handshake header.
    ///
    /// The extensions length field is always written, even when there is no extension.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        let mut body = Vec::with_capacity(2 + 32 + 1 + self.session_id.len() + 3 + 2);
        body.extend_from_slice(&self.version.to_be_bytes());
        body.extend_from_slice(&self.random);
        body.push(self.session_id.len() as u8);
        body.extend_from_slice(&self.session_id);
        body.extend_from_slice(&self.cipher_suite.to_be_bytes());
        body.push(self.compression_method);

        let mut ext_buf = Vec::new();
        for ext in &self.extensions {
            ext.encode(&mut ext_buf);
        }
        body.extend_from_slice(&(ext_buf.len() as u16).to_be_bytes());
        body.extend_from_slice(&ext_buf);

        HandshakeHeader::encode(HandshakeType::ServerHello, body.len(), buf);
        buf.extend_from_slice(&body);
    }
}
