/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use std::collections::BTreeSet;
use std::time::Duration;

use g3_codec::ssl::SslMessageType;
use g3_codec::tls::{HandshakeType, RawVersion};

#[derive(Clone, Debug)]
pub struct HandshakeServerConfig {
    pub protocol_versions: BTreeSet<RawVersion>,
    /// Detect SSL 2.0 clients instead of handling every connection as TLS
    pub fallback_to_ssl: bool,
    /// Close the connection silently instead of sending TLS alerts
    pub close_on_error: bool,
    pub receive_timeout: Option<Duration>,
    pub max_handshake_message_size: u32,
}

impl Default for HandshakeServerConfig {
    fn default() -> Self {
        HandshakeServerConfig {
            protocol_versions: BTreeSet::from([
                RawVersion::TLS1_0,
                RawVersion::TLS1_1,
                RawVersion::TLS1_2,
                RawVersion::TLS1_3,
            ]),
            fallback_to_ssl: true,
            close_on_error: false,
            receive_timeout: None,
            max_handshake_message_size: 1 << 16,
        }
    }
}

impl HandshakeServerConfig {
    /// Select the version to answer a TLS client with.
    ///
    /// The client version should not be newer than the highest configured one,
    /// and the highest configured version not newer than the client one is used.
    pub fn select_protocol_version(&self, advertised: RawVersion) -> Option<RawVersion> {
        let highest = self.protocol_versions.last()?;
        if advertised > *highest {
            return None;
        }
        if advertised < RawVersion::SSL3 {
            return None;
        }
        self.protocol_versions
            .range(RawVersion::SSL3..=advertised)
            .next_back()
            .copied()
    }

    /// Select the version to answer a client hello with.
    ///
    /// The legacy version field should not be newer than the highest configured
    /// version. If the client lists supported versions, the highest configured
    /// one among them is used, otherwise selection falls back to the legacy version.
    pub fn negotiate_version(
        &self,
        legacy_version: RawVersion,
        offered_versions: Option<&[RawVersion]>,
    ) -> Option<RawVersion> {
        let highest = self.protocol_versions.last()?;
        if legacy_version > *highest {
            return None;
        }
        match offered_versions {
            Some(offered) => self
                .protocol_versions
                .range(RawVersion::SSL3..)
                .rev()
                .find(|v| offered.contains(v))
                .copied(),
            None => self.select_protocol_version(legacy_version),
        }
    }
}

/// The message type after which the capture stops
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureTarget {
    pub tls: HandshakeType,
    pub ssl: SslMessageType,
}

impl Default for CaptureTarget {
    fn default() -> Self {
        CaptureTarget {
            tls: HandshakeType::ClientHello,
            ssl: SslMessageType::ClientHello,
        }
    }
}
