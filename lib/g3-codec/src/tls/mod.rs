/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Protocol version as it appears on the wire.
///
/// The derived ordering follows the wire value, so `SSL2 < SSL3 < TLS1_0 < ... < TLS1_3`,
/// and unknown future versions such as `3.5` sort above all known ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawVersion {
    major: u8,
    minor: u8,
}

impl RawVersion {
    pub const SSL2: RawVersion = RawVersion::new(0, 2);
    pub const SSL3: RawVersion = RawVersion::new(3, 0);
    pub const TLS1_0: RawVersion = RawVersion::new(3, 1);
    pub const TLS1_1: RawVersion = RawVersion::new(3, 2);
    pub const TLS1_2: RawVersion = RawVersion::new(3, 3);
    pub const TLS1_3: RawVersion = RawVersion::new(3, 4);

    pub const fn new(major: u8, minor: u8) -> Self {
        RawVersion { major, minor }
    }

    #[inline]
    pub fn major(&self) -> u8 {
        self.major
    }

    #[inline]
    pub fn minor(&self) -> u8 {
        self.minor
    }

    /// GREASE values from rfc8701, 0x?a?a with equal bytes
    pub fn is_grease(&self) -> bool {
        self.major == self.minor && (self.minor & 0x0f) == 0x0a
    }

    pub fn to_be_bytes(self) -> [u8; 2] {
        [self.major, self.minor]
    }

    fn known_name(&self) -> Option<&'static str> {
        match (self.major, self.minor) {
            (0, 2) => Some("SSLv2"),
            (3, 0) => Some("SSLv3"),
            (3, 1) => Some("TLS1.0"),
            (3, 2) => Some("TLS1.1"),
            (3, 3) => Some("TLS1.2"),
            (3, 4) => Some("TLS1.3"),
            _ => None,
        }
    }
}

impl From<u16> for RawVersion {
    fn from(value: u16) -> Self {
        let [major, minor] = value.to_be_bytes();
        RawVersion { major, minor }
    }
}

impl From<RawVersion> for u16 {
    fn from(value: RawVersion) -> Self {
        u16::from_be_bytes([value.major, value.minor])
    }
}

impl fmt::Display for RawVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.known_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:02x}{:02x}", self.major, self.minor),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown protocol version {0}")]
pub struct VersionNameError(String);

impl FromStr for RawVersion {
    type Err = VersionNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ssl2" | "sslv2" | "ssl2.0" => Ok(RawVersion::SSL2),
            "ssl3" | "sslv3" | "ssl3.0" => Ok(RawVersion::SSL3),
            "1.0" | "tls10" | "tls1.0" | "tls1_0" => Ok(RawVersion::TLS1_0),
            "1.1" | "tls11" | "tls1.1" | "tls1_1" => Ok(RawVersion::TLS1_1),
            "1.2" | "tls12" | "tls1.2" | "tls1_2" => Ok(RawVersion::TLS1_2),
            "1.3" | "tls13" | "tls1.3" | "tls1_3" => Ok(RawVersion::TLS1_3),
            _ => Err(VersionNameError(s.to_string())),
        }
    }
}

mod record;
pub use record::{ContentType, Record, RecordHeader, RecordParseError};

mod handshake;
pub use handshake::{
    ClientHello, ClientHelloParseError, HandshakeCoalesceError, HandshakeCoalescer,
    HandshakeHeader, HandshakeMessage, HandshakeType, ServerHello,
};

mod extension;
pub use extension::{Extension, ExtensionIter, ExtensionParseError, ExtensionType};

mod alert;
pub use alert::{Alert, AlertDescription, AlertLevel, AlertParseError};
