/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use std::fmt;

use thiserror::Error;

use super::{ContentType, RawVersion, Record};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertLevel {
    Warning,
    Fatal,
    Unknown(u8),
}

impl From<u8> for AlertLevel {
    fn from(value: u8) -> Self {
        match value {
            1 => AlertLevel::Warning,
            2 => AlertLevel::Fatal,
            n => AlertLevel::Unknown(n),
        }
    }
}

impl AlertLevel {
    pub fn as_u8(&self) -> u8 {
        match self {
            AlertLevel::Warning => 1,
            AlertLevel::Fatal => 2,
            AlertLevel::Unknown(n) => *n,
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertLevel::Warning => f.write_str("warning"),
            AlertLevel::Fatal => f.write_str("fatal"),
            AlertLevel::Unknown(n) => write!(f, "level({n})"),
        }
    }
}

macro_rules! alert_descriptions {
    ($($name:ident = $value:literal => $s:literal,)+) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum AlertDescription {
            $($name,)+
            Unknown(u8),
        }

        impl From<u8> for AlertDescription {
            fn from(value: u8) -> Self {
                match value {
                    $($value => AlertDescription::$name,)+
                    n => AlertDescription::Unknown(n),
                }
            }
        }

        impl AlertDescription {
            pub fn as_u8(&self) -> u8 {
                match self {
                    $(AlertDescription::$name => $value,)+
                    AlertDescription::Unknown(n) => *n,
                }
            }
        }

        impl fmt::Display for AlertDescription {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(AlertDescription::$name => f.write_str($s),)+
                    AlertDescription::Unknown(n) => write!(f, "description({n})"),
                }
            }
        }
    };
}

alert_descriptions! {
    CloseNotify = 0 => "close_notify",
    UnexpectedMessage = 10 => "unexpected_message",
    BadRecordMac = 20 => "bad_record_mac",
    DecryptionFailed = 21 => "decryption_failed",
    RecordOverflow = 22 => "record_overflow",
    DecompressionFailure = 30 => "decompression_failure",
    HandshakeFailure = 40 => "handshake_failure",
    NoCertificate = 41 => "no_certificate",
    BadCertificate = 42 => "bad_certificate",
    UnsupportedCertificate = 43 => "unsupported_certificate",
    CertificateRevoked = 44 => "certificate_revoked",
    CertificateExpired = 45 => "certificate_expired",
    CertificateUnknown = 46 => "certificate_unknown",
    IllegalParameter = 47 => "illegal_parameter",
    UnknownCa = 48 => "unknown_ca",
    AccessDenied = 49 => "access_denied",
    DecodeError = 50 => "decode_error",
    DecryptError = 51 => "decrypt_error",
    ExportRestriction = 60 => "export_restriction",
    ProtocolVersion = 70 => "protocol_version",
    InsufficientSecurity = 71 => "insufficient_security",
    InternalError = 80 => "internal_error",
    InappropriateFallback = 86 => "inappropriate_fallback",
    UserCanceled = 90 => "user_canceled",
    NoRenegotiation = 100 => "no_renegotiation",
    MissingExtension = 109 => "missing_extension",
    UnsupportedExtension = 110 => "unsupported_extension",
    UnrecognizedName = 112 => "unrecognized_name",
    BadCertificateStatusResponse = 113 => "bad_certificate_status_response",
    UnknownPskIdentity = 115 => "unknown_psk_identity",
    CertificateRequired = 116 => "certificate_required",
    NoApplicationProtocol = 120 => "no_application_protocol",
}

#[derive(Debug, Error)]
pub enum AlertParseError {
    #[error("invalid alert length {0}")]
    InvalidLength(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub description: AlertDescription,
}

impl Alert {
    pub const SIZE: usize = 2;

    pub const fn new(level: AlertLevel, description: AlertDescription) -> Self {
        Alert { level, description }
    }

    pub fn parse(data: &[u8]) -> Result<Self, AlertParseError> {
        if data.len() != Self::SIZE {
            return Err(AlertParseError::InvalidLength(data.len()));
        }
        Ok(Alert {
            level: AlertLevel::from(data[0]),
            description: AlertDescription::from(data[1]),
        })
    }

    pub fn is_fatal(&self) -> bool {
        self.level == AlertLevel::Fatal
    }

    /// Encode as a complete alert record
    pub fn encode_record(&self, version: RawVersion, buf: &mut Vec<u8>) {
        let data = [self.level.as_u8(), self.description.as_u8()];
        Record::encode(ContentType::Alert, version, &data, buf);
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.level, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let alert = Alert::parse(&[0x02, 0x46]).unwrap();
        assert!(alert.is_fatal());
        assert_eq!(alert.description, AlertDescription::ProtocolVersion);
        assert_eq!(alert.to_string(), "fatal:protocol_version");

        let alert = Alert::parse(&[0x01, 0xfe]).unwrap();
        assert_eq!(alert.level, AlertLevel::Warning);
        assert_eq!(alert.description, AlertDescription::Unknown(0xfe));

        assert!(Alert::parse(&[0x01]).is_err());
        assert!(Alert::parse(&[0x01, 0x00, 0x00]).is_err());
    }

    #[test]
    fn encode_record() {
        let alert = Alert::new(AlertLevel::Warning, AlertDescription::CloseNotify);
        let mut buf = Vec::new();
        alert.encode_record(RawVersion::TLS1_2, &mut buf);
        assert_eq!(buf, [0x15, 0x03, 0x03, 0x00, 0x02, 0x01, 0x00]);
    }
}
