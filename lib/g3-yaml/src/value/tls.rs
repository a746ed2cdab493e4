/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::anyhow;
use yaml_rust::Yaml;

use g3_codec::ssl::SslMessageType;
use g3_codec::tls::{HandshakeType, RawVersion};

pub fn as_tls_version(value: &Yaml) -> anyhow::Result<RawVersion> {
    match value {
        Yaml::Real(s) | Yaml::String(s) => RawVersion::from_str(s).map_err(anyhow::Error::new),
        _ => Err(anyhow!(
            "yaml value type for tls version should be 'string' or 'float'"
        )),
    }
}

pub fn as_tls_handshake_type(value: &Yaml) -> anyhow::Result<HandshakeType> {
    if let Yaml::String(s) = value {
        HandshakeType::from_str(s).map_err(|_| anyhow!("unknown tls handshake message type {s}"))
    } else {
        Err(anyhow!(
            "yaml value type for tls handshake message type should be 'string'"
        ))
    }
}

pub fn as_ssl_message_type(value: &Yaml) -> anyhow::Result<SslMessageType> {
    if let Yaml::String(s) = value {
        SslMessageType::from_str(s).map_err(|_| anyhow!("unknown ssl message type {s}"))
    } else {
        Err(anyhow!("yaml value type for ssl message type should be 'string'"))
    }
}
