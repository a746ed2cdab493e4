/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use std::collections::{BTreeSet, HashSet};
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use g3_tls_capture::{CaptureTarget, HandshakeServerConfig};

const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct CaptureServerConfig {
    name: String,
    pub(crate) listen: Option<SocketAddr>,
    pub(crate) handshake: HandshakeServerConfig,
    pub(crate) target: CaptureTarget,
    pub(crate) concurrency_limit: usize,
}

impl CaptureServerConfig {
    pub(crate) fn new() -> Self {
        CaptureServerConfig {
            name: String::new(),
            listen: None,
            handshake: HandshakeServerConfig {
                receive_timeout: Some(DEFAULT_RECEIVE_TIMEOUT),
                ..Default::default()
            },
            target: CaptureTarget::default(),
            concurrency_limit: 0,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn parse(map: &yaml::Hash) -> anyhow::Result<Self> {
        let mut server = CaptureServerConfig::new();

        g3_yaml::foreach_kv(map, |k, v| server.set(k, v))?;

        server.check()?;
        Ok(server)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.name.is_empty() {
            return Err(anyhow!("name is not set"));
        }
        if self.listen.is_none() {
            return Err(anyhow!("listen address is not set"));
        }
        Ok(())
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match g3_yaml::key::normalize(k).as_str() {
            "name" => {
                self.name = g3_yaml::value::as_string(v)?;
                Ok(())
            }
            "listen" => {
                let addr = g3_yaml::value::as_sockaddr(v)
                    .context(format!("invalid socket address value for key {k}"))?;
                self.listen = Some(addr);
                Ok(())
            }
            "protocol_versions" => {
                let versions = g3_yaml::value::as_list(v, g3_yaml::value::as_tls_version)
                    .context(format!("invalid tls version list value for key {k}"))?;
                self.handshake.protocol_versions = BTreeSet::from_iter(versions);
                Ok(())
            }
            "fallback_to_ssl" => {
                self.handshake.fallback_to_ssl = g3_yaml::value::as_bool(v)?;
                Ok(())
            }
            "close_on_error" => {
                self.handshake.close_on_error = g3_yaml::value::as_bool(v)?;
                Ok(())
            }
            "receive_timeout" => {
                let timeout = g3_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                self.handshake.receive_timeout = if timeout.is_zero() {
                    None
                } else {
                    Some(timeout)
                };
                Ok(())
            }
            "max_handshake_message_size" => {
                self.handshake.max_handshake_message_size = g3_yaml::humanize::as_u32(v)
                    .context(format!("invalid humanize u32 value for key {k}"))?;
                Ok(())
            }
            "capture_until" => {
                self.target.tls = g3_yaml::value::as_tls_handshake_type(v)?;
                Ok(())
            }
            "ssl_capture_until" => {
                self.target.ssl = g3_yaml::value::as_ssl_message_type(v)?;
                Ok(())
            }
            "concurrency_limit" => {
                self.concurrency_limit = g3_yaml::value::as_usize(v)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }
}

pub(super) fn load_all(v: &Yaml) -> anyhow::Result<Vec<CaptureServerConfig>> {
    let servers = match v {
        Yaml::Hash(map) => vec![CaptureServerConfig::parse(map)?],
        Yaml::Array(seq) => {
            let mut servers = Vec::with_capacity(seq.len());
            for (i, v) in seq.iter().enumerate() {
                let Yaml::Hash(map) = v else {
                    return Err(anyhow!("server #{i} should be a map"));
                };
                let server =
                    CaptureServerConfig::parse(map).context(format!("invalid server #{i}"))?;
                servers.push(server);
            }
            servers
        }
        _ => return Err(anyhow!("invalid value type for server config")),
    };

    let mut names = HashSet::new();
    for server in &servers {
        if !names.insert(server.name()) {
            return Err(anyhow!("duplicate server name {}", server.name()));
        }
    }
    Ok(servers)
}
