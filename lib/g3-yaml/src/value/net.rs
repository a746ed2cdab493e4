/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use anyhow::anyhow;
use yaml_rust::Yaml;

/// A bare port number listens on all addresses
pub fn as_sockaddr(v: &Yaml) -> anyhow::Result<SocketAddr> {
    match v {
        Yaml::String(s) => {
            if let Ok(port) = u16::from_str(s) {
                return Ok(SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port));
            }
            SocketAddr::from_str(s).map_err(|e| anyhow!("invalid socket address {s}: {e}"))
        }
        Yaml::Integer(i) => {
            let port = u16::try_from(*i).map_err(|_| anyhow!("out of range port {i}"))?;
            Ok(SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port))
        }
        _ => Err(anyhow!(
            "yaml value type for 'SocketAddr' should be 'string' or 'integer'"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_sockaddr() {
        let v = Yaml::String("127.0.0.1:4433".to_string());
        assert_eq!(
            as_sockaddr(&v).unwrap(),
            SocketAddr::from_str("127.0.0.1:4433").unwrap()
        );

        let v = Yaml::String("[::1]:4433".to_string());
        assert_eq!(
            as_sockaddr(&v).unwrap(),
            SocketAddr::from_str("[::1]:4433").unwrap()
        );

        let v = Yaml::Integer(4433);
        assert_eq!(as_sockaddr(&v).unwrap(), SocketAddr::from_str("[::]:4433").unwrap());

        let v = Yaml::String("4433".to_string());
        assert_eq!(as_sockaddr(&v).unwrap().port(), 4433);

        let v = Yaml::Integer(70000);
        assert!(as_sockaddr(&v).is_err());

        let v = Yaml::String("localhost:4433".to_string());
        assert!(as_sockaddr(&v).is_err());
    }
}
