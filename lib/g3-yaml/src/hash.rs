/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

pub fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_in_order() {
        let yaml = yaml_doc!("name: tls\nlisten: 8443");
        let hash = yaml.as_hash().unwrap();
        let mut keys = Vec::new();
        foreach_kv(hash, |k, _| {
            keys.push(k.to_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(keys, vec!["name", "listen"]);
    }

    #[test]
    fn non_string_key() {
        let yaml = yaml_doc!("8443: tls");
        let hash = yaml.as_hash().unwrap();
        assert!(foreach_kv(hash, |_, _| Ok(())).is_err());
    }

    #[test]
    fn callback_error() {
        let yaml = yaml_doc!("listen: abc");
        let hash = yaml.as_hash().unwrap();
        let e = foreach_kv(hash, |k, _| Err(anyhow!("invalid {k}"))).unwrap_err();
        assert_eq!(e.to_string(), "failed to parse value of key listen");
    }
}
