/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::anyhow;
use yaml_rust::{Yaml, yaml};

mod server;
pub use server::CaptureServerConfig;

pub fn load(config_file: &Path) -> anyhow::Result<Vec<CaptureServerConfig>> {
    let doc = g3_yaml::load_doc(config_file)?;
    match &doc {
        Yaml::Hash(map) => load_doc(map),
        _ => Err(anyhow!("yaml doc root should be hash")),
    }
}

pub(crate) fn load_doc(map: &yaml::Hash) -> anyhow::Result<Vec<CaptureServerConfig>> {
    let mut servers = Vec::new();
    g3_yaml::foreach_kv(map, |k, v| match g3_yaml::key::normalize(k).as_str() {
        "server" => {
            servers = server::load_all(v)?;
            Ok(())
        }
        _ => Err(anyhow!("invalid key {k} in main conf")),
    })?;
    if servers.is_empty() {
        return Err(anyhow!("no server configured"));
    }
    Ok(servers)
}
