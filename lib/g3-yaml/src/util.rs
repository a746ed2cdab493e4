/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use std::fs;
use std::path::Path;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, YamlLoader};

/// Load the first yaml document in the file
pub fn load_doc(path: &Path) -> anyhow::Result<Yaml> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
    let mut docs = YamlLoader::load_from_str(&content)
        .context(format!("invalid yaml file {}", path.display()))?;
    if docs.is_empty() {
        return Err(anyhow!("no yaml document found in {}", path.display()));
    }
    Ok(docs.swap_remove(0))
}
