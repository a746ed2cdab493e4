/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use humanize_rs::bytes::Bytes;
use yaml_rust::Yaml;

pub fn as_u32(v: &Yaml) -> anyhow::Result<u32> {
    match v {
        Yaml::String(value) => {
            let v = value.parse::<Bytes<u32>>()?;
            Ok(v.size())
        }
        Yaml::Integer(value) => Ok(u32::try_from(*value)?),
        _ => Err(anyhow!(
            "yaml value type for humanize u32 should be 'string' or 'integer'"
        )),
    }
}
