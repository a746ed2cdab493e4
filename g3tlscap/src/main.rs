/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use anyhow::Context;
use log::{debug, error, info};

fn main() -> anyhow::Result<()> {
    let Some(proc_args) =
        g3tlscap::opts::parse_clap().context("failed to parse command line options")?
    else {
        return Ok(());
    };

    // set up process logger early, only proc args is used inside
    let _log_guard =
        g3tlscap::log::process::setup(proc_args.verbose_level).context("failed to setup logger")?;

    let servers = g3tlscap::config::load(&proc_args.config_file)
        .context(format!("failed to load config, opts: {proc_args:?}"))?;
    debug!("loaded config from {}", proc_args.config_file.display());

    if proc_args.test_config {
        info!("the format of the config file is ok");
        return Ok(());
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    match rt.block_on(g3tlscap::serve::spawn_all_and_wait(servers)) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("{e:?}");
            Err(e)
        }
    }
}
