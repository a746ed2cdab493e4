/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use anyhow::Context;
use log::{info, warn};
use tokio::sync::broadcast;

use crate::config::CaptureServerConfig;

mod server;
use server::CaptureServer;

#[derive(Clone, Copy, Debug)]
pub(crate) enum ServerQuitCommand {
    QuitRuntime,
}

/// Bind all configured servers, then serve until a quit signal is received.
pub async fn spawn_all_and_wait(configs: Vec<CaptureServerConfig>) -> anyhow::Result<()> {
    let mut servers = Vec::with_capacity(configs.len());
    for config in configs {
        let name = config.name().to_string();
        let logger = crate::log::task::get_logger(&name)
            .context(format!("failed to create task logger for server {name}"))?;
        let server = CaptureServer::bind(config, logger)
            .await
            .context(format!("failed to bind server {name}"))?;
        info!(
            "server {} listening on {}",
            server.name(),
            server.local_addr()?
        );
        servers.push(server);
    }

    let (quit_sender, _) = broadcast::channel(1);
    let mut handles = Vec::with_capacity(servers.len());
    for server in servers {
        let quit_receiver = quit_sender.subscribe();
        handles.push(tokio::spawn(server.run(quit_receiver)));
    }

    crate::signal::wait_quit().await?;
    info!("quit signal received, stopping all servers");
    let _ = quit_sender.send(ServerQuitCommand::QuitRuntime);

    for handle in handles {
        if let Err(e) = handle.await {
            warn!("server runtime join failed: {e}");
        }
    }
    Ok(())
}
