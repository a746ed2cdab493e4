/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, anyhow};
use log::{debug, info, warn};
use slog::Logger;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Semaphore, broadcast};

use g3_tls_capture::{CaptureTarget, HandshakeServerConfig};

use super::ServerQuitCommand;
use crate::config::CaptureServerConfig;
use crate::log::task::TaskLogForCapture;

pub(crate) struct CaptureServer {
    name: String,
    handshake_config: Arc<HandshakeServerConfig>,
    target: CaptureTarget,
    concurrency_limit: Option<Arc<Semaphore>>,
    task_logger: Logger,
    listener: TcpListener,
}

impl CaptureServer {
    pub(crate) async fn bind(
        config: CaptureServerConfig,
        task_logger: Logger,
    ) -> anyhow::Result<Self> {
        let Some(listen) = config.listen else {
            return Err(anyhow!("no listen address set for server {}", config.name()));
        };
        let listener = TcpListener::bind(listen)
            .await
            .context(format!("failed to listen on {listen}"))?;

        let concurrency_limit = if config.concurrency_limit > 0 {
            Some(Arc::new(Semaphore::new(config.concurrency_limit)))
        } else {
            None
        };

        Ok(CaptureServer {
            name: config.name().to_string(),
            handshake_config: Arc::new(config.handshake),
            target: config.target,
            concurrency_limit,
            task_logger,
            listener,
        })
    }

    #[inline]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| anyhow!("failed to get local address: {e}"))
    }

    pub(crate) async fn run(self, mut quit_receiver: broadcast::Receiver<ServerQuitCommand>) {
        use broadcast::error::RecvError;

        info!("started server {}", self.name);
        loop {
            tokio::select! {
                biased;

                ev = quit_receiver.recv() => {
                    match ev {
                        Ok(ServerQuitCommand::QuitRuntime) => {}
                        Err(RecvError::Closed) => {}
                        Err(RecvError::Lagged(dropped)) => {
                            warn!("server {} quit notify channel overflowed, {dropped} msg dropped",
                                self.name);
                            continue;
                        }
                    }
                    info!("server {} will go offline", self.name);
                    break;
                }
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => self.run_task(stream, peer_addr),
                        Err(e) => warn!("server {} accept: {e:?}", self.name),
                    }
                }
            }
        }
        info!("stopped server {}", self.name);
    }

    fn run_task(&self, stream: TcpStream, peer_addr: SocketAddr) {
        let permit = match &self.concurrency_limit {
            Some(sema) => match Arc::clone(sema).try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    debug!(
                        "server {} reached concurrency limit, drop connection from {peer_addr}",
                        self.name
                    );
                    return;
                }
            },
            None => None,
        };

        let client_addr = canonical_addr(peer_addr);
        let server_addr = match stream.local_addr() {
            Ok(addr) => canonical_addr(addr),
            Err(e) => {
                warn!("server {} failed to get local address: {e}", self.name);
                return;
            }
        };

        let handshake_config = Arc::clone(&self.handshake_config);
        let target = self.target;
        let logger = self.task_logger.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let time_started = Instant::now();
            let outcome = g3_tls_capture::run_handshake(stream, handshake_config, target).await;
            TaskLogForCapture {
                server_addr,
                client_addr,
                total_time: time_started.elapsed(),
                outcome: &outcome,
            }
            .log(&logger);
        });
    }
}

fn canonical_addr(addr: SocketAddr) -> SocketAddr {
    SocketAddr::new(addr.ip().to_canonical(), addr.port())
}
