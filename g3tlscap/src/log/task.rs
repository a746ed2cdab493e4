/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;
use std::time::Duration;

use slog::{Drain, KV, Logger, Record, Serializer};

use g3_tls_capture::HandshakeOutcome;

pub(crate) fn get_logger(server_name: &str) -> anyhow::Result<Logger> {
    let logger_name = format!("lt-{server_name}");
    let drain = g3_stdlog::new_async_logger(&logger_name, false, true)?;
    let common_values = slog::o!(
        "daemon_name" => crate::build::PKG_NAME,
        "log_type" => super::LOG_TYPE_TASK,
        "pid" => std::process::id(),
        "server_name" => server_name.to_string(),
    );
    Ok(Logger::root(drain.fuse(), common_values))
}

struct CaptureLogKv<'a> {
    server_addr: SocketAddr,
    client_addr: SocketAddr,
    total_time: Duration,
    outcome: &'a HandshakeOutcome,
}

impl KV for CaptureLogKv<'_> {
    fn serialize(&self, _record: &Record, serializer: &mut dyn Serializer) -> slog::Result {
        serializer.emit_str("task_type".into(), "TlsCapture")?;
        serializer.emit_arguments("server_addr".into(), &format_args!("{}", self.server_addr))?;
        serializer.emit_arguments("client_addr".into(), &format_args!("{}", self.client_addr))?;
        serializer.emit_arguments("total_time".into(), &format_args!("{:?}", self.total_time))?;
        match self.outcome.protocol {
            Some(p) => serializer.emit_str("protocol".into(), p.as_str())?,
            None => serializer.emit_none("protocol".into())?,
        }
        if let Some(signal) = &self.outcome.signal {
            serializer.emit_arguments("signal".into(), &format_args!("{signal}"))?;
        }
        if let Some(e) = self.outcome.termination.error() {
            serializer.emit_arguments("error".into(), &format_args!("{e}"))?;
        }
        if let Some(v) = self.outcome.client_version() {
            serializer.emit_arguments("client_version".into(), &format_args!("{v}"))?;
            serializer.emit_usize(
                "offered_ciphers".into(),
                self.outcome.offered_cipher_count(),
            )?;
        }
        if let Some(sni) = self.outcome.server_name() {
            serializer.emit_str("sni".into(), sni)?;
        }
        if !self.outcome.messages.is_empty() {
            let names = self.outcome.messages.message_names().join(",");
            serializer.emit_str("messages".into(), &names)?;
        }
        Ok(())
    }
}

pub(crate) struct TaskLogForCapture<'a> {
    pub(crate) server_addr: SocketAddr,
    pub(crate) client_addr: SocketAddr,
    pub(crate) total_time: Duration,
    pub(crate) outcome: &'a HandshakeOutcome,
}

impl TaskLogForCapture<'_> {
    pub(crate) fn log(&self, logger: &Logger) {
        let log_kv = CaptureLogKv {
            server_addr: self.server_addr,
            client_addr: self.client_addr,
            total_time: self.total_time,
            outcome: self.outcome,
        };
        slog::info!(logger, "{}", self.outcome.termination.brief(); log_kv);
    }
}
