/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use slog::Drain;
use slog_scope::GlobalLoggerGuard;

const PROCESS_LOG_THREAD_NAME: &str = "log-process";

pub fn setup(verbose_level: u8) -> anyhow::Result<GlobalLoggerGuard> {
    let drain = g3_stdlog::new_async_logger(PROCESS_LOG_THREAD_NAME, true, false)?;
    let logger = slog::Logger::root(drain.fuse(), slog::o!());

    let scope_guard = slog_scope::set_global_logger(logger);

    let log_level = match verbose_level {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    };

    slog_stdlog::init_with_level(log_level)?;
    Ok(scope_guard)
}
