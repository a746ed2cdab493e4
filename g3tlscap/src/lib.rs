/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

mod build;
mod signal;

pub mod config;
pub mod log;
pub mod opts;
pub mod serve;
