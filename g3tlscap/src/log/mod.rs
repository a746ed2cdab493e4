/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

pub mod process;
pub(crate) mod task;

const LOG_TYPE_TASK: &str = "Task";
