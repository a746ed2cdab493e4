/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

mod size;
pub use size::as_u32;

mod time;
pub use time::as_duration;
