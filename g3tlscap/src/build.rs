/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const PKG_NAME: &str = env!("CARGO_PKG_NAME");

const RUST_VERSION: &str = env!("CARGO_PKG_RUST_VERSION");

pub(crate) fn print_version(verbose_level: u8) {
    println!("{PKG_NAME} {VERSION}");
    if verbose_level > 0 {
        println!("Minimum Rust Version: {RUST_VERSION}");
    }
    if verbose_level > 1 {
        println!(
            "Target: {}-{}, Debug: {}",
            std::env::consts::ARCH,
            std::env::consts::OS,
            cfg!(debug_assertions)
        );
    }
}
