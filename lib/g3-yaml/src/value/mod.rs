/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

mod net;
mod primary;
mod tls;

pub use net::as_sockaddr;
pub use primary::{as_bool, as_list, as_string, as_usize};
pub use tls::{as_ssl_message_type, as_tls_handshake_type, as_tls_version};
