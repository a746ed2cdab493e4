/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! SSL 2.0 record layer and handshake messages.
//!
//! Only the cleartext part of the handshake is covered, which is all that
//! a server needs to see the client offer.

mod record;
pub use record::{SslRecord, SslRecordEncodeError, SslRecordHeader, SslRecordParseError};

mod message;
pub use message::{
    SslClientHello, SslErrorType, SslMessage, SslMessageParseError, SslMessageType,
    SslServerHello,
};
