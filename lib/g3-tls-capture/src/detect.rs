/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

use log::trace;
use tokio::io::{AsyncRead, AsyncWrite};

use g3_codec::tls::{RecordHeader, RecordParseError};

use crate::outcome::Protocol;
use crate::transfer::{StreamTransfer, TransferError};

/// Peek the first record header to tell TLS clients from SSL 2.0 ones.
///
/// The received bytes are left in the transfer buffer.
pub(crate) async fn detect_protocol<S>(
    transfer: &mut StreamTransfer<S>,
) -> Result<Protocol, TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let buffered = transfer.buffer().len();
    if buffered < RecordHeader::SIZE {
        transfer.receive(RecordHeader::SIZE - buffered).await?;
    }

    match RecordHeader::parse(transfer.buffer()) {
        Ok(_) => Ok(Protocol::Tls),
        Err(RecordParseError::NeedMoreData(n)) => Err(TransferError::NotEnoughData(n)),
        Err(e) => {
            trace!("not a tls record header: {e}");
            Ok(Protocol::Ssl)
        }
    }
}
