//! Transaction submission and receipt polling.

use std::time::Duration;

use tracing::{debug, info, instrument};

use ens_core::error::{EnsError, Result};
use ens_core::traits::ChainTransport;
use ens_core::types::{TransactionReceipt, TransactionRequest, TxOptions};
use ens_core::{Address, Bytes, B256};

/// Picks the sending account: `opts.from`, else the node's first account.
async fn sender(transport: &dyn ChainTransport, opts: &TxOptions) -> Result<Address> {
    if let Some(from) = opts.from {
        return Ok(from);
    }

    transport
        .accounts()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| EnsError::Config("no account available to send from".into()))
}

/// Submits a call to `to` and returns the transaction hash.
pub(crate) async fn submit(
    transport: &dyn ChainTransport,
    to: Address,
    data: Bytes,
    opts: &TxOptions,
) -> Result<B256> {
    let from = sender(transport, opts).await?;
    let request = TransactionRequest::new(from, to, data, opts);

    let tx_hash = transport.send_transaction(request).await?;
    info!(%from, %to, %tx_hash, "Submitted transaction");
    Ok(tx_hash)
}

/// Polls for a transaction receipt.
///
/// Checks `max_attempts` times, sleeping `interval` between checks.
///
/// # Errors
///
/// [`EnsError::Timeout`] if the transaction is still pending after the last
/// attempt. Transport errors abort polling immediately.
#[instrument(skip(transport))]
pub async fn wait_for_receipt(
    transport: &dyn ChainTransport,
    tx_hash: B256,
    interval: Duration,
    max_attempts: u32,
) -> Result<TransactionReceipt> {
    for attempt in 1..=max_attempts {
        if let Some(receipt) = transport.transaction_receipt(tx_hash).await? {
            debug!(attempt, block = ?receipt.block_number, "Receipt available");
            return Ok(receipt);
        }

        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }

    Err(EnsError::Timeout {
        tx_hash: tx_hash.to_string(),
        attempts: max_attempts,
    })
}
