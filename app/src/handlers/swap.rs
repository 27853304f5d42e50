//! Swap mode.
//!
//! When the signer is driven by an exchange flow, the amount and destination have already been
//! reviewed by the user on the exchange side. The transaction is then signed without a second
//! review, but only if it matches those parameters exactly.

use log::{debug, warn};
use subtle::ConstantTimeEq;

use super::sign_tx::{Tx, ADDRESS_LEN};
use common::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapParams {
    pub amount: u64,
    pub destination: [u8; ADDRESS_LEN],
}

impl SwapParams {
    /// Builds swap parameters from a hex destination, with or without `0x` prefix.
    pub fn new(amount: u64, destination: &str) -> Result<Self, AppError> {
        let dest_hex = destination.strip_prefix("0x").unwrap_or(destination);
        let mut dest = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(dest_hex, &mut dest).map_err(|_| {
            warn!("swap: cannot decode destination {}", destination);
            AppError::SwapFail
        })?;
        Ok(Self {
            amount,
            destination: dest,
        })
    }
}

/// Strict validation of the transaction against the swap parameters: same amount, same
/// destination.
pub fn check_swap_params(params: &SwapParams, tx: &Tx<'_>) -> Result<(), AppError> {
    debug!("swap: validating transaction");

    if tx.value != params.amount {
        warn!("swap: amount mismatch, tx {} != swap {}", tx.value, params.amount);
        return Err(AppError::SwapFail);
    }

    if !bool::from(tx.to[..].ct_eq(&params.destination[..])) {
        warn!("swap: destination mismatch");
        return Err(AppError::SwapFail);
    }

    debug!("swap: validation success, bypassing review");
    Ok(())
}
