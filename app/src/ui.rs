//! Review screens.
//!
//! Field values are rendered into stack buffers; nothing here allocates.

use numtoa::NumToA;

use crate::handlers::sign_tx::{Tx, ADDRESS_LEN};
use crate::platform::{Field, Platform};

fn format_u64(value: u64, buf: &mut [u8; 20]) -> &str {
    core::str::from_utf8(value.numtoa(10, buf)).unwrap_or_default()
}

/// Shows the transaction to the user. Returns `true` if approved.
pub fn ui_display_tx<P: Platform>(platform: &mut P, tx: &Tx<'_>) -> bool {
    let mut nonce_buf = [0u8; 20];
    let mut value_buf = [0u8; 20];
    let mut to_buf = [0u8; 2 * ADDRESS_LEN];

    // cannot fail, the buffer is exactly twice the address length
    let to = match hex::encode_to_slice(tx.to, &mut to_buf) {
        Ok(()) => core::str::from_utf8(&to_buf).unwrap_or_default(),
        Err(_) => "",
    };

    let fields = [
        Field {
            name: "Nonce",
            value: format_u64(tx.nonce, &mut nonce_buf),
        },
        Field {
            name: "Coin",
            value: tx.coin,
        },
        Field {
            name: "Amount",
            value: format_u64(tx.value, &mut value_buf),
        },
        Field {
            name: "Destination",
            value: to,
        },
        Field {
            name: "Memo",
            value: tx.memo,
        },
    ];

    platform.review(&["Review ", "Transaction"], &fields)
}
