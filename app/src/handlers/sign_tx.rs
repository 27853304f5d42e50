//! Transaction signing.
//!
//! The payload reaches this handler fully assembled by the dispatcher's accumulator. It is a
//! JSON object:
//!
//! ```text
//! {"nonce": 1, "coin": "CRAB", "value": "777", "to": "de0b...7bae", "memo": "For u"}
//! ```
//!
//! `value` is a decimal string and `to` a 20-byte address in hex. Strings are borrowed from the
//! payload as they appear on the wire, so escape sequences are refused: the text the user
//! reviews must be the text that is signed. The transaction is reviewed
//! by the user (or checked against the swap parameters in swap mode), then the raw payload is
//! signed. The response is `[signature length][signature]`.

use log::{debug, info};
use serde::Deserialize;

use super::swap::{check_swap_params, SwapParams};
use crate::io::WriteView;
use crate::platform::Platform;
use crate::ui::ui_display_tx;
use common::constants::MAX_SIGNATURE_LEN;
use common::AppError;

pub const ADDRESS_LEN: usize = 20;

#[derive(Deserialize)]
struct RawTx<'a> {
    nonce: u64,
    coin: &'a str,
    value: &'a str,
    to: &'a str,
    memo: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx<'a> {
    pub nonce: u64,
    pub coin: &'a str,
    pub value: u64,
    pub to: [u8; ADDRESS_LEN],
    pub memo: &'a str,
}

impl<'a> Tx<'a> {
    pub fn parse(payload: &'a [u8]) -> Result<Self, AppError> {
        let (raw, _) = serde_json_core::from_slice::<RawTx<'a>>(payload).map_err(|e| {
            debug!("sign_tx: invalid transaction json: {:?}", e);
            AppError::TxParsingFail
        })?;

        if [raw.coin, raw.value, raw.to, raw.memo]
            .iter()
            .any(|s| s.contains('\\'))
        {
            debug!("sign_tx: escape sequences are not supported");
            return Err(AppError::TxParsingFail);
        }

        let value = raw.value.parse::<u64>().map_err(|_| AppError::TxParsingFail)?;
        let mut to = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(raw.to, &mut to).map_err(|_| AppError::TxParsingFail)?;

        Ok(Tx {
            nonce: raw.nonce,
            coin: raw.coin,
            value,
            to,
            memo: raw.memo,
        })
    }
}

pub fn handler_sign_tx<P: Platform>(
    platform: &mut P,
    payload: &[u8],
    swap: Option<&SwapParams>,
    out: &mut WriteView<'_>,
) -> Result<(), AppError> {
    let tx = Tx::parse(payload)?;

    match swap {
        Some(params) => check_swap_params(params, &tx)?,
        None => {
            // Display transaction. If user approves the transaction, sign it.
            // Otherwise, return a "deny" status word.
            if !ui_display_tx(platform, &tx) {
                info!("sign_tx: rejected by user");
                return Err(AppError::Denied);
            }
        }
    }

    compute_signature_and_append(platform, payload, out)
}

fn compute_signature_and_append<P: Platform>(
    platform: &mut P,
    payload: &[u8],
    out: &mut WriteView<'_>,
) -> Result<(), AppError> {
    let mut signature = [0u8; MAX_SIGNATURE_LEN];
    let len = platform.sign(payload, &mut signature)?;
    let signature = signature.get(..len).ok_or(AppError::SignatureFail)?;

    info!("sign_tx: signed {} bytes", payload.len());
    out.append(&[len as u8])?;
    out.append(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::TransportBuffer;
    use crate::platform::MockPlatform;
    use hex_literal::hex;
    use sha2::{Digest, Sha256};

    const TX_JSON: &[u8] = br#"{"nonce":1,"coin":"CRAB","value":"777","to":"de0b295669a9fd93d5f28d9ec85e40f4cb697bae","memo":"For u EthDev"}"#;

    #[test]
    fn test_parse_tx() {
        let tx = Tx::parse(TX_JSON).unwrap();
        assert_eq!(
            tx,
            Tx {
                nonce: 1,
                coin: "CRAB",
                value: 777,
                to: hex!("de0b295669a9fd93d5f28d9ec85e40f4cb697bae"),
                memo: "For u EthDev",
            }
        );
    }

    #[test]
    fn test_parse_tx_invalid() {
        #[rustfmt::skip]
        let cases: [&[u8]; 7] = [
            b"",
            b"not json",
            br#"{"nonce":1,"coin":"CRAB","value":"777","to":"de0b","memo":""}"#,
            br#"{"nonce":1,"coin":"CRAB","value":"-5","to":"de0b295669a9fd93d5f28d9ec85e40f4cb697bae","memo":""}"#,
            br#"{"nonce":1,"coin":"CRAB","value":"777","memo":""}"#,
            br#"{"nonce":1,"coin":"CRAB","value":"777","to":"de0b295669a9fd93d5f28d9ec85e40f4cb697bae","memo":""} x"#,
            &[0xff; 32],
        ];
        for payload in cases {
            assert_eq!(Tx::parse(payload), Err(AppError::TxParsingFail));
        }
    }

    #[test]
    fn test_parse_tx_refuses_escapes() {
        #[rustfmt::skip]
        let cases: [&[u8]; 3] = [
            br#"{"nonce":1,"coin":"CRAB","value":"777","to":"de0b295669a9fd93d5f28d9ec85e40f4cb697bae","memo":"say \"hi\""}"#,
            br#"{"nonce":1,"coin":"CRAB","value":"777","to":"de0b295669a9fd93d5f28d9ec85e40f4cb697bae","memo":"a\nb"}"#,
            br#"{"nonce":1,"coin":"\u0043RAB","value":"777","to":"de0b295669a9fd93d5f28d9ec85e40f4cb697bae","memo":""}"#,
        ];
        for payload in cases {
            assert_eq!(Tx::parse(payload), Err(AppError::TxParsingFail));
        }
    }

    #[test]
    fn test_sign_tx_escaped_memo_not_reviewed() {
        let payload = br#"{"nonce":1,"coin":"CRAB","value":"777","to":"de0b295669a9fd93d5f28d9ec85e40f4cb697bae","memo":"say \"hi\""}"#;
        let mut platform = MockPlatform::new();
        let mut io = TransportBuffer::new();
        let mut out = io.writer();
        assert_eq!(
            handler_sign_tx(&mut platform, payload, None, &mut out),
            Err(AppError::TxParsingFail)
        );
        assert!(platform.reviews.is_empty());
        assert!(platform.signed.is_empty());
    }

    #[test]
    fn test_sign_tx_approved() {
        let mut platform = MockPlatform::new();
        let mut io = TransportBuffer::new();
        let mut out = io.writer();
        handler_sign_tx(&mut platform, TX_JSON, None, &mut out).unwrap();
        out.reply_ok();

        let response = io.tx();
        assert_eq!(response[0], 32);
        assert_eq!(&response[1..33], Sha256::digest(TX_JSON).as_slice());
        assert_eq!(&response[33..], &[0x90, 0x00]);
        assert_eq!(platform.signed, [TX_JSON.to_vec()]);
        assert_eq!(platform.reviews.len(), 1);
    }

    #[test]
    fn test_sign_tx_denied() {
        let mut platform = MockPlatform::new();
        platform.set_auto_approve(false);
        let mut io = TransportBuffer::new();
        let mut out = io.writer();
        assert_eq!(
            handler_sign_tx(&mut platform, TX_JSON, None, &mut out),
            Err(AppError::Denied)
        );
        assert!(out.is_empty());
        assert!(platform.signed.is_empty());
    }

    #[test]
    fn test_sign_tx_swap_bypasses_review() {
        let mut platform = MockPlatform::new();
        platform.set_auto_approve(false);
        let params = SwapParams::new(777, "de0b295669a9fd93d5f28d9ec85e40f4cb697bae").unwrap();
        let mut io = TransportBuffer::new();
        let mut out = io.writer();
        handler_sign_tx(&mut platform, TX_JSON, Some(&params), &mut out).unwrap();
        assert!(platform.reviews.is_empty());
        assert_eq!(platform.signed.len(), 1);

        let wrong = SwapParams { amount: 778, ..params };
        let mut out = io.writer();
        assert_eq!(
            handler_sign_tx(&mut platform, TX_JSON, Some(&wrong), &mut out),
            Err(AppError::SwapFail)
        );
        assert_eq!(platform.signed.len(), 1);
    }

    #[test]
    fn test_sign_tx_signature_fail() {
        let mut platform = MockPlatform::new();
        platform.fail_signing = true;
        let mut io = TransportBuffer::new();
        let mut out = io.writer();
        assert_eq!(
            handler_sign_tx(&mut platform, TX_JSON, None, &mut out),
            Err(AppError::SignatureFail)
        );
    }
}
