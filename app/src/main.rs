/*****************************************************************************
 *   APDU signer.
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 *****************************************************************************/

//! Host build of the signer: commands in hex on stdin, responses in hex on stdout.
//!
//! Reviews are auto-approved and signatures are SHA-256 digests of the payload. Set `RUST_LOG`
//! to change verbosity; logs go to stderr.
//!
//! ```text
//! $ echo 8001000000 | app-signer
//! 0102039000
//! ```

use app_signer::stdio::StdioTransport;
use app_signer::{Dispatcher, MockPlatform, SwapParams};
use log::{error, info};

fn swap_params_from_env() -> Result<Option<SwapParams>, String> {
    let (amount, destination) = match (
        std::env::var("SIGNER_SWAP_AMOUNT"),
        std::env::var("SIGNER_SWAP_DESTINATION"),
    ) {
        (Ok(amount), Ok(destination)) => (amount, destination),
        _ => return Ok(None),
    };
    let amount = amount
        .parse::<u64>()
        .map_err(|e| format!("invalid SIGNER_SWAP_AMOUNT: {}", e))?;
    let params = SwapParams::new(amount, &destination)
        .map_err(|e| format!("invalid SIGNER_SWAP_DESTINATION: {}", e))?;
    Ok(Some(params))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let mut dispatcher = Dispatcher::new(MockPlatform::new());
    match swap_params_from_env() {
        Ok(Some(params)) => {
            info!("running in swap mode");
            dispatcher = dispatcher.with_swap(params);
        }
        Ok(None) => {}
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }

    let stdin = std::io::stdin();
    let mut transport = StdioTransport::new(stdin.lock(), std::io::stdout());
    dispatcher.serve(&mut transport);

    info!("transport closed: {:?}", dispatcher.stats());
}
