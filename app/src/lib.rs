//! APDU signer application.
//!
//! The [`Dispatcher`] owns the transport buffer, the chunk accumulator and the session state.
//! It routes each command to its handler, and reaches the device through a [`Platform`]
//! (confirmation UI and signing key) and a [`io::Transport`] (the host link).

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod dispatcher;
pub mod handlers;
pub mod io;
pub mod platform;
#[cfg(feature = "std")]
pub mod stdio;
mod ui;

pub use dispatcher::{Dispatcher, ServiceStats, Session};
pub use handlers::swap::SwapParams;
pub use platform::{Field, Platform};

#[cfg(any(test, feature = "std"))]
pub use platform::MockPlatform;
