//! Protocol layer shared by the signer application and its host tooling.
//!
//! Everything in this crate is `no_std` and heap-free: packets are decoded from borrowed
//! slices, and multi-packet payloads are assembled in fixed-capacity buffers.

#![no_std]

pub mod accumulator;
pub mod apdu;
pub mod constants;
pub mod error;
pub mod instruction;
pub mod status;

pub use error::AppError;
pub use status::StatusWord;
