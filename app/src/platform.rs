//! Platform abstraction: the confirmation UI and the signing primitive.
//!
//! Both are provided by the device firmware. The dispatcher only consumes them through
//! [`Platform`], which keeps the exchange logic testable on the host with [`MockPlatform`].

use common::constants::MAX_SIGNATURE_LEN;
use common::AppError;

/// One name/value pair of a review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

pub trait Platform {
    /// Displays a multi-field review and blocks until the user decides.
    ///
    /// Returns `true` if the user approved.
    fn review(&mut self, title: &[&str], fields: &[Field<'_>]) -> bool;

    /// Signs `payload`, writing the signature to `signature` and returning its length.
    fn sign(
        &mut self,
        payload: &[u8],
        signature: &mut [u8; MAX_SIGNATURE_LEN],
    ) -> Result<usize, AppError>;
}

impl<P: Platform + ?Sized> Platform for &mut P {
    fn review(&mut self, title: &[&str], fields: &[Field<'_>]) -> bool {
        (**self).review(title, fields)
    }

    fn sign(
        &mut self,
        payload: &[u8],
        signature: &mut [u8; MAX_SIGNATURE_LEN],
    ) -> Result<usize, AppError> {
        (**self).sign(payload, signature)
    }
}

// =============================================================================
// Mock Platform (for host testing)
// =============================================================================

#[cfg(any(test, feature = "std"))]
pub use mock::MockPlatform;

#[cfg(any(test, feature = "std"))]
mod mock {
    use super::*;
    use sha2::{Digest, Sha256};
    use std::string::{String, ToString};
    use std::vec::Vec;

    /// A review as the user saw it: title lines, then (name, value) pairs.
    pub type RecordedReview = (Vec<String>, Vec<(String, String)>);

    /// Host-side platform. Approves or rejects every review according to `auto_approve`, and
    /// signs with SHA-256 of the payload.
    pub struct MockPlatform {
        pub auto_approve: bool,
        pub fail_signing: bool,
        pub reviews: Vec<RecordedReview>,
        pub signed: Vec<Vec<u8>>,
    }

    impl MockPlatform {
        pub fn new() -> Self {
            Self {
                auto_approve: true,
                fail_signing: false,
                reviews: Vec::new(),
                signed: Vec::new(),
            }
        }

        /// Set whether reviews are approved.
        pub fn set_auto_approve(&mut self, approve: bool) {
            self.auto_approve = approve;
        }
    }

    impl Default for MockPlatform {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Platform for MockPlatform {
        fn review(&mut self, title: &[&str], fields: &[Field<'_>]) -> bool {
            log::info!("[MOCK] Review: {}", title.join(" "));
            for field in fields {
                log::info!("  {}: {}", field.name, field.value);
            }
            self.reviews.push((
                title.iter().map(|t| t.to_string()).collect(),
                fields
                    .iter()
                    .map(|f| (f.name.to_string(), f.value.to_string()))
                    .collect(),
            ));
            self.auto_approve
        }

        fn sign(
            &mut self,
            payload: &[u8],
            signature: &mut [u8; MAX_SIGNATURE_LEN],
        ) -> Result<usize, AppError> {
            if self.fail_signing {
                return Err(AppError::SignatureFail);
            }
            self.signed.push(payload.to_vec());
            let digest = Sha256::digest(payload);
            signature[..digest.len()].copy_from_slice(&digest);
            Ok(digest.len())
        }
    }
}
