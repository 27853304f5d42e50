pub mod echo_hash;
pub mod get_version;
pub mod multifield_review;
pub mod sign_tx;
pub mod swap;
