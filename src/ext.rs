//! Public extension contracts for attaching signed tokens to arbitrary HTTP clients.

pub mod request_signer;

pub use request_signer::*;
