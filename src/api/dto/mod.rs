//! Data Transfer Objects for REST request/response serialization.
//!
//! All monetary amounts are serialized as JSON strings to prevent
//! precision loss on decimal values.

pub mod faucet_dto;

pub use faucet_dto::*;
