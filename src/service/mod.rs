//! Service layer: business logic orchestration.
//!
//! [`FaucetService`] runs claims against the [`crate::persistence::FaucetStore`]
//! and reports results through the [`crate::notifier::Notifier`].

pub mod faucet_service;

pub use faucet_service::{ClaimCallback, ClaimOutcome, ClaimReply, FaucetService};
