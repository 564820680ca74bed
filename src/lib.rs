//! # faucet-gateway
//!
//! Faucet claim service for a chat-bot rewards front end.
//!
//! A registered user may claim a level-dependent payout once per cooldown
//! window. Each accepted claim credits the user's balance and overwrites the
//! user's single ledger row in one transaction, so concurrent claims credit
//! at most once per window.
//!
//! ## Architecture
//!
//! ```text
//! Chat dispatcher (HTTP)        Transport adapters (WebSocket)
//!     │                               ▲
//!     ├── REST Handlers (api/)        ├── WS Handler (ws/)
//!     │                               │
//!     ├── FaucetService (service/) ──►├── Notifier ─► EventBus (domain/)
//!     │
//!     ├── CooldownPolicy, PayoutTable (domain/)
//!     │
//!     └── FaucetStore (persistence/): PostgreSQL or in-memory
//! ```

pub mod api;
pub mod app_state;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod notifier;
pub mod persistence;
pub mod presentation;
pub mod service;
pub mod ws;
