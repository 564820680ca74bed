//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::FaucetConfig;
use crate::domain::EventBus;
use crate::error::FaucetError;
use crate::notifier::BusNotifier;
use crate::persistence::FaucetStore;
use crate::presentation::MessageRenderer;
use crate::service::FaucetService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Faucet service for all business logic.
    pub faucet_service: Arc<FaucetService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires the service stack over `store` and `clock` using `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FaucetError::InvalidConfig`] if the cooldown or display
    /// timezone in `config` is invalid.
    pub fn from_parts(
        store: Arc<dyn FaucetStore>,
        clock: Arc<dyn Clock>,
        config: &FaucetConfig,
    ) -> Result<Self, FaucetError> {
        let event_bus = EventBus::new(config.event_bus_capacity);
        let renderer =
            MessageRenderer::new(config.display_zone()?, config.currency_symbol.as_str());
        let faucet_service = FaucetService::new(
            store,
            Arc::new(BusNotifier::new(event_bus.clone())),
            clock,
            config.cooldown_policy()?,
            Arc::new(config.payout_table.clone()),
            renderer,
        );
        Ok(Self {
            faucet_service: Arc::new(faucet_service),
            event_bus,
        })
    }
}
