//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `message_handler`: Handles incoming commands and other text messages
//! - `callback_handler`: Decodes and dispatches inline keyboard callbacks
//! - `ui_builder`: Creates keyboards and formats messages

pub mod callback_handler;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::{callback_handler, CallbackAction};
pub use message_handler::message_handler;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::delivery::{DeliveryService, MessageGateway, TelegramGateway};
use crate::session::SessionStore;
use std::sync::Arc;
use teloxide::Bot;

/// Shared application context handed to every handler.
///
/// Catalog and config are immutable after startup; sessions and the delivery
/// service are safe to use from concurrent handler tasks.
pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    pub sessions: SessionStore,
    pub delivery: DeliveryService<Arc<dyn MessageGateway>>,
}

impl AppState {
    pub fn new(config: Config, bot: Bot) -> Self {
        Self::with_gateway(config, Arc::new(TelegramGateway::new(bot)))
    }

    /// Wire the controller to an arbitrary gateway so the full handler path
    /// can be driven against a recording gateway in tests.
    pub fn with_gateway(config: Config, gateway: Arc<dyn MessageGateway>) -> Self {
        Self {
            catalog: Catalog::standard(),
            sessions: SessionStore::new(),
            delivery: DeliveryService::new(gateway),
            config,
        }
    }
}
