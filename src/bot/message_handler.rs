//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error};

// Import localization
use crate::localization::t;

use crate::delivery::{DeliveryError, DeliveryTarget, OutboundMessage};

// Import UI builder functions
use super::ui_builder::{catalog_keyboard, catalog_text};

use super::AppState;

/// Handle incoming messages.
///
/// Unexpected failures are contained here and turned into the generic error
/// response. The one exception is a terminal delivery failure: for a fresh
/// command there is no weaker tier left, so it is surfaced to the dispatcher
/// as unhandled.
pub async fn message_handler(msg: Message, state: Arc<AppState>) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    debug!(user_id = %msg.chat.id, "Received text message from user");

    match handle_message(&msg, text, &state).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if e.downcast_ref::<DeliveryError>().is_some() {
                return Err(e);
            }

            error!(
                user_id = %msg.chat.id,
                message = ?msg,
                error = %e,
                "Unexpected failure while handling message"
            );
            let target = DeliveryTarget::New { chat: msg.chat.id };
            let message = OutboundMessage::plain(t("error-later"));
            if let Err(e) = state.delivery.deliver(&target, &message).await {
                error!(user_id = %msg.chat.id, error = %e, "Failed to deliver generic error response");
                return Err(e.into());
            }
            Ok(())
        }
    }
}

async fn handle_message(msg: &Message, text: &str, state: &AppState) -> Result<()> {
    let target = DeliveryTarget::New { chat: msg.chat.id };

    // Handle /start command
    if is_start_command(text) {
        let message = OutboundMessage::rich(catalog_text(), Some(catalog_keyboard(&state.catalog)?));
        state.delivery.deliver(&target, &message).await?;
    }
    // Handle regular text messages
    else {
        let message = OutboundMessage::plain(t("text-hint"));
        state.delivery.deliver(&target, &message).await?;
    }

    Ok(())
}

/// Deep links open the chat with `/start <payload>`, which still counts as
/// the start command.
fn is_start_command(text: &str) -> bool {
    text == "/start" || text.starts_with("/start ")
}
